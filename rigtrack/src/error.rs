use crate::{HumanBone, TrackingPoint};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid value: {message}")]
    InvalidValue { message: String },

    #[error("unknown bone: {name}")]
    UnknownBone { name: String },

    #[error("bone '{bone}' is not a calibrated limb segment")]
    UnknownSegment { bone: HumanBone },

    #[error("duplicate calibration entry for bone '{bone}'")]
    DuplicateBone { bone: HumanBone },

    #[error("rig has no bone '{bone}'")]
    MissingBone { bone: HumanBone },

    #[error("landmark frame queue is full")]
    FrameQueueFull,

    #[error("landmark frame queue is closed")]
    FrameQueueClosed,

    #[cfg(feature = "json")]
    #[error("failed to parse JSON: {message}")]
    JsonParse { message: String },

    #[cfg(feature = "binary")]
    #[error("failed to parse calibration snapshot: {message}")]
    BinaryParse { message: String },

    #[cfg(feature = "binary")]
    #[error("unsupported calibration snapshot version: {version}")]
    BinaryVersion { version: u8 },
}

/// Something the engine had to reference but could not resolve.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Reference {
    Bone(HumanBone),
    Point(TrackingPoint),
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bone(bone) => write!(f, "bone '{bone}'"),
            Self::Point(point) => write!(f, "tracking point '{point}'"),
        }
    }
}

/// Non-fatal conditions hit while calibrating or ticking.
///
/// These never abort a tick: the affected bone (or the ground pass) is skipped
/// for the frame and keeps its previous state.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Error)]
pub enum Fault {
    #[error("missing {0}")]
    MissingReference(Reference),

    #[error("degenerate tracking direction for bone '{0}'")]
    DegenerateDirection(HumanBone),

    #[error("retarget tick without an active calibration")]
    StaleCalibration,

    #[error("no ground below either foot")]
    GroundNotFound,
}

impl Fault {
    pub fn missing_bone(bone: HumanBone) -> Self {
        Self::MissingReference(Reference::Bone(bone))
    }

    pub fn missing_point(point: TrackingPoint) -> Self {
        Self::MissingReference(Reference::Point(point))
    }
}
