use crate::{BoneCalibration, HumanBone, Landmark, TrackingPoint};
use std::collections::BTreeMap;

/// A limb span driven by the direction between two landmarks.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LimbSegment {
    pub bone: HumanBone,
    pub child: HumanBone,
    pub from: Landmark,
    pub to: Landmark,
    /// Ankle -> toe segments, only calibrated with foot tracking enabled.
    pub foot: bool,
}

const fn segment(bone: HumanBone, child: HumanBone, from: Landmark, to: Landmark) -> LimbSegment {
    LimbSegment {
        bone,
        child,
        from,
        to,
        foot: false,
    }
}

const fn foot_segment(
    bone: HumanBone,
    child: HumanBone,
    from: Landmark,
    to: Landmark,
) -> LimbSegment {
    LimbSegment {
        bone,
        child,
        from,
        to,
        foot: true,
    }
}

pub const LIMB_SEGMENTS: [LimbSegment; 10] = [
    segment(
        HumanBone::RightUpperArm,
        HumanBone::RightLowerArm,
        Landmark::RightShoulder,
        Landmark::RightElbow,
    ),
    segment(
        HumanBone::RightLowerArm,
        HumanBone::RightHand,
        Landmark::RightElbow,
        Landmark::RightWrist,
    ),
    segment(
        HumanBone::RightUpperLeg,
        HumanBone::RightLowerLeg,
        Landmark::RightHip,
        Landmark::RightKnee,
    ),
    segment(
        HumanBone::RightLowerLeg,
        HumanBone::RightFoot,
        Landmark::RightKnee,
        Landmark::RightAnkle,
    ),
    segment(
        HumanBone::LeftUpperArm,
        HumanBone::LeftLowerArm,
        Landmark::LeftShoulder,
        Landmark::LeftElbow,
    ),
    segment(
        HumanBone::LeftLowerArm,
        HumanBone::LeftHand,
        Landmark::LeftElbow,
        Landmark::LeftWrist,
    ),
    segment(
        HumanBone::LeftUpperLeg,
        HumanBone::LeftLowerLeg,
        Landmark::LeftHip,
        Landmark::LeftKnee,
    ),
    segment(
        HumanBone::LeftLowerLeg,
        HumanBone::LeftFoot,
        Landmark::LeftKnee,
        Landmark::LeftAnkle,
    ),
    foot_segment(
        HumanBone::LeftFoot,
        HumanBone::LeftToes,
        Landmark::LeftAnkle,
        Landmark::LeftFootIndex,
    ),
    foot_segment(
        HumanBone::RightFoot,
        HumanBone::RightToes,
        Landmark::RightAnkle,
        Landmark::RightFootIndex,
    ),
];

pub fn limb_segment(bone: HumanBone) -> Option<&'static LimbSegment> {
    LIMB_SEGMENTS.iter().find(|s| s.bone == bone)
}

/// The four torso records that are composed together instead of being driven
/// as independent limbs.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum SpineRole {
    /// Pelvis twist, from the hip line.
    HipsTwist,
    /// Forward/back lean, from the hip -> neck line.
    SpineUpDown,
    /// Chest counter-twist, from the hip line.
    Chest,
    /// Head look, from the neck -> nose line.
    Head,
}

impl SpineRole {
    pub const ALL: [SpineRole; 4] = [
        Self::HipsTwist,
        Self::SpineUpDown,
        Self::Chest,
        Self::Head,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::HipsTwist => "hips_twist",
            Self::SpineUpDown => "spine_up_down",
            Self::Chest => "chest",
            Self::Head => "head",
        }
    }

    /// Driven bone and the bone closing its span.
    pub fn bones(self) -> (HumanBone, HumanBone) {
        match self {
            Self::HipsTwist => (HumanBone::Hips, HumanBone::Hips),
            Self::SpineUpDown => (HumanBone::Spine, HumanBone::Neck),
            Self::Chest => (HumanBone::Chest, HumanBone::Chest),
            Self::Head => (HumanBone::Neck, HumanBone::Head),
        }
    }

    pub fn tracking(self) -> (TrackingPoint, TrackingPoint) {
        match self {
            Self::HipsTwist | Self::Chest => (
                TrackingPoint::Landmark(Landmark::RightHip),
                TrackingPoint::Landmark(Landmark::LeftHip),
            ),
            Self::SpineUpDown => (TrackingPoint::VirtualHip, TrackingPoint::VirtualNeck),
            Self::Head => (
                TrackingPoint::VirtualNeck,
                TrackingPoint::Landmark(Landmark::Nose),
            ),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpineCalibration {
    pub hips_twist: BoneCalibration,
    pub spine_up_down: BoneCalibration,
    pub chest: BoneCalibration,
    pub head: BoneCalibration,
}

impl SpineCalibration {
    pub fn get(&self, role: SpineRole) -> &BoneCalibration {
        match role {
            SpineRole::HipsTwist => &self.hips_twist,
            SpineRole::SpineUpDown => &self.spine_up_down,
            SpineRole::Chest => &self.chest,
            SpineRole::Head => &self.head,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (SpineRole, &BoneCalibration)> + '_ {
        SpineRole::ALL.into_iter().map(move |role| (role, self.get(role)))
    }
}

/// Everything recorded by one calibration. Replaced as a whole, never edited.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SkeletonCalibrationSet {
    pub limbs: BTreeMap<HumanBone, BoneCalibration>,
    pub spine: Option<SpineCalibration>,
}

impl SkeletonCalibrationSet {
    pub fn limb(&self, bone: HumanBone) -> Option<&BoneCalibration> {
        self.limbs.get(&bone)
    }

    pub fn is_empty(&self) -> bool {
        self.limbs.is_empty() && self.spine.is_none()
    }

    /// All bones whose rotation this calibration drives.
    pub fn driven_bones(&self) -> impl Iterator<Item = HumanBone> + '_ {
        self.limbs
            .keys()
            .copied()
            .chain(self.spine.iter().flat_map(|s| s.iter().map(|(_, c)| c.bone)))
    }
}
