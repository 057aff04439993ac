use crate::{
    BoneCalibration, Fault, LIMB_SEGMENTS, Rig, SkeletonCalibrationSet, SpineCalibration,
    SpineRole, TrackingPoint, TrackingSource,
};
use std::collections::BTreeMap;

/// Result of a calibration pass. Segments that could not be captured are left
/// out of `set` and listed in `faults`.
#[derive(Clone, Debug, Default)]
pub struct CalibrationOutcome {
    pub set: SkeletonCalibrationSet,
    pub faults: Vec<Fault>,
}

/// Builds a [`SkeletonCalibrationSet`] from the current tracking pose and the
/// rig's current rotations.
///
/// The subject is assumed to be holding the reference pose; no pose checks
/// happen here.
#[derive(Copy, Clone, Debug)]
pub struct CalibrationBuilder {
    pub foot_tracking: bool,
}

impl Default for CalibrationBuilder {
    fn default() -> Self {
        Self {
            foot_tracking: true,
        }
    }
}

impl CalibrationBuilder {
    pub fn new(foot_tracking: bool) -> Self {
        Self { foot_tracking }
    }

    pub fn build(&self, rig: &Rig, source: &impl TrackingSource) -> CalibrationOutcome {
        let mut faults = Vec::new();

        let spine = self.build_spine(rig, source, &mut faults);

        let mut limbs = BTreeMap::new();
        for segment in LIMB_SEGMENTS.iter() {
            if segment.foot && !self.foot_tracking {
                continue;
            }
            match BoneCalibration::capture(
                rig,
                segment.bone,
                segment.child,
                TrackingPoint::Landmark(segment.from),
                TrackingPoint::Landmark(segment.to),
                source,
            ) {
                Ok(calibration) => {
                    limbs.insert(segment.bone, calibration);
                }
                Err(fault) => faults.push(fault),
            }
        }

        CalibrationOutcome {
            set: SkeletonCalibrationSet { limbs, spine },
            faults,
        }
    }

    fn build_spine(
        &self,
        rig: &Rig,
        source: &impl TrackingSource,
        faults: &mut Vec<Fault>,
    ) -> Option<SpineCalibration> {
        let mut capture = |role: SpineRole| {
            let (bone, child) = role.bones();
            let (from, to) = role.tracking();
            BoneCalibration::capture(rig, bone, child, from, to, source)
                .map_err(|fault| faults.push(fault))
                .ok()
        };

        // Capture all four before bailing so every missing bone gets reported.
        let hips_twist = capture(SpineRole::HipsTwist);
        let spine_up_down = capture(SpineRole::SpineUpDown);
        let chest = capture(SpineRole::Chest);
        let head = capture(SpineRole::Head);

        Some(SpineCalibration {
            hips_twist: hips_twist?,
            spine_up_down: spine_up_down?,
            chest: chest?,
            head: head?,
        })
    }
}
