use crate::{Fault, HumanBone, Rig, SkeletonCalibrationSet, TrackingSource};
use glam::Quat;

impl SkeletonCalibrationSet {
    /// Single-hinge target of every calibrated limb bone for the current frame.
    pub fn limb_targets<'a>(
        &'a self,
        source: &'a impl TrackingSource,
    ) -> impl Iterator<Item = (HumanBone, Result<Quat, Fault>)> + 'a {
        self.limbs
            .iter()
            .map(move |(&bone, calibration)| (bone, calibration.limb_target(source)))
    }

    /// Advances every limb bone toward its target. A bone whose target cannot be
    /// computed keeps its current rotation; the others are still driven.
    pub fn drive_limbs(
        &self,
        rig: &mut Rig,
        source: &impl TrackingSource,
        rate: f32,
        dt: f32,
        updated: &mut Vec<HumanBone>,
        faults: &mut Vec<Fault>,
    ) {
        for calibration in self.limbs.values() {
            let result = calibration
                .limb_target(source)
                .and_then(|target| calibration.advance_towards(rig, target, rate, dt));
            match result {
                Ok(_) => updated.push(calibration.bone),
                Err(fault) => faults.push(fault),
            }
        }
    }
}
