use crate::geometry::{advance_rotation, safe_normalize, shortest_arc};
use crate::{Fault, HumanBone, Rig, TrackingPoint, TrackingSource};
use glam::{Quat, Vec3};

/// Direction used when a tracking point cannot be resolved at capture time.
pub const FALLBACK_DIRECTION: Vec3 = Vec3::Z;

/// Correspondence between one tracked direction and one rig bone, recorded in
/// the reference pose.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoneCalibration {
    /// Bone whose rotation is driven.
    pub bone: HumanBone,
    /// Bone at the far end of the span; equal to `bone` for self-twist records.
    pub child: HumanBone,
    pub tracking_parent: TrackingPoint,
    pub tracking_child: TrackingPoint,
    pub initial_direction: Vec3,
    pub initial_rotation: Quat,
}

impl BoneCalibration {
    /// Records the current tracked direction and the bone's current rotation.
    ///
    /// Fails only when either bone is absent from the rig. Unresolvable or
    /// coincident tracking points fall back to [`FALLBACK_DIRECTION`].
    pub fn capture(
        rig: &Rig,
        bone: HumanBone,
        child: HumanBone,
        tracking_parent: TrackingPoint,
        tracking_child: TrackingPoint,
        source: &impl TrackingSource,
    ) -> Result<Self, Fault> {
        let initial_rotation = rig.rotation(bone).ok_or(Fault::missing_bone(bone))?;
        if !rig.contains(child) {
            return Err(Fault::missing_bone(child));
        }

        let initial_direction = match (source.point(tracking_parent), source.point(tracking_child))
        {
            (Some(from), Some(to)) => safe_normalize(to - from).unwrap_or(FALLBACK_DIRECTION),
            _ => FALLBACK_DIRECTION,
        };

        Ok(Self {
            bone,
            child,
            tracking_parent,
            tracking_child,
            initial_direction,
            initial_rotation,
        })
    }

    /// Live tracked direction, read from the source on every call.
    pub fn current_direction(&self, source: &impl TrackingSource) -> Result<Vec3, Fault> {
        let from = source
            .point(self.tracking_parent)
            .ok_or(Fault::missing_point(self.tracking_parent))?;
        let to = source
            .point(self.tracking_child)
            .ok_or(Fault::missing_point(self.tracking_child))?;
        safe_normalize(to - from).ok_or(Fault::DegenerateDirection(self.bone))
    }

    /// Rotation from the calibrated direction to `direction`.
    pub fn delta_to(&self, direction: Vec3) -> Quat {
        shortest_arc(self.initial_direction, direction)
    }

    /// Single-hinge target: the calibrated rotation carried along by the
    /// shortest arc between the calibrated and live directions.
    pub fn limb_target(&self, source: &impl TrackingSource) -> Result<Quat, Fault> {
        let direction = self.current_direction(source)?;
        Ok(self.delta_to(direction) * self.initial_rotation)
    }

    /// Moves the driven bone toward `target` and writes the result back.
    pub fn advance_towards(
        &self,
        rig: &mut Rig,
        target: Quat,
        rate: f32,
        dt: f32,
    ) -> Result<Quat, Fault> {
        let bone = rig
            .bone_mut(self.bone)
            .ok_or(Fault::missing_bone(self.bone))?;
        bone.rotation = advance_rotation(bone.rotation, target, rate, dt);
        Ok(bone.rotation)
    }
}
