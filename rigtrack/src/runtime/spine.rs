use crate::geometry::{shortest_arc, slerp_direction};
use crate::{Fault, SpineCalibration, TrackingSource};
use glam::Quat;

/// Target rotations for the torso chain plus the root's corrective twist.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpineTargets {
    pub hips: Quat,
    pub spine: Quat,
    pub chest: Quat,
    pub head: Quat,
    /// Delta to apply on top of the root's rotation at calibration time.
    pub root_delta: Quat,
}

/// Partial rotations measured from the torso tracking lines.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpineDeltas {
    pub twist: Quat,
    pub up_down: Quat,
    pub head: Quat,
    pub root: Quat,
}

impl SpineCalibration {
    /// Measures the damped twist and lean and the full head rotation.
    ///
    /// `damping` is the fraction of twist/lean carried over; the root delta
    /// reuses the damped twist direction with its vertical part scaled by
    /// `vertical_damping`.
    pub fn deltas(
        &self,
        source: &impl TrackingSource,
        damping: f32,
        vertical_damping: f32,
    ) -> Result<SpineDeltas, Fault> {
        let twist_dir = self.hips_twist.current_direction(source)?;
        let lean_dir = self.spine_up_down.current_direction(source)?;
        let head_dir = self.head.current_direction(source)?;

        let twist_init = self.hips_twist.initial_direction;
        let lean_init = self.spine_up_down.initial_direction;

        let damped_twist = slerp_direction(twist_init, twist_dir, damping);
        let damped_lean = slerp_direction(lean_init, lean_dir, damping);

        let mut root_dir = damped_twist;
        root_dir.y *= vertical_damping;

        Ok(SpineDeltas {
            twist: shortest_arc(twist_init, damped_twist),
            up_down: shortest_arc(lean_init, damped_lean),
            head: self.head.delta_to(head_dir),
            root: shortest_arc(twist_init, root_dir),
        })
    }

    /// Composes the chain so each bone inherits a share of the pelvis motion
    /// instead of every bone applying the full lean and twist on its own.
    pub fn targets(
        &self,
        source: &impl TrackingSource,
        damping: f32,
        vertical_damping: f32,
    ) -> Result<SpineTargets, Fault> {
        let SpineDeltas {
            twist,
            up_down,
            head,
            root,
        } = self.deltas(source, damping, vertical_damping)?;

        let hips = up_down * up_down * up_down * twist * twist;
        let spine = hips * twist * up_down;
        let chest = spine * twist * twist;

        Ok(SpineTargets {
            hips: hips * self.hips_twist.initial_rotation,
            spine: spine * self.spine_up_down.initial_rotation,
            chest: chest * self.chest.initial_rotation,
            head: up_down * twist * head * self.head.initial_rotation,
            root_delta: root,
        })
    }
}
