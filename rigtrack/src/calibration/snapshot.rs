use crate::{
    BoneCalibration, Error, HumanBone, SkeletonCalibrationSet, SpineCalibration, SpineRole,
    TrackingPoint, limb_segment,
};
use glam::{Quat, Vec3};
use std::collections::BTreeMap;

/// Persistable part of one [`BoneCalibration`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SnapshotEntry {
    pub bone: HumanBone,
    pub direction: [f32; 3],
    /// `[x, y, z, w]`
    pub rotation: [f32; 4],
}

impl SnapshotEntry {
    pub fn from_calibration(calibration: &BoneCalibration) -> Self {
        Self {
            bone: calibration.bone,
            direction: calibration.initial_direction.to_array(),
            rotation: calibration.initial_rotation.to_array(),
        }
    }

    pub fn direction(&self) -> Vec3 {
        Vec3::from_array(self.direction)
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_array(self.rotation)
    }
}

/// Saved calibration that can be restored in a later session without asking
/// the subject to hold the reference pose again.
///
/// Tracking references are not stored; they are implied by the bone.
#[derive(Clone, Debug, PartialEq)]
pub struct CalibrationSnapshot {
    pub limbs: Vec<SnapshotEntry>,
    pub hips_twist: SnapshotEntry,
    pub spine_up_down: SnapshotEntry,
    pub chest: SnapshotEntry,
    pub head: SnapshotEntry,
}

impl CalibrationSnapshot {
    pub fn spine_entry(&self, role: SpineRole) -> &SnapshotEntry {
        match role {
            SpineRole::HipsTwist => &self.hips_twist,
            SpineRole::SpineUpDown => &self.spine_up_down,
            SpineRole::Chest => &self.chest,
            SpineRole::Head => &self.head,
        }
    }

    /// Every bone the snapshot drives or references.
    pub fn referenced_bones(&self) -> Vec<HumanBone> {
        let mut bones = Vec::new();
        for entry in &self.limbs {
            bones.push(entry.bone);
            if let Some(segment) = limb_segment(entry.bone) {
                bones.push(segment.child);
            }
        }
        for role in SpineRole::ALL {
            let (bone, child) = role.bones();
            bones.push(bone);
            bones.push(child);
        }
        bones.sort();
        bones.dedup();
        bones
    }
}

impl SkeletonCalibrationSet {
    /// Returns `None` when the set has no spine records, since a snapshot
    /// always carries all four.
    pub fn snapshot(&self) -> Option<CalibrationSnapshot> {
        let spine = self.spine.as_ref()?;
        Some(CalibrationSnapshot {
            limbs: self
                .limbs
                .values()
                .map(SnapshotEntry::from_calibration)
                .collect(),
            hips_twist: SnapshotEntry::from_calibration(&spine.hips_twist),
            spine_up_down: SnapshotEntry::from_calibration(&spine.spine_up_down),
            chest: SnapshotEntry::from_calibration(&spine.chest),
            head: SnapshotEntry::from_calibration(&spine.head),
        })
    }

    pub fn from_snapshot(snapshot: &CalibrationSnapshot) -> Result<Self, Error> {
        let mut limbs = BTreeMap::new();
        for entry in &snapshot.limbs {
            let segment =
                limb_segment(entry.bone).ok_or(Error::UnknownSegment { bone: entry.bone })?;
            let calibration = BoneCalibration {
                bone: segment.bone,
                child: segment.child,
                tracking_parent: TrackingPoint::Landmark(segment.from),
                tracking_child: TrackingPoint::Landmark(segment.to),
                initial_direction: entry.direction(),
                initial_rotation: entry.rotation(),
            };
            if limbs.insert(entry.bone, calibration).is_some() {
                return Err(Error::DuplicateBone { bone: entry.bone });
            }
        }

        let restore = |role: SpineRole| -> Result<BoneCalibration, Error> {
            let entry = snapshot.spine_entry(role);
            let (bone, child) = role.bones();
            if entry.bone != bone {
                return Err(Error::InvalidValue {
                    message: format!(
                        "{} entry must reference bone '{bone}', got '{}'",
                        role.name(),
                        entry.bone
                    ),
                });
            }
            let (tracking_parent, tracking_child) = role.tracking();
            Ok(BoneCalibration {
                bone,
                child,
                tracking_parent,
                tracking_child,
                initial_direction: entry.direction(),
                initial_rotation: entry.rotation(),
            })
        };

        let spine = SpineCalibration {
            hips_twist: restore(SpineRole::HipsTwist)?,
            spine_up_down: restore(SpineRole::SpineUpDown)?,
            chest: restore(SpineRole::Chest)?,
            head: restore(SpineRole::Head)?,
        };

        Ok(Self {
            limbs,
            spine: Some(spine),
        })
    }
}
