use crate::{HumanBone, Landmark, Rig, RigBone, TrackingPointSet};
use glam::{Quat, Vec3};

/// Arms-out reference stance, symmetric about the x = 0 plane.
pub(crate) fn t_pose() -> TrackingPointSet {
    let mut points = TrackingPointSet::new();
    let landmarks = [
        (Landmark::Nose, Vec3::new(0.0, 1.7, 0.1)),
        (Landmark::LeftEye, Vec3::new(-0.03, 1.73, 0.08)),
        (Landmark::RightEye, Vec3::new(0.03, 1.73, 0.08)),
        (Landmark::LeftShoulder, Vec3::new(-0.2, 1.5, 0.0)),
        (Landmark::RightShoulder, Vec3::new(0.2, 1.5, 0.0)),
        (Landmark::LeftElbow, Vec3::new(-0.5, 1.5, 0.0)),
        (Landmark::RightElbow, Vec3::new(0.5, 1.5, 0.0)),
        (Landmark::LeftWrist, Vec3::new(-0.8, 1.5, 0.0)),
        (Landmark::RightWrist, Vec3::new(0.8, 1.5, 0.0)),
        (Landmark::LeftHip, Vec3::new(-0.1, 1.0, 0.0)),
        (Landmark::RightHip, Vec3::new(0.1, 1.0, 0.0)),
        (Landmark::LeftKnee, Vec3::new(-0.1, 0.55, 0.0)),
        (Landmark::RightKnee, Vec3::new(0.1, 0.55, 0.0)),
        (Landmark::LeftAnkle, Vec3::new(-0.1, 0.1, 0.0)),
        (Landmark::RightAnkle, Vec3::new(0.1, 0.1, 0.0)),
        (Landmark::LeftFootIndex, Vec3::new(-0.1, 0.0, 0.15)),
        (Landmark::RightFootIndex, Vec3::new(0.1, 0.0, 0.15)),
    ];
    for (landmark, position) in landmarks {
        points.set_landmark(landmark, position);
    }
    points
}

/// Full humanoid rig whose bind rotations differ per bone so that mixing up
/// records would show in the output.
pub(crate) fn humanoid_rig() -> Rig {
    let mut rig = Rig::new();
    for (i, bone) in HumanBone::ALL.iter().enumerate() {
        let rotation =
            Quat::from_rotation_y(0.05 * i as f32) * Quat::from_rotation_x(0.02 * i as f32);
        rig.insert(*bone, RigBone::new(bone_position(*bone), rotation));
    }
    rig
}

fn bone_position(bone: HumanBone) -> Vec3 {
    match bone {
        HumanBone::Hips => Vec3::new(0.0, 1.0, 0.0),
        HumanBone::Spine => Vec3::new(0.0, 1.1, 0.0),
        HumanBone::Chest => Vec3::new(0.0, 1.3, 0.0),
        HumanBone::Neck => Vec3::new(0.0, 1.5, 0.0),
        HumanBone::Head => Vec3::new(0.0, 1.6, 0.0),
        HumanBone::LeftUpperArm => Vec3::new(-0.2, 1.5, 0.0),
        HumanBone::LeftLowerArm => Vec3::new(-0.5, 1.5, 0.0),
        HumanBone::LeftHand => Vec3::new(-0.8, 1.5, 0.0),
        HumanBone::RightUpperArm => Vec3::new(0.2, 1.5, 0.0),
        HumanBone::RightLowerArm => Vec3::new(0.5, 1.5, 0.0),
        HumanBone::RightHand => Vec3::new(0.8, 1.5, 0.0),
        HumanBone::LeftUpperLeg => Vec3::new(-0.1, 1.0, 0.0),
        HumanBone::LeftLowerLeg => Vec3::new(-0.1, 0.55, 0.0),
        HumanBone::LeftFoot => Vec3::new(-0.1, 0.1, 0.0),
        HumanBone::LeftToes => Vec3::new(-0.1, 0.0, 0.15),
        HumanBone::RightUpperLeg => Vec3::new(0.1, 1.0, 0.0),
        HumanBone::RightLowerLeg => Vec3::new(0.1, 0.55, 0.0),
        HumanBone::RightFoot => Vec3::new(0.1, 0.1, 0.0),
        HumanBone::RightToes => Vec3::new(0.1, 0.0, 0.15),
    }
}

pub(crate) fn assert_approx(actual: f32, expected: f32, eps: f32, ctx: &str) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= eps,
        "{ctx}: expected {expected}, got {actual} (diff {diff})"
    );
}

pub(crate) fn assert_vec3_approx(actual: Vec3, expected: Vec3, eps: f32, ctx: &str) {
    let diff = (actual - expected).length();
    assert!(
        diff <= eps,
        "{ctx}: expected {expected:?}, got {actual:?} (diff {diff})"
    );
}

/// Compares rotations, treating `q` and `-q` as equal.
pub(crate) fn assert_quat_approx(actual: Quat, expected: Quat, eps: f32, ctx: &str) {
    let dot = actual.dot(expected).abs();
    assert!(
        dot >= 1.0 - eps,
        "{ctx}: expected {expected:?}, got {actual:?} (|dot| {dot})"
    );
}

/// Angle of the rotation taking `a` to `b`.
pub(crate) fn quat_angle(a: Quat, b: Quat) -> f32 {
    2.0 * a.dot(b).abs().clamp(-1.0, 1.0).acos()
}
