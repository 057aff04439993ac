use crate::test_support::{assert_quat_approx, assert_vec3_approx, humanoid_rig, t_pose};
use crate::{CalibrationBuilder, Fault, HumanBone, Landmark, TrackingPoint};
use glam::Vec3;

#[test]
fn rest_pose_targets_are_the_bind_rotations() {
    let points = t_pose();
    let set = CalibrationBuilder::default()
        .build(&humanoid_rig(), &points)
        .set;

    let mut seen = 0;
    for (bone, target) in set.limb_targets(&points) {
        assert_eq!(target.unwrap(), set.limb(bone).unwrap().initial_rotation, "{bone}");
        seen += 1;
    }
    assert_eq!(seen, set.limbs.len());
}

#[test]
fn bent_elbow_rotates_the_lower_arm_onto_the_new_direction() {
    let mut points = t_pose();
    let set = CalibrationBuilder::default()
        .build(&humanoid_rig(), &points)
        .set;
    let calibration = set.limb(HumanBone::RightLowerArm).unwrap();

    // Forearm now points straight up.
    points.set_landmark(Landmark::RightWrist, Vec3::new(0.5, 1.8, 0.0));
    let target = calibration.limb_target(&points).unwrap();
    let delta = target * calibration.initial_rotation.inverse();
    assert_vec3_approx(delta * Vec3::X, Vec3::Y, 1.0e-5, "forearm up");

    let upper = set.limb(HumanBone::RightUpperArm).unwrap();
    assert_eq!(upper.limb_target(&points).unwrap(), upper.initial_rotation);
}

#[test]
fn lost_point_only_holds_the_bones_that_use_it() {
    let mut points = t_pose();
    let mut rig = humanoid_rig();
    let set = CalibrationBuilder::default().build(&rig, &points).set;
    let before = rig.clone();

    points.clear_landmark(Landmark::RightWrist);
    points.set_landmark(Landmark::LeftWrist, Vec3::new(-0.5, 1.2, 0.0));

    let mut updated = Vec::new();
    let mut faults = Vec::new();
    set.drive_limbs(&mut rig, &points, 1000.0, 0.1, &mut updated, &mut faults);

    assert_eq!(
        faults,
        vec![Fault::missing_point(TrackingPoint::Landmark(
            Landmark::RightWrist
        ))]
    );
    assert!(!updated.contains(&HumanBone::RightLowerArm));
    assert_eq!(updated.len(), set.limbs.len() - 1);
    assert_eq!(
        rig.bone(HumanBone::RightLowerArm),
        before.bone(HumanBone::RightLowerArm)
    );

    let left = set.limb(HumanBone::LeftLowerArm).unwrap();
    let moved = rig.rotation(HumanBone::LeftLowerArm).unwrap();
    assert_quat_approx(moved, left.limb_target(&points).unwrap(), 1.0e-6, "left forearm");
    assert_vec3_approx(
        moved * left.initial_rotation.inverse() * -Vec3::X,
        -Vec3::Y,
        1.0e-5,
        "left forearm down",
    );
}

#[test]
fn limb_driving_never_touches_the_spine_or_root() {
    let points = t_pose();
    let mut rig = humanoid_rig();
    let set = CalibrationBuilder::default().build(&rig, &points).set;
    let before = rig.clone();

    set.drive_limbs(&mut rig, &points, 10.0, 0.016, &mut Vec::new(), &mut Vec::new());

    for bone in [
        HumanBone::Hips,
        HumanBone::Spine,
        HumanBone::Chest,
        HumanBone::Neck,
        HumanBone::Head,
    ] {
        assert_eq!(rig.bone(bone), before.bone(bone), "{bone}");
    }
    assert_eq!(rig.root, before.root);
}
