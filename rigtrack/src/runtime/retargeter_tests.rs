use crate::test_support::{assert_approx, assert_quat_approx, humanoid_rig, quat_angle, t_pose};
use crate::{
    Error, Fault, GroundContact, GroundPlane, GroundSurfaces, HumanBone, LIMB_SEGMENTS, Landmark,
    LandmarkFrame, LandmarkSample, RetargetConfig, Retargeter, TrackingFeed, TrackingPoint,
    TrackingPointSet, TrackingSpace, frame_channel,
};
use glam::{Quat, Vec3};
use std::sync::Arc;

fn retargeter(config: RetargetConfig) -> Retargeter<TrackingPointSet> {
    Retargeter::new(t_pose(), config).unwrap()
}

fn assert_rig_rotations_approx(actual: &crate::Rig, expected: &crate::Rig) {
    for bone in HumanBone::ALL {
        assert_quat_approx(
            actual.rotation(bone).unwrap(),
            expected.rotation(bone).unwrap(),
            1.0e-6,
            bone.name(),
        );
    }
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let config = RetargetConfig {
        limb_rate: f32::NAN,
        ..RetargetConfig::default()
    };
    assert!(matches!(
        Retargeter::new(t_pose(), config),
        Err(Error::InvalidValue { .. })
    ));
}

#[test]
fn ticking_without_calibration_is_a_no_op() {
    let mut engine = retargeter(RetargetConfig::default());
    let mut rig = humanoid_rig();
    let before = rig.clone();

    let report = engine.tick(&mut rig, &GroundSurfaces::new(), 0.016);
    assert!(!report.calibrated);
    assert_eq!(report.faults, vec![Fault::StaleCalibration]);
    assert!(report.updated_bones.is_empty());
    assert_eq!(report.ground, GroundContact::Inactive);
    assert_eq!(rig.root, before.root);
    assert_rig_rotations_approx(&rig, &before);
}

#[test]
fn calibrate_takes_over_the_rig() {
    let mut engine = retargeter(RetargetConfig::default());
    let mut rig = humanoid_rig();
    assert!(rig.animator_enabled);

    let faults = engine.calibrate(&mut rig);
    assert!(faults.is_empty(), "{faults:?}");
    assert!(engine.is_calibrated());
    assert!(!rig.animator_enabled);

    let stabilizer = engine.stabilizer().unwrap();
    assert_eq!(stabilizer.initial_root_position, rig.root.position);
    assert_eq!(stabilizer.ground_offset, engine.config().ground_offset);
}

#[test]
fn reference_pose_tick_keeps_the_bind_pose() {
    let mut engine = retargeter(RetargetConfig::default());
    let mut rig = humanoid_rig();
    engine.calibrate(&mut rig);
    let before = rig.clone();

    let report = engine.tick(&mut rig, &GroundSurfaces::new(), 0.016);
    assert!(report.calibrated);
    assert_eq!(report.updated_bones.len(), LIMB_SEGMENTS.len() + 4);
    assert_eq!(report.faults, vec![Fault::GroundNotFound]);
    assert_eq!(report.ground, GroundContact::NotFound);
    assert_rig_rotations_approx(&rig, &before);
    assert_quat_approx(rig.root.rotation, before.root.rotation, 1.0e-6, "root");
}

#[test]
fn recalibration_replaces_the_set_in_one_step() {
    let mut engine = retargeter(RetargetConfig::default());
    let mut rig = humanoid_rig();
    engine.calibrate(&mut rig);
    let first = engine.calibration().unwrap();
    let first_copy = (*first).clone();

    engine
        .source_mut()
        .set_landmark(Landmark::RightWrist, Vec3::new(0.5, 1.8, 0.0));
    engine.calibrate(&mut rig);
    let second = engine.calibration().unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(*first, first_copy);
    assert_ne!(
        first.limb(HumanBone::RightLowerArm),
        second.limb(HumanBone::RightLowerArm)
    );
    assert_eq!(
        first.limb(HumanBone::LeftLowerArm),
        second.limb(HumanBone::LeftLowerArm)
    );
}

#[test]
fn zero_rate_never_moves_limbs() {
    let config = RetargetConfig {
        limb_rate: 0.0,
        ..RetargetConfig::default()
    };
    let mut engine = retargeter(config);
    let mut rig = humanoid_rig();
    engine.calibrate(&mut rig);
    let before = rig.clone();

    engine
        .source_mut()
        .set_landmark(Landmark::RightWrist, Vec3::new(0.5, 1.8, 0.0));
    for _ in 0..10 {
        engine.tick(&mut rig, &GroundSurfaces::new(), 0.1);
    }
    assert_eq!(
        rig.bone(HumanBone::RightLowerArm),
        before.bone(HumanBone::RightLowerArm)
    );
}

#[test]
fn limbs_converge_over_several_ticks() {
    let mut engine = retargeter(RetargetConfig::default());
    let mut rig = humanoid_rig();
    engine.calibrate(&mut rig);
    engine
        .source_mut()
        .set_landmark(Landmark::RightWrist, Vec3::new(0.5, 1.8, 0.0));
    let target = engine
        .calibration()
        .unwrap()
        .limb(HumanBone::RightLowerArm)
        .unwrap()
        .limb_target(engine.source())
        .unwrap();

    let mut last = quat_angle(rig.rotation(HumanBone::RightLowerArm).unwrap(), target);
    for _ in 0..5 {
        engine.tick(&mut rig, &GroundSurfaces::new(), 0.05);
        let remaining = quat_angle(rig.rotation(HumanBone::RightLowerArm).unwrap(), target);
        assert!(remaining < last, "{remaining} >= {last}");
        last = remaining;
    }
}

#[test]
fn pelvis_twist_turns_the_root() {
    let config = RetargetConfig {
        root_rate: 1000.0,
        ..RetargetConfig::default()
    };
    let mut engine = retargeter(config);
    let mut rig = humanoid_rig();
    engine.calibrate(&mut rig);

    let theta = 0.4;
    let turn = Quat::from_rotation_y(theta);
    let pivot = Vec3::new(0.0, 1.0, 0.0);
    for landmark in [Landmark::LeftHip, Landmark::RightHip] {
        let p = engine.source().landmark(landmark).unwrap();
        engine
            .source_mut()
            .set_landmark(landmark, pivot + turn * (p - pivot));
    }

    engine.tick(&mut rig, &GroundSurfaces::new(), 0.1);
    assert_approx(
        quat_angle(rig.root.rotation, Quat::IDENTITY),
        theta * 0.25,
        1.0e-3,
        "root turn",
    );
    assert_eq!(rig.root.position, Vec3::ZERO);
}

#[test]
fn spine_fault_leaves_limbs_running() {
    let mut engine = retargeter(RetargetConfig::default());
    let mut rig = humanoid_rig();
    engine.calibrate(&mut rig);
    engine.source_mut().clear_landmark(Landmark::Nose);
    let ground = GroundSurfaces::new().with_plane(GroundPlane::new(0.0));

    let report = engine.tick(&mut rig, &ground, 0.016);
    assert_eq!(
        report.faults,
        vec![Fault::missing_point(TrackingPoint::Landmark(Landmark::Nose))]
    );
    assert_eq!(report.updated_bones.len(), LIMB_SEGMENTS.len());
    assert!(matches!(report.ground, GroundContact::Grounded { .. }));
}

#[test]
fn ground_tracking_can_be_switched_off() {
    let config = RetargetConfig {
        ground_tracking: false,
        ..RetargetConfig::default()
    };
    let mut engine = retargeter(config);
    let mut rig = humanoid_rig();
    engine.calibrate(&mut rig);

    let report = engine.tick(&mut rig, &GroundSurfaces::new(), 0.016);
    assert_eq!(report.ground, GroundContact::Inactive);
    assert!(report.faults.is_empty());
}

#[test]
fn clear_returns_the_rig_to_its_animator() {
    let mut engine = retargeter(RetargetConfig::default());
    let mut rig = humanoid_rig();
    engine.calibrate(&mut rig);

    engine.clear(&mut rig);
    assert!(rig.animator_enabled);
    assert!(!engine.is_calibrated());
    assert!(engine.snapshot().is_none());
    let report = engine.tick(&mut rig, &GroundSurfaces::new(), 0.016);
    assert_eq!(report.faults, vec![Fault::StaleCalibration]);
}

#[test]
fn restore_requires_every_referenced_bone() {
    let mut engine = retargeter(RetargetConfig::default());
    let mut rig = humanoid_rig();
    engine.calibrate(&mut rig);
    let snapshot = engine.snapshot().unwrap();

    let mut fresh = retargeter(RetargetConfig::default());
    let mut partial = humanoid_rig();
    partial.remove(HumanBone::RightToes);
    assert!(matches!(
        fresh.restore(&snapshot, &mut partial),
        Err(Error::MissingBone {
            bone: HumanBone::RightToes
        })
    ));
    assert!(!fresh.is_calibrated());
    assert!(partial.animator_enabled);

    fresh.restore(&snapshot, &mut rig).unwrap();
    assert!(fresh.is_calibrated());
    assert_eq!(*fresh.calibration().unwrap(), *engine.calibration().unwrap());
}

fn detector_frame(points: &TrackingPointSet) -> LandmarkFrame {
    let samples = Landmark::ALL
        .iter()
        .map(|&landmark| match points.landmark(landmark) {
            // Inverse of the default tracking space.
            Some(p) => LandmarkSample::new(-p.x / 10.0, -p.y / 10.0, p.z / 10.0, 1.0),
            None => LandmarkSample::new(0.0, 0.0, 0.0, -1.0),
        })
        .collect();
    LandmarkFrame::new(samples)
}

#[test]
fn feed_frames_are_committed_at_the_start_of_a_tick() {
    let (tx, rx) = frame_channel(4);
    let feed = TrackingFeed::new(rx, TrackingSpace::default());
    let mut engine = Retargeter::new(feed, RetargetConfig::default()).unwrap();
    let mut rig = humanoid_rig();

    tx.try_send(detector_frame(&t_pose())).unwrap();
    assert_eq!(engine.source().points().frames(), 0);

    let report = engine.tick(&mut rig, &GroundSurfaces::new(), 0.016);
    assert!(!report.calibrated);
    assert_eq!(engine.source().points().frames(), 1);

    let faults = engine.calibrate(&mut rig);
    assert!(faults.is_empty(), "{faults:?}");
    let spine = engine.calibration().unwrap().spine.unwrap();
    assert!(spine.hips_twist.initial_direction.abs_diff_eq(-Vec3::X, 1.0e-5));
}

#[test]
fn frame_engine_maps_samples_through_the_config() {
    let (tx, rx) = frame_channel(2);
    let config = RetargetConfig {
        tracking: TrackingSpace {
            scale: 1.0,
            mirror_x: false,
            flip_y: false,
            min_confidence: 0.0,
        },
        ..RetargetConfig::default()
    };
    let mut engine = Retargeter::from_frames(rx, config).unwrap();
    let mut rig = humanoid_rig();

    let pose = t_pose();
    let samples = Landmark::ALL
        .iter()
        .map(|&landmark| match pose.landmark(landmark) {
            Some(p) => LandmarkSample::new(p.x, p.y, p.z, 1.0),
            None => LandmarkSample::new(0.0, 0.0, 0.0, -1.0),
        })
        .collect();
    tx.try_send(LandmarkFrame::new(samples)).unwrap();
    engine.tick(&mut rig, &GroundSurfaces::new(), 0.016);

    assert_eq!(*engine.source().space(), engine.config().tracking);
    assert!(
        engine
            .source()
            .points()
            .landmark(Landmark::Nose)
            .unwrap()
            .abs_diff_eq(Vec3::new(0.0, 1.7, 0.1), 1.0e-6)
    );

    assert!(engine.calibrate(&mut rig).is_empty());
    let spine = engine.calibration().unwrap().spine.unwrap();
    assert!(spine.hips_twist.initial_direction.abs_diff_eq(-Vec3::X, 1.0e-5));
}

#[test]
fn ground_step_follows_positions_written_by_the_host() {
    let config = RetargetConfig {
        ground_rate: 1000.0,
        ..RetargetConfig::default()
    };
    let mut engine = retargeter(config);
    let mut rig = humanoid_rig();
    engine.calibrate(&mut rig);
    let ground = GroundSurfaces::new().with_plane(GroundPlane::new(0.0));
    let displacement = |report: &crate::TickReport| match report.ground {
        GroundContact::Grounded { displacement } => displacement,
        other => panic!("unexpected contact {other:?}"),
    };

    let report = engine.tick(&mut rig, &ground, 0.1);
    assert_approx(displacement(&report), -0.1, 1.0e-6, "feet at rest");

    // A tick writes rotations only, so lifting the knee leaves the foot put.
    engine
        .source_mut()
        .set_landmark(Landmark::LeftAnkle, Vec3::new(-0.1, 0.4, 0.3));
    let feet_before = rig.bone(HumanBone::LeftFoot).unwrap().position;
    let report = engine.tick(&mut rig, &ground, 0.1);
    assert_eq!(rig.bone(HumanBone::LeftFoot).unwrap().position, feet_before);
    assert_approx(displacement(&report), -0.1, 1.0e-6, "positions unchanged");

    for foot in [HumanBone::LeftFoot, HumanBone::RightFoot] {
        rig.bone_mut(foot).unwrap().position.y = 0.3;
    }
    let report = engine.tick(&mut rig, &ground, 0.1);
    assert_approx(displacement(&report), -0.3, 1.0e-5, "host-written feet");
}

#[test]
fn limb_only_calibration_has_no_snapshot() {
    let mut engine = retargeter(RetargetConfig::default());
    let mut rig = humanoid_rig();
    rig.remove(HumanBone::Chest);

    let faults = engine.calibrate(&mut rig);
    assert!(faults.contains(&Fault::missing_bone(HumanBone::Chest)));
    assert!(engine.is_calibrated());
    assert_eq!(
        engine.calibration().unwrap().limbs.len(),
        LIMB_SEGMENTS.len()
    );
    assert!(engine.snapshot().is_none());
}
