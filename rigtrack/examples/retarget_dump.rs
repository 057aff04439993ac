use glam::{Quat, Vec3};
use rigtrack::{
    GroundPlane, GroundSurfaces, HumanBone, Landmark, RetargetConfig, Retargeter, Rig, RigBone,
    TrackingPointSet,
};
use serde_json::json;
use std::path::PathBuf;

fn reference_points() -> TrackingPointSet {
    let mut points = TrackingPointSet::new();
    for (landmark, position) in [
        (Landmark::Nose, Vec3::new(0.0, 1.7, 0.1)),
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
    ] {
        points.set_landmark(landmark, position);
    }
    points
}

/// Every bone at identity, placed roughly where the matching landmark sits.
fn reference_rig() -> Rig {
    let mut rig = Rig::new();
    let points = reference_points();
    let at = |landmark: Landmark| points.landmark(landmark).unwrap_or(Vec3::ZERO);
    for bone in HumanBone::ALL {
        let position = match bone {
            HumanBone::Hips => Vec3::new(0.0, 1.0, 0.0),
            HumanBone::Spine => Vec3::new(0.0, 1.1, 0.0),
            HumanBone::Chest => Vec3::new(0.0, 1.3, 0.0),
            HumanBone::Neck => Vec3::new(0.0, 1.5, 0.0),
            HumanBone::Head => Vec3::new(0.0, 1.6, 0.0),
            HumanBone::LeftUpperArm => at(Landmark::LeftShoulder),
            HumanBone::LeftLowerArm => at(Landmark::LeftElbow),
            HumanBone::LeftHand => at(Landmark::LeftWrist),
            HumanBone::RightUpperArm => at(Landmark::RightShoulder),
            HumanBone::RightLowerArm => at(Landmark::RightElbow),
            HumanBone::RightHand => at(Landmark::RightWrist),
            HumanBone::LeftUpperLeg => at(Landmark::LeftHip),
            HumanBone::LeftLowerLeg => at(Landmark::LeftKnee),
            HumanBone::LeftFoot => at(Landmark::LeftAnkle),
            HumanBone::LeftToes => at(Landmark::LeftFootIndex),
            HumanBone::RightUpperLeg => at(Landmark::RightHip),
            HumanBone::RightLowerLeg => at(Landmark::RightKnee),
            HumanBone::RightFoot => at(Landmark::RightAnkle),
            HumanBone::RightToes => at(Landmark::RightFootIndex),
        };
        rig.insert(bone, RigBone::new(position, Quat::IDENTITY));
    }
    rig
}

fn main() {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut config_path: Option<PathBuf> = None;
    let mut frames = 30usize;
    let mut dt = 1.0f32 / 30.0;

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                config_path = args.get(i + 1).map(PathBuf::from);
                i += 2;
            }
            "--frames" => {
                frames = args.get(i + 1).and_then(|s| s.parse().ok()).unwrap_or(frames);
                i += 2;
            }
            "--dt" => {
                dt = args.get(i + 1).and_then(|s| s.parse().ok()).unwrap_or(dt);
                i += 2;
            }
            other => {
                eprintln!("ignoring argument {other}");
                i += 1;
            }
        }
    }

    let config = match config_path {
        Some(path) => {
            let text = std::fs::read_to_string(&path).expect("read config");
            RetargetConfig::from_json_str(&text).expect("parse config")
        }
        None => RetargetConfig::default(),
    };

    let mut rig = reference_rig();
    let mut engine = Retargeter::new(reference_points(), config).expect("valid config");
    let faults = engine.calibrate(&mut rig);

    // Raise the right forearm, bend the left knee and turn the pelvis.
    let points = engine.source_mut();
    points.set_landmark(Landmark::RightWrist, Vec3::new(0.5, 1.8, 0.0));
    points.set_landmark(Landmark::LeftAnkle, Vec3::new(-0.1, 0.2, -0.35));
    let turn = Quat::from_rotation_y(0.4);
    for landmark in [Landmark::LeftHip, Landmark::RightHip] {
        let pivot = Vec3::new(0.0, 1.0, 0.0);
        let p = points.landmark(landmark).unwrap_or(pivot);
        points.set_landmark(landmark, pivot + turn * (p - pivot));
    }

    let ground = GroundSurfaces::new().with_plane(GroundPlane::new(0.0));
    let mut last = None;
    for _ in 0..frames {
        last = Some(engine.tick(&mut rig, &ground, dt));
    }

    let bones: Vec<_> = rig
        .bones()
        .map(|(bone, data)| {
            let r = data.rotation;
            json!({
                "name": bone.name(),
                "rotation": [r.x, r.y, r.z, r.w],
            })
        })
        .collect();

    let report = last.map(|report| {
        json!({
            "updated": report.updated_bones.iter().map(|b| b.name()).collect::<Vec<_>>(),
            "faults": report.faults.iter().map(|f| f.to_string()).collect::<Vec<_>>(),
            "ground": format!("{:?}", report.ground),
        })
    });

    let root = rig.root;
    let out = json!({
        "calibrationFaults": faults.iter().map(|f| f.to_string()).collect::<Vec<_>>(),
        "frames": frames,
        "root": {
            "position": [root.position.x, root.position.y, root.position.z],
            "rotation": [root.rotation.x, root.rotation.y, root.rotation.z, root.rotation.w],
        },
        "bones": bones,
        "lastTick": report,
        "snapshot": engine
            .snapshot()
            .map(|s| s.to_json_string().expect("serialize snapshot")),
    });

    println!("{}", serde_json::to_string_pretty(&out).expect("serialize"));
}
