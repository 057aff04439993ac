use crate::geometry::advance_rotation;
use crate::{
    CalibrationBuilder, CalibrationSnapshot, Error, Fault, FootGroundStabilizer, FrameReceiver,
    GroundContact, GroundProbe, HumanBone, RetargetConfig, Rig, SkeletonCalibrationSet,
    TrackingFeed, TrackingSource,
};
use glam::Quat;
use std::collections::HashSet;
use std::sync::Arc;

/// What happened during one retarget tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// False when the tick was a no-op because nothing is calibrated.
    pub calibrated: bool,
    /// Bones whose rotation was written this tick.
    pub updated_bones: Vec<HumanBone>,
    pub faults: Vec<Fault>,
    pub ground: GroundContact,
}

/// Calibration-based retargeting engine.
///
/// Owns the injected tracking source and the active calibration. Each
/// [`Retargeter::tick`] refreshes the source once, then writes limb, spine and
/// root transforms on the rig passed in.
pub struct Retargeter<T: TrackingSource> {
    source: T,
    config: RetargetConfig,
    calibration: Option<Arc<SkeletonCalibrationSet>>,
    stabilizer: Option<FootGroundStabilizer>,
    initial_root_rotation: Quat,
    reported: HashSet<Fault>,
}

impl<T: TrackingSource> Retargeter<T> {
    pub fn new(source: T, config: RetargetConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            source,
            config,
            calibration: None,
            stabilizer: None,
            initial_root_rotation: Quat::IDENTITY,
            reported: HashSet::new(),
        })
    }

    pub fn source(&self) -> &T {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut T {
        &mut self.source
    }

    pub fn config(&self) -> &RetargetConfig {
        &self.config
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibration.is_some()
    }

    /// Shared handle to the active calibration. Holders keep seeing the set
    /// they cloned even if a recalibration swaps in a new one.
    pub fn calibration(&self) -> Option<Arc<SkeletonCalibrationSet>> {
        self.calibration.clone()
    }

    pub fn stabilizer(&self) -> Option<&FootGroundStabilizer> {
        self.stabilizer.as_ref()
    }

    /// Records the current tracking pose against the rig's current rotations.
    ///
    /// The caller asserts that the subject holds the reference pose. Any
    /// previous calibration is replaced in one step.
    pub fn calibrate(&mut self, rig: &mut Rig) -> Vec<Fault> {
        let builder = CalibrationBuilder::new(self.config.foot_tracking);
        let outcome = builder.build(rig, &self.source);
        self.activate(outcome.set, rig);

        for fault in &outcome.faults {
            self.report(*fault);
        }
        if let Some(set) = &self.calibration {
            log::info!(
                "calibrated {} limb bones, spine chain {}",
                set.limbs.len(),
                if set.spine.is_some() { "on" } else { "off" }
            );
        }
        outcome.faults
    }

    /// Activates a previously saved calibration.
    pub fn restore(&mut self, snapshot: &CalibrationSnapshot, rig: &mut Rig) -> Result<(), Error> {
        for bone in snapshot.referenced_bones() {
            if !rig.contains(bone) {
                return Err(Error::MissingBone { bone });
            }
        }
        let set = SkeletonCalibrationSet::from_snapshot(snapshot)?;
        self.activate(set, rig);
        log::info!("restored calibration with {} limb bones", snapshot.limbs.len());
        Ok(())
    }

    /// Persistable copy of the active calibration.
    ///
    /// `None` when nothing is calibrated, and also when the spine chain could
    /// not be calibrated (a torso bone is missing from the rig): snapshots
    /// always carry all four spine records, so limb-only calibrations cannot
    /// be saved.
    pub fn snapshot(&self) -> Option<CalibrationSnapshot> {
        self.calibration.as_ref().and_then(|set| set.snapshot())
    }

    /// Drops the active calibration and hands the rig back to its animator.
    pub fn clear(&mut self, rig: &mut Rig) {
        self.calibration = None;
        self.stabilizer = None;
        self.reported.clear();
        rig.animator_enabled = true;
    }

    fn activate(&mut self, set: SkeletonCalibrationSet, rig: &mut Rig) {
        let mut stabilizer = FootGroundStabilizer::new(rig.root.position);
        stabilizer.layers = self.config.ground_layers;
        stabilizer.ground_offset = self.config.ground_offset;
        stabilizer.probe_distance = self.config.ground_probe_distance;
        stabilizer.rate = self.config.ground_rate;

        self.calibration = Some(Arc::new(set));
        self.stabilizer = Some(stabilizer);
        self.initial_root_rotation = rig.root.rotation;
        self.reported.clear();
        rig.animator_enabled = false;
    }

    fn report(&mut self, fault: Fault) {
        if self.reported.insert(fault) {
            log::warn!("{fault}");
        }
    }

    pub fn tick(&mut self, rig: &mut Rig, ground: &impl GroundProbe, dt: f32) -> TickReport {
        self.source.refresh();

        let Some(set) = self.calibration.clone() else {
            return TickReport {
                faults: vec![Fault::StaleCalibration],
                ..TickReport::default()
            };
        };

        let mut report = TickReport {
            calibrated: true,
            ..TickReport::default()
        };

        set.drive_limbs(
            rig,
            &self.source,
            self.config.limb_rate,
            dt,
            &mut report.updated_bones,
            &mut report.faults,
        );

        if let Some(spine) = &set.spine {
            match spine.targets(
                &self.source,
                self.config.spine_damping,
                self.config.root_vertical_damping,
            ) {
                Ok(targets) => {
                    let rate = self.config.spine_rate;
                    let steps = [
                        (&spine.hips_twist, targets.hips),
                        (&spine.spine_up_down, targets.spine),
                        (&spine.chest, targets.chest),
                        (&spine.head, targets.head),
                    ];
                    for (calibration, target) in steps {
                        match calibration.advance_towards(rig, target, rate, dt) {
                            Ok(_) => report.updated_bones.push(calibration.bone),
                            Err(fault) => report.faults.push(fault),
                        }
                    }

                    let root_target = targets.root_delta * self.initial_root_rotation;
                    rig.root.rotation = advance_rotation(
                        rig.root.rotation,
                        root_target,
                        self.config.root_rate,
                        dt,
                    );
                }
                Err(fault) => report.faults.push(fault),
            }
        }

        if self.config.ground_tracking {
            if let Some(stabilizer) = &self.stabilizer {
                report.ground = stabilizer.stabilize(rig, ground, dt, &mut report.faults);
            }
        }

        for fault in report.faults.clone() {
            if fault != Fault::GroundNotFound {
                self.report(fault);
            }
        }

        report
    }
}

impl Retargeter<TrackingFeed> {
    /// Engine fed from a detector frame queue, with samples mapped through
    /// `config.tracking`.
    pub fn from_frames(frames: FrameReceiver, config: RetargetConfig) -> Result<Self, Error> {
        let feed = TrackingFeed::from_config(frames, &config);
        Self::new(feed, config)
    }
}
