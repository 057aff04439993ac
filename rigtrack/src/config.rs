use crate::{Error, LayerMask, TrackingSpace};

/// Tuning for calibration and the per-frame retarget tick.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RetargetConfig {
    pub tracking: TrackingSpace,

    /// Surfaces the foot rays may hit.
    pub ground_layers: LayerMask,
    /// Extra height kept between the detected ground and the feet.
    pub ground_offset: f32,
    pub ground_probe_distance: f32,
    pub ground_rate: f32,
    pub ground_tracking: bool,

    /// Calibrate ankle -> toe segments as well.
    pub foot_tracking: bool,

    pub limb_rate: f32,
    pub spine_rate: f32,
    pub root_rate: f32,

    /// Fraction of measured pelvis twist and lean fed into the spine chain.
    pub spine_damping: f32,
    /// Scale applied to the vertical part of the root's corrective twist.
    pub root_vertical_damping: f32,
}

impl Default for RetargetConfig {
    fn default() -> Self {
        Self {
            tracking: TrackingSpace::default(),
            ground_layers: LayerMask::ALL,
            ground_offset: 0.1,
            ground_probe_distance: 100.0,
            ground_rate: 5.0,
            ground_tracking: true,
            foot_tracking: true,
            limb_rate: 10.0,
            spine_rate: 10.0,
            root_rate: 10.0,
            spine_damping: 0.25,
            root_vertical_damping: 0.5,
        }
    }
}

impl RetargetConfig {
    pub fn validate(&self) -> Result<(), Error> {
        let rates = [
            ("tracking.scale", self.tracking.scale),
            ("ground_probe_distance", self.ground_probe_distance),
            ("ground_rate", self.ground_rate),
            ("limb_rate", self.limb_rate),
            ("spine_rate", self.spine_rate),
            ("root_rate", self.root_rate),
        ];
        for (name, value) in rates {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidValue {
                    message: format!("{name} must be finite and non-negative, got {value}"),
                });
            }
        }

        if !self.ground_offset.is_finite() {
            return Err(Error::InvalidValue {
                message: format!("ground_offset must be finite, got {}", self.ground_offset),
            });
        }
        if !self.tracking.min_confidence.is_finite() {
            return Err(Error::InvalidValue {
                message: format!(
                    "tracking.min_confidence must be finite, got {}",
                    self.tracking.min_confidence
                ),
            });
        }

        let fractions = [
            ("spine_damping", self.spine_damping),
            ("root_vertical_damping", self.root_vertical_damping),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidValue {
                    message: format!("{name} must be within [0, 1], got {value}"),
                });
            }
        }

        Ok(())
    }
}
