//! JSON codecs for calibration snapshots and engine configuration.
//!
//! Both are IO-free: they operate on in-memory strings.

use crate::{
    CalibrationSnapshot, Error, HumanBone, LayerMask, RetargetConfig, SnapshotEntry, TrackingSpace,
};
use serde::{Deserialize, Serialize};

const SNAPSHOT_VERSION: u32 = 1;

fn default_snapshot_version() -> u32 {
    SNAPSHOT_VERSION
}

#[derive(Debug, Serialize, Deserialize)]
struct EntryDef {
    bone: String,
    direction: [f32; 3],
    rotation: [f32; 4],
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotDef {
    #[serde(default = "default_snapshot_version")]
    version: u32,
    #[serde(default)]
    limbs: Vec<EntryDef>,
    hips_twist: EntryDef,
    spine_up_down: EntryDef,
    chest: EntryDef,
    head: EntryDef,
}

impl EntryDef {
    fn from_entry(entry: &SnapshotEntry) -> Self {
        Self {
            bone: entry.bone.name().to_string(),
            direction: entry.direction,
            rotation: entry.rotation,
        }
    }

    fn into_entry(self) -> Result<SnapshotEntry, Error> {
        let bone = HumanBone::from_name(&self.bone).ok_or(Error::UnknownBone {
            name: self.bone.clone(),
        })?;
        let finite = self
            .direction
            .iter()
            .chain(self.rotation.iter())
            .all(|v| v.is_finite());
        if !finite {
            return Err(Error::InvalidValue {
                message: format!("non-finite calibration values for bone '{bone}'"),
            });
        }
        Ok(SnapshotEntry {
            bone,
            direction: self.direction,
            rotation: self.rotation,
        })
    }
}

impl CalibrationSnapshot {
    pub fn from_json_str(input: &str) -> Result<Self, Error> {
        let def: SnapshotDef = serde_json::from_str(input).map_err(|e| Error::JsonParse {
            message: e.to_string(),
        })?;
        if def.version != SNAPSHOT_VERSION {
            return Err(Error::JsonParse {
                message: format!("unsupported snapshot version {}", def.version),
            });
        }

        Ok(Self {
            limbs: def
                .limbs
                .into_iter()
                .map(EntryDef::into_entry)
                .collect::<Result<Vec<_>, _>>()?,
            hips_twist: def.hips_twist.into_entry()?,
            spine_up_down: def.spine_up_down.into_entry()?,
            chest: def.chest.into_entry()?,
            head: def.head.into_entry()?,
        })
    }

    pub fn to_json_string(&self) -> Result<String, Error> {
        let def = SnapshotDef {
            version: SNAPSHOT_VERSION,
            limbs: self.limbs.iter().map(EntryDef::from_entry).collect(),
            hips_twist: EntryDef::from_entry(&self.hips_twist),
            spine_up_down: EntryDef::from_entry(&self.spine_up_down),
            chest: EntryDef::from_entry(&self.chest),
            head: EntryDef::from_entry(&self.head),
        };
        serde_json::to_string_pretty(&def).map_err(|e| Error::JsonParse {
            message: e.to_string(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TrackingDef {
    scale: Option<f32>,
    mirror_x: Option<bool>,
    flip_y: Option<bool>,
    min_confidence: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigDef {
    #[serde(default)]
    tracking: TrackingDef,
    /// Layer indices; absent means every layer.
    ground_layers: Option<Vec<u32>>,
    ground_offset: Option<f32>,
    ground_probe_distance: Option<f32>,
    ground_rate: Option<f32>,
    ground_tracking: Option<bool>,
    foot_tracking: Option<bool>,
    limb_rate: Option<f32>,
    spine_rate: Option<f32>,
    root_rate: Option<f32>,
    spine_damping: Option<f32>,
    root_vertical_damping: Option<f32>,
}

impl RetargetConfig {
    /// Parses a config where every field is optional and falls back to
    /// [`RetargetConfig::default`]. The result is validated.
    pub fn from_json_str(input: &str) -> Result<Self, Error> {
        let def: ConfigDef = serde_json::from_str(input).map_err(|e| Error::JsonParse {
            message: e.to_string(),
        })?;

        let defaults = Self::default();
        let tracking_defaults = TrackingSpace::default();

        let ground_layers = match def.ground_layers {
            None => defaults.ground_layers,
            Some(layers) => {
                let mut mask = LayerMask::NONE;
                for layer in layers {
                    if layer >= 32 {
                        return Err(Error::InvalidValue {
                            message: format!("ground layer {layer} is out of range 0..32"),
                        });
                    }
                    mask.0 |= LayerMask::layer(layer).0;
                }
                mask
            }
        };

        let config = Self {
            tracking: TrackingSpace {
                scale: def.tracking.scale.unwrap_or(tracking_defaults.scale),
                mirror_x: def.tracking.mirror_x.unwrap_or(tracking_defaults.mirror_x),
                flip_y: def.tracking.flip_y.unwrap_or(tracking_defaults.flip_y),
                min_confidence: def
                    .tracking
                    .min_confidence
                    .unwrap_or(tracking_defaults.min_confidence),
            },
            ground_layers,
            ground_offset: def.ground_offset.unwrap_or(defaults.ground_offset),
            ground_probe_distance: def
                .ground_probe_distance
                .unwrap_or(defaults.ground_probe_distance),
            ground_rate: def.ground_rate.unwrap_or(defaults.ground_rate),
            ground_tracking: def.ground_tracking.unwrap_or(defaults.ground_tracking),
            foot_tracking: def.foot_tracking.unwrap_or(defaults.foot_tracking),
            limb_rate: def.limb_rate.unwrap_or(defaults.limb_rate),
            spine_rate: def.spine_rate.unwrap_or(defaults.spine_rate),
            root_rate: def.root_rate.unwrap_or(defaults.root_rate),
            spine_damping: def.spine_damping.unwrap_or(defaults.spine_damping),
            root_vertical_damping: def
                .root_vertical_damping
                .unwrap_or(defaults.root_vertical_damping),
        };
        config.validate()?;
        Ok(config)
    }
}
