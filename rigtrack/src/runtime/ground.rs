use crate::geometry::advance_position;
use crate::{Fault, HumanBone, Rig};
use glam::{Vec2, Vec3};

/// Bit set of surface layers a ray may hit.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    pub fn layer(index: u32) -> Self {
        Self(1u32.checked_shl(index).unwrap_or(0))
    }

    pub fn intersects(self, other: LayerMask) -> bool {
        self.0 & other.0 != 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Downward ray queries against the host's ground geometry.
pub trait GroundProbe {
    /// First hit straight below `origin` within `max_distance`, restricted to
    /// surfaces on `layers`.
    fn raycast_down(&self, origin: Vec3, max_distance: f32, layers: LayerMask) -> Option<Vec3>;
}

/// Horizontal surface at a fixed height, unbounded unless `half_extents` is set.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GroundPlane {
    pub height: f32,
    pub layer: LayerMask,
    /// Center of the bounded area on the XZ plane.
    pub center: Vec2,
    pub half_extents: Option<Vec2>,
}

impl GroundPlane {
    pub fn new(height: f32) -> Self {
        Self {
            height,
            layer: LayerMask::layer(0),
            center: Vec2::ZERO,
            half_extents: None,
        }
    }

    pub fn with_layer(mut self, layer: LayerMask) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_bounds(mut self, center: Vec2, half_extents: Vec2) -> Self {
        self.center = center;
        self.half_extents = Some(half_extents.abs());
        self
    }

    fn covers(&self, x: f32, z: f32) -> bool {
        match self.half_extents {
            None => true,
            Some(extents) => {
                (x - self.center.x).abs() <= extents.x && (z - self.center.y).abs() <= extents.y
            }
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroundSurfaces {
    pub planes: Vec<GroundPlane>,
}

impl GroundSurfaces {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plane(mut self, plane: GroundPlane) -> Self {
        self.planes.push(plane);
        self
    }
}

impl GroundProbe for GroundSurfaces {
    fn raycast_down(&self, origin: Vec3, max_distance: f32, layers: LayerMask) -> Option<Vec3> {
        self.planes
            .iter()
            .filter(|p| p.layer.intersects(layers))
            .filter(|p| p.covers(origin.x, origin.z))
            .filter(|p| {
                let drop = origin.y - p.height;
                (0.0..=max_distance).contains(&drop)
            })
            .map(|p| p.height)
            .reduce(f32::max)
            .map(|height| Vec3::new(origin.x, height, origin.z))
    }
}

/// Picks the per-foot correction to apply: the smaller magnitude when both
/// feet hit (ties go to the left foot), otherwise whichever foot hit.
pub fn select_displacement(left: Option<f32>, right: Option<f32>) -> Option<f32> {
    match (left, right) {
        (Some(l), Some(r)) => Some(if r.abs() < l.abs() { r } else { l }),
        (Some(l), None) => Some(l),
        (None, Some(r)) => Some(r),
        (None, None) => None,
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub enum GroundContact {
    /// Ground correction is off or no calibration is active.
    #[default]
    Inactive,
    /// The root was moved using this displacement.
    Grounded { displacement: f32 },
    /// Neither foot found ground; the root was left alone.
    NotFound,
}

/// Keeps the rig's feet near the ground by moving the root vertically.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FootGroundStabilizer {
    /// Root position when the stabilizer was armed.
    pub initial_root_position: Vec3,
    pub layers: LayerMask,
    pub ground_offset: f32,
    pub probe_distance: f32,
    pub rate: f32,
}

impl FootGroundStabilizer {
    pub fn new(initial_root_position: Vec3) -> Self {
        Self {
            initial_root_position,
            layers: LayerMask::ALL,
            ground_offset: 0.1,
            probe_distance: 100.0,
            rate: 5.0,
        }
    }

    fn foot_displacement(
        &self,
        rig: &Rig,
        ground: &impl GroundProbe,
        foot: HumanBone,
        faults: &mut Vec<Fault>,
    ) -> Option<f32> {
        let Some(position) = rig.world_position(foot) else {
            faults.push(Fault::missing_bone(foot));
            return None;
        };
        let hit = ground.raycast_down(position, self.probe_distance, self.layers)?;
        Some(hit.y - position.y)
    }

    pub fn stabilize(
        &self,
        rig: &mut Rig,
        ground: &impl GroundProbe,
        dt: f32,
        faults: &mut Vec<Fault>,
    ) -> GroundContact {
        let left = self.foot_displacement(rig, ground, HumanBone::LeftFoot, faults);
        let right = self.foot_displacement(rig, ground, HumanBone::RightFoot, faults);

        let Some(displacement) = select_displacement(left, right) else {
            faults.push(Fault::GroundNotFound);
            return GroundContact::NotFound;
        };

        let target = self.initial_root_position + Vec3::Y * (displacement + self.ground_offset);
        rig.root.position = advance_position(rig.root.position, target, self.rate, dt);
        log::debug!("ground displacement {displacement:.4}, root y {:.4}", rig.root.position.y);
        GroundContact::Grounded { displacement }
    }
}
