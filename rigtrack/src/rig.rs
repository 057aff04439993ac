use glam::{Quat, Vec3};

/// Stable identifiers for the humanoid bones the engine can drive.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum HumanBone {
    Hips,
    Spine,
    Chest,
    Neck,
    Head,
    LeftUpperArm,
    LeftLowerArm,
    LeftHand,
    RightUpperArm,
    RightLowerArm,
    RightHand,
    LeftUpperLeg,
    LeftLowerLeg,
    LeftFoot,
    LeftToes,
    RightUpperLeg,
    RightLowerLeg,
    RightFoot,
    RightToes,
}

impl HumanBone {
    pub const COUNT: usize = 19;

    pub const ALL: [HumanBone; Self::COUNT] = [
        Self::Hips,
        Self::Spine,
        Self::Chest,
        Self::Neck,
        Self::Head,
        Self::LeftUpperArm,
        Self::LeftLowerArm,
        Self::LeftHand,
        Self::RightUpperArm,
        Self::RightLowerArm,
        Self::RightHand,
        Self::LeftUpperLeg,
        Self::LeftLowerLeg,
        Self::LeftFoot,
        Self::LeftToes,
        Self::RightUpperLeg,
        Self::RightLowerLeg,
        Self::RightFoot,
        Self::RightToes,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Hips => "hips",
            Self::Spine => "spine",
            Self::Chest => "chest",
            Self::Neck => "neck",
            Self::Head => "head",
            Self::LeftUpperArm => "left_upper_arm",
            Self::LeftLowerArm => "left_lower_arm",
            Self::LeftHand => "left_hand",
            Self::RightUpperArm => "right_upper_arm",
            Self::RightLowerArm => "right_lower_arm",
            Self::RightHand => "right_hand",
            Self::LeftUpperLeg => "left_upper_leg",
            Self::LeftLowerLeg => "left_lower_leg",
            Self::LeftFoot => "left_foot",
            Self::LeftToes => "left_toes",
            Self::RightUpperLeg => "right_upper_leg",
            Self::RightLowerLeg => "right_lower_leg",
            Self::RightFoot => "right_foot",
            Self::RightToes => "right_toes",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|bone| bone.name() == name)
    }
}

impl std::fmt::Display for HumanBone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RigBone {
    /// Orientation in rig space. This is the value the engine writes.
    pub rotation: Quat,
    /// Offset from the rig root, in the root's frame.
    ///
    /// The engine only writes rotations. Hosts that want the ground step to
    /// follow limb motion must write forward-kinematics positions back here
    /// before every tick.
    pub position: Vec3,
}

impl RigBone {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { rotation, position }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RootTransform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for RootTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

/// Arena of humanoid bones indexed by [`HumanBone`].
///
/// While a calibration is active the retargeter is the only writer of the
/// rotations of calibrated bones. Hosts that also run an animation system must
/// keep it paused while `animator_enabled` is false.
#[derive(Clone, Debug)]
pub struct Rig {
    bones: [Option<RigBone>; HumanBone::COUNT],
    pub root: RootTransform,
    pub animator_enabled: bool,
}

impl Default for Rig {
    fn default() -> Self {
        Self::new()
    }
}

impl Rig {
    pub fn new() -> Self {
        Self {
            bones: [None; HumanBone::COUNT],
            root: RootTransform::default(),
            animator_enabled: true,
        }
    }

    pub fn with_root(mut self, position: Vec3, rotation: Quat) -> Self {
        self.root = RootTransform { position, rotation };
        self
    }

    pub fn insert(&mut self, bone: HumanBone, data: RigBone) -> Option<RigBone> {
        self.bones[bone.index()].replace(data)
    }

    pub fn remove(&mut self, bone: HumanBone) -> Option<RigBone> {
        self.bones[bone.index()].take()
    }

    pub fn contains(&self, bone: HumanBone) -> bool {
        self.bones[bone.index()].is_some()
    }

    pub fn bone(&self, bone: HumanBone) -> Option<&RigBone> {
        self.bones[bone.index()].as_ref()
    }

    pub fn bone_mut(&mut self, bone: HumanBone) -> Option<&mut RigBone> {
        self.bones[bone.index()].as_mut()
    }

    pub fn rotation(&self, bone: HumanBone) -> Option<Quat> {
        self.bone(bone).map(|b| b.rotation)
    }

    /// Bone position in world space, from the stored `position` and the
    /// current root transform. Positions are whatever the host last wrote;
    /// rotations written by a tick do not move them.
    pub fn world_position(&self, bone: HumanBone) -> Option<Vec3> {
        self.bone(bone)
            .map(|b| self.root.position + self.root.rotation * b.position)
    }

    pub fn bones(&self) -> impl Iterator<Item = (HumanBone, &RigBone)> + '_ {
        HumanBone::ALL
            .iter()
            .filter_map(|&id| self.bone(id).map(|b| (id, b)))
    }
}
