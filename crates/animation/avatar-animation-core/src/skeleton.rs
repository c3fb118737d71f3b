//! Rig abstraction: canonical humanoid bones, the traits adapters implement,
//! and [`PoseBuffer`], the in-memory rig used by tests and the Bevy adapter.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use avatar_api_core::{EulerXyz, Vec3};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

macro_rules! humanoid_bones {
    ($($variant:ident => $name:literal),* $(,)?) => {
        /// Canonical humanoid bone names (VRM vocabulary).
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum HumanoidBone {
            $(#[serde(rename = $name)] $variant,)*
        }

        impl HumanoidBone {
            pub const ALL: &'static [HumanoidBone] = &[$(HumanoidBone::$variant,)*];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(HumanoidBone::$variant => $name,)*
                }
            }
        }

        impl FromStr for HumanoidBone {
            type Err = UnknownBone;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(HumanoidBone::$variant),)*
                    other => Err(UnknownBone(other.to_string())),
                }
            }
        }
    };
}

humanoid_bones! {
    Hips => "hips",
    Spine => "spine",
    Chest => "chest",
    UpperChest => "upperChest",
    Neck => "neck",
    Head => "head",
    LeftEye => "leftEye",
    RightEye => "rightEye",
    Jaw => "jaw",
    LeftShoulder => "leftShoulder",
    LeftUpperArm => "leftUpperArm",
    LeftLowerArm => "leftLowerArm",
    LeftHand => "leftHand",
    RightShoulder => "rightShoulder",
    RightUpperArm => "rightUpperArm",
    RightLowerArm => "rightLowerArm",
    RightHand => "rightHand",
    LeftUpperLeg => "leftUpperLeg",
    LeftLowerLeg => "leftLowerLeg",
    LeftFoot => "leftFoot",
    LeftToes => "leftToes",
    RightUpperLeg => "rightUpperLeg",
    RightLowerLeg => "rightLowerLeg",
    RightFoot => "rightFoot",
    RightToes => "rightToes",
    LeftThumbMetacarpal => "leftThumbMetacarpal",
    LeftThumbProximal => "leftThumbProximal",
    LeftThumbDistal => "leftThumbDistal",
    LeftIndexProximal => "leftIndexProximal",
    LeftIndexIntermediate => "leftIndexIntermediate",
    LeftIndexDistal => "leftIndexDistal",
    LeftMiddleProximal => "leftMiddleProximal",
    LeftMiddleIntermediate => "leftMiddleIntermediate",
    LeftMiddleDistal => "leftMiddleDistal",
    LeftRingProximal => "leftRingProximal",
    LeftRingIntermediate => "leftRingIntermediate",
    LeftRingDistal => "leftRingDistal",
    LeftLittleProximal => "leftLittleProximal",
    LeftLittleIntermediate => "leftLittleIntermediate",
    LeftLittleDistal => "leftLittleDistal",
    RightThumbMetacarpal => "rightThumbMetacarpal",
    RightThumbProximal => "rightThumbProximal",
    RightThumbDistal => "rightThumbDistal",
    RightIndexProximal => "rightIndexProximal",
    RightIndexIntermediate => "rightIndexIntermediate",
    RightIndexDistal => "rightIndexDistal",
    RightMiddleProximal => "rightMiddleProximal",
    RightMiddleIntermediate => "rightMiddleIntermediate",
    RightMiddleDistal => "rightMiddleDistal",
    RightRingProximal => "rightRingProximal",
    RightRingIntermediate => "rightRingIntermediate",
    RightRingDistal => "rightRingDistal",
    RightLittleProximal => "rightLittleProximal",
    RightLittleIntermediate => "rightLittleIntermediate",
    RightLittleDistal => "rightLittleDistal",
}

impl fmt::Display for HumanoidBone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownBone(pub String);

impl fmt::Display for UnknownBone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown humanoid bone '{}'", self.0)
    }
}

impl std::error::Error for UnknownBone {}

/// Which hand a gesture uses. Left-hand poses mirror the right-hand ones.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hand {
    Left,
    #[default]
    Right,
}

impl Hand {
    /// Mirror factor applied to lateral (y/z) rotations.
    pub fn sign(self) -> f32 {
        match self {
            Hand::Left => -1.0,
            Hand::Right => 1.0,
        }
    }

    pub fn shoulder(self) -> HumanoidBone {
        match self {
            Hand::Left => HumanoidBone::LeftShoulder,
            Hand::Right => HumanoidBone::RightShoulder,
        }
    }

    pub fn upper_arm(self) -> HumanoidBone {
        match self {
            Hand::Left => HumanoidBone::LeftUpperArm,
            Hand::Right => HumanoidBone::RightUpperArm,
        }
    }

    pub fn lower_arm(self) -> HumanoidBone {
        match self {
            Hand::Left => HumanoidBone::LeftLowerArm,
            Hand::Right => HumanoidBone::RightLowerArm,
        }
    }

    pub fn hand(self) -> HumanoidBone {
        match self {
            Hand::Left => HumanoidBone::LeftHand,
            Hand::Right => HumanoidBone::RightHand,
        }
    }

    /// Proximal joint of each finger, thumb first.
    pub fn finger_roots(self) -> [HumanoidBone; 5] {
        use HumanoidBone::*;
        match self {
            Hand::Left => [
                LeftThumbProximal,
                LeftIndexProximal,
                LeftMiddleProximal,
                LeftRingProximal,
                LeftLittleProximal,
            ],
            Hand::Right => [
                RightThumbProximal,
                RightIndexProximal,
                RightMiddleProximal,
                RightRingProximal,
                RightLittleProximal,
            ],
        }
    }
}

/// Local transform of one bone as written by animations.
/// Rotation is Euler XYZ in radians; rest pose is all zeros.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoneTransform {
    pub rotation: EulerXyz,
}

/// Bone access for animations.
///
/// Adapters map canonical bones onto whatever their scene graph uses. Bones the
/// rig lacks return `None`; animations skip them silently.
pub trait Skeleton {
    fn bone(&self, bone: HumanoidBone) -> Option<&BoneTransform>;
    fn bone_mut(&mut self, bone: HumanoidBone) -> Option<&mut BoneTransform>;

    /// Scene-graph node name backing `bone`, used to retarget clip tracks.
    fn node_name(&self, bone: HumanoidBone) -> Option<&str>;

    /// Position of the model root. Only locomotion (jump) moves it.
    fn root_position_mut(&mut self) -> &mut Vec3;

    /// World-space position of a bone, if the rig can compute one.
    fn bone_world_position(&self, _bone: HumanoidBone) -> Option<Vec3> {
        None
    }

    /// Return every present bone to rest before a frame is composed.
    fn reset_to_rest(&mut self) {
        for bone in HumanoidBone::ALL {
            if let Some(t) = self.bone_mut(*bone) {
                t.rotation = [0.0; 3];
            }
        }
    }
}

/// Named morph-target weights (`blink`, `happy`, `jawOpen`, ...).
pub trait ExpressionSink {
    fn set_expression(&mut self, name: &str, weight: f32);
    fn expression(&self, name: &str) -> Option<f32>;
}

/// Everything an animation may touch. Blanket-implemented.
pub trait Rig: Skeleton + ExpressionSink + Send + Sync {}

impl<T: Skeleton + ExpressionSink + Send + Sync> Rig for T {}

/// Apply `f` to `bone` if the rig has it.
#[inline]
pub fn with_bone(rig: &mut dyn Rig, bone: HumanoidBone, f: impl FnOnce(&mut BoneTransform)) {
    if let Some(t) = rig.bone_mut(bone) {
        f(t);
    }
}

/// Resolves canonical bones to scene node names when retargeting clips.
pub trait BoneResolver {
    fn resolve(&self, bone: HumanoidBone) -> Option<String>;
}

/// Owned snapshot of a skeleton's bone-to-node mapping. Detached from the rig
/// so it can travel into an async clip load.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeNameTable {
    names: HashMap<HumanoidBone, String>,
}

impl NodeNameTable {
    pub fn capture(skeleton: &dyn Skeleton) -> Self {
        let names = HumanoidBone::ALL
            .iter()
            .filter_map(|b| skeleton.node_name(*b).map(|n| (*b, n.to_string())))
            .collect();
        Self { names }
    }

    pub fn insert(&mut self, bone: HumanoidBone, node: impl Into<String>) {
        self.names.insert(bone, node.into());
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl BoneResolver for NodeNameTable {
    fn resolve(&self, bone: HumanoidBone) -> Option<String> {
        self.names.get(&bone).cloned()
    }
}

/// Plain in-memory rig.
///
/// Holds one [`BoneTransform`] per present bone, the node name each bone is
/// bound to, expression weights and the root position. Engine adapters copy
/// it onto their scene after every update.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PoseBuffer {
    bones: HashMap<HumanoidBone, BoneTransform>,
    node_names: HashMap<HumanoidBone, String>,
    rest_positions: HashMap<HumanoidBone, Vec3>,
    expressions: BTreeMap<String, f32>,
    root_position: Vec3,
}

impl PoseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rig with every canonical bone present, each bound to a node of the same name.
    pub fn humanoid() -> Self {
        let mut pose = Self::new();
        for bone in HumanoidBone::ALL {
            pose.add_bone(*bone, bone.as_str());
        }
        pose
    }

    pub fn add_bone(&mut self, bone: HumanoidBone, node_name: impl Into<String>) -> &mut Self {
        self.bones.insert(bone, BoneTransform::default());
        self.node_names.insert(bone, node_name.into());
        self
    }

    /// Record a bone's rest-pose world position (used as the gaze origin for `Head`).
    pub fn set_rest_position(&mut self, bone: HumanoidBone, position: Vec3) -> &mut Self {
        self.rest_positions.insert(bone, position);
        self
    }

    pub fn rotation(&self, bone: HumanoidBone) -> Option<EulerXyz> {
        self.bones.get(&bone).map(|t| t.rotation)
    }

    pub fn expressions(&self) -> &BTreeMap<String, f32> {
        &self.expressions
    }

    pub fn root_position(&self) -> Vec3 {
        self.root_position
    }

    pub fn bones(&self) -> impl Iterator<Item = (HumanoidBone, &BoneTransform)> {
        self.bones.iter().map(|(b, t)| (*b, t))
    }
}

impl Skeleton for PoseBuffer {
    fn bone(&self, bone: HumanoidBone) -> Option<&BoneTransform> {
        self.bones.get(&bone)
    }

    fn bone_mut(&mut self, bone: HumanoidBone) -> Option<&mut BoneTransform> {
        self.bones.get_mut(&bone)
    }

    fn node_name(&self, bone: HumanoidBone) -> Option<&str> {
        self.node_names.get(&bone).map(String::as_str)
    }

    fn root_position_mut(&mut self) -> &mut Vec3 {
        &mut self.root_position
    }

    fn bone_world_position(&self, bone: HumanoidBone) -> Option<Vec3> {
        self.rest_positions.get(&bone).copied()
    }

    fn reset_to_rest(&mut self) {
        for t in self.bones.values_mut() {
            t.rotation = [0.0; 3];
        }
    }
}

impl ExpressionSink for PoseBuffer {
    fn set_expression(&mut self, name: &str, weight: f32) {
        match self.expressions.get_mut(name) {
            Some(w) => *w = weight,
            None => {
                self.expressions.insert(name.to_string(), weight);
            }
        }
    }

    fn expression(&self, name: &str) -> Option<f32> {
        self.expressions.get(name).copied()
    }
}
