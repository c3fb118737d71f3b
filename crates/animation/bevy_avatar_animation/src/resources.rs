use std::collections::{BTreeMap, HashMap};

use avatar_animation_core::{AnimationCommand, AnimationEngine, HumanoidBone, PoseBuffer};
use bevy::prelude::*;

/// The engine driving every avatar in the world.
#[derive(Resource)]
pub struct AvatarEngine(pub AnimationEngine<PoseBuffer>);

/// Bound bone entities with the rest rotation captured when they were first
/// seen. Engine rotations are applied on top of the rest pose.
#[derive(Resource, Default)]
pub struct BoneIndex {
    pub bones: HashMap<HumanoidBone, (Entity, Quat)>,
    /// Avatar root and its rest translation.
    pub root: Option<(Entity, Vec3)>,
}

/// Expression weights of the last tick, for morph-target systems to consume.
#[derive(Resource, Default, Debug, Clone, PartialEq)]
pub struct AvatarExpressions(pub BTreeMap<String, f32>);

/// Planner command delivered through Bevy's event queue.
#[derive(Event, Debug, Clone)]
pub struct AvatarCommand(pub AnimationCommand);

/// Fixed timestep configuration (seconds per tick).
#[derive(Resource)]
pub struct FixedDt(pub f32);

impl Default for FixedDt {
    fn default() -> Self {
        Self(1.0 / 60.0)
    }
}
