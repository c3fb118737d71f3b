//! Bevy adapter for the avatar animation core.
//!
//! Tag the model root with [`AvatarRoot`] and each bone entity with
//! [`AvatarBone`]; the plugin ticks the engine on `FixedUpdate` and writes
//! bone rotations, the root offset and expression weights back every tick.

mod components;
mod resources;
mod systems;

pub use components::{AvatarBone, AvatarRoot};
pub use resources::{AvatarCommand, AvatarEngine, AvatarExpressions, BoneIndex, FixedDt};
pub use systems::{
    apply_pose_system, build_bone_index_system, handle_commands_system, tick_engine_system,
};

use avatar_animation_core::{AnimationEngine, EngineConfig, PoseBuffer};
use bevy::prelude::*;

#[derive(Default)]
pub struct AvatarAnimationPlugin {
    pub config: EngineConfig,
}

impl Plugin for AvatarAnimationPlugin {
    fn build(&self, app: &mut App) {
        let engine = AnimationEngine::new(PoseBuffer::humanoid(), self.config.clone());
        app.insert_resource(AvatarEngine(engine))
            .init_resource::<BoneIndex>()
            .init_resource::<AvatarExpressions>()
            .init_resource::<FixedDt>()
            .add_event::<AvatarCommand>()
            .add_systems(Update, (build_bone_index_system, handle_commands_system).chain())
            .add_systems(FixedUpdate, (tick_engine_system, apply_pose_system).chain());
    }
}
