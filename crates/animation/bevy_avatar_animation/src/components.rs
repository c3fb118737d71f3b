use avatar_animation_core::HumanoidBone;
use bevy::prelude::*;

/// Marker component designating the root of an avatar hierarchy. The model
/// root's translation follows the engine's root position (jumps), and the
/// indexing system walks its descendants for [`AvatarBone`]s.
#[derive(Component)]
pub struct AvatarRoot;

/// Binds an entity's `Transform` to one canonical humanoid bone.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvatarBone(pub HumanoidBone);
