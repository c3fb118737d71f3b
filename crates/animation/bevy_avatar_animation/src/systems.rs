use avatar_animation_core::Skeleton;
use avatar_api_core::euler_to_quat;
use bevy::prelude::*;

use crate::components::{AvatarBone, AvatarRoot};
use crate::resources::{AvatarCommand, AvatarEngine, AvatarExpressions, BoneIndex, FixedDt};

/// Walks descendants under each AvatarRoot and records every AvatarBone with
/// its rest rotation. Runs again whenever a bone is added; entities already
/// indexed keep the rest pose captured the first time.
pub fn build_bone_index_system(
    roots: Query<(Entity, &Transform), With<AvatarRoot>>,
    added: Query<(), Added<AvatarBone>>,
    children: Query<&Children>,
    bones: Query<(&AvatarBone, &Transform, Option<&Name>)>,
    mut index: ResMut<BoneIndex>,
    mut eng: ResMut<AvatarEngine>,
) {
    if added.is_empty() && index.root.is_some() {
        return;
    }

    fn walk(
        e: Entity,
        index: &mut BoneIndex,
        eng: &mut AvatarEngine,
        bones: &Query<(&AvatarBone, &Transform, Option<&Name>)>,
        children: &Query<&Children>,
    ) {
        if let Ok((AvatarBone(bone), tf, name)) = bones.get(e) {
            let rest = match index.bones.get(bone) {
                Some((known, rest)) if *known == e => *rest,
                _ => tf.rotation,
            };
            index.bones.insert(*bone, (e, rest));
            // Clip retargeting resolves tracks through scene node names.
            if let Some(name) = name {
                eng.0.rig_mut().add_bone(*bone, name.as_str());
            }
        }
        if let Ok(cs) = children.get(e) {
            for &c in cs.iter() {
                walk(c, index, eng, bones, children);
            }
        }
    }

    for (root, tf) in roots.iter() {
        if index.root.map(|(e, _)| e) != Some(root) {
            index.root = Some((root, tf.translation));
        }
        walk(root, &mut index, &mut eng, &bones, &children);
    }
    debug!("avatar: indexed {} bones", index.bones.len());
}

/// Hand queued planner commands to the engine.
pub fn handle_commands_system(mut events: EventReader<AvatarCommand>, mut eng: ResMut<AvatarEngine>) {
    for AvatarCommand(cmd) in events.read() {
        eng.0.execute_command(cmd);
    }
}

/// Fixed timestep compute: advance the engine by one tick.
pub fn tick_engine_system(mut eng: ResMut<AvatarEngine>, dt: Res<FixedDt>) {
    eng.0.update(dt.0);
}

/// Copy the composed pose onto the bound transforms and publish expression weights.
pub fn apply_pose_system(
    eng: Res<AvatarEngine>,
    index: Res<BoneIndex>,
    mut expressions: ResMut<AvatarExpressions>,
    mut transforms: Query<&mut Transform>,
) {
    let rig = eng.0.rig();
    for (bone, (entity, rest)) in index.bones.iter() {
        let Some(pose) = rig.bone(*bone) else {
            continue;
        };
        if let Ok(mut tf) = transforms.get_mut(*entity) {
            tf.rotation = *rest * Quat::from_array(euler_to_quat(pose.rotation));
        }
    }
    if let Some((root, rest)) = index.root {
        if let Ok(mut tf) = transforms.get_mut(root) {
            let [x, y, z] = rig.root_position();
            tf.translation = rest + Vec3::new(x, y, z);
        }
    }
    if expressions.0 != *rig.expressions() {
        expressions.0 = rig.expressions().clone();
    }
}
