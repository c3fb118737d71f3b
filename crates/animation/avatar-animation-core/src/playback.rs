//! Plays a retargeted keyframe clip through the scheduler.

use std::sync::Arc;

use avatar_api_core::quat_to_euler;

use crate::animation::{AnimationLayer, Motion, ProceduralAnimation};
use crate::clip::{AnimationClip, TrackKind};
use crate::skeleton::{HumanoidBone, Rig};

/// Rotation tracks bound to rig bones by node name at start.
pub struct ClipMotion {
    clip: Arc<AnimationClip>,
    bindings: Vec<(usize, HumanoidBone)>,
}

impl ClipMotion {
    pub fn new(clip: Arc<AnimationClip>) -> Self {
        Self {
            clip,
            bindings: Vec::new(),
        }
    }

    fn bind(&mut self, rig: &dyn Rig) {
        self.bindings.clear();
        for (i, track) in self.clip.tracks.iter().enumerate() {
            let (node, property) = track.target();
            if track.kind != TrackKind::Quaternion || property != "quaternion" {
                continue;
            }
            if let Some(bone) = HumanoidBone::ALL
                .iter()
                .copied()
                .find(|b| rig.node_name(*b) == Some(node))
            {
                self.bindings.push((i, bone));
            }
        }
    }

    pub fn bound_tracks(&self) -> usize {
        self.bindings.len()
    }
}

impl Motion for ClipMotion {
    fn update(&mut self, rig: &mut dyn Rig, elapsed: f32, _dt: f32) {
        let t = elapsed.min(self.clip.duration);
        for (i, bone) in &self.bindings {
            let q = self.clip.tracks[*i].sample(t);
            if let (Some(b), [x, y, z, w]) = (rig.bone_mut(*bone), q.as_slice()) {
                b.rotation = quat_to_euler([*x, *y, *z, *w]);
            }
        }
    }

    fn on_start(&mut self, rig: &mut dyn Rig) {
        self.bind(rig);
    }
}

/// One-shot (or looping) playback of `clip` on `layer`.
pub fn clip_animation(
    clip: Arc<AnimationClip>,
    layer: AnimationLayer,
    priority: i32,
    looping: bool,
) -> ProceduralAnimation {
    let name = format!("clip_{}", clip.name);
    let duration = clip.duration;
    ProceduralAnimation::new(name, layer, priority, ClipMotion::new(clip))
        .with_duration(duration)
        .looping(looping)
}
