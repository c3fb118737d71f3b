use crate::animation::{AnimationLayer, ProceduralAnimation};
use crate::interp::oscillate;
use crate::skeleton::{with_bone, HumanoidBone, Rig};

const BREATH_HZ: f32 = 0.3;
const SWAY_HZ: f32 = 0.15;
const BOB_HZ: f32 = 0.2;

/// Chest rise: spine pitch with half as much on the chest.
pub fn breathing(rig: &mut dyn Rig, t: f32) {
    let amount = oscillate(t, BREATH_HZ, 0.02);
    with_bone(rig, HumanoidBone::Spine, |b| b.rotation[0] = amount);
    with_bone(rig, HumanoidBone::Chest, |b| b.rotation[0] = amount * 0.5);
}

/// Slow lateral hip roll.
pub fn sway(rig: &mut dyn Rig, t: f32) {
    let amount = oscillate(t, SWAY_HZ, 0.01);
    with_bone(rig, HumanoidBone::Hips, |b| b.rotation[2] = amount);
}

/// Neck nod plus a half-rate head turn.
pub fn head_bob(rig: &mut dyn Rig, t: f32) {
    let nod = oscillate(t, BOB_HZ, 0.015);
    let turn = oscillate(t, BOB_HZ * 0.5, 0.02);
    with_bone(rig, HumanoidBone::Neck, |b| b.rotation[0] = nod);
    with_bone(rig, HumanoidBone::Head, |b| b.rotation[1] = turn);
}

fn noise(t: f32, seed: f32) -> f32 {
    (t * seed).sin() * 0.5 + (t * seed * 1.3).sin() * 0.3 + (t * seed * 0.7).sin() * 0.2
}

/// Sum-of-sines jitter on shoulders and hands.
pub fn micro_movements(rig: &mut dyn Rig, t: f32) {
    with_bone(rig, HumanoidBone::LeftShoulder, |b| b.rotation[2] = noise(t, 0.4) * 0.01);
    with_bone(rig, HumanoidBone::RightShoulder, |b| b.rotation[2] = noise(t, 0.5) * 0.01);
    with_bone(rig, HumanoidBone::LeftHand, |b| b.rotation[0] = noise(t, 0.6) * 0.02);
    with_bone(rig, HumanoidBone::RightHand, |b| b.rotation[0] = noise(t, 0.7) * 0.02);
}

/// Which sub-motions the composite idle runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdleParts {
    pub breathing: bool,
    pub sway: bool,
    pub head_bob: bool,
    pub micro: bool,
}

impl Default for IdleParts {
    fn default() -> Self {
        Self {
            breathing: true,
            sway: true,
            head_bob: true,
            micro: true,
        }
    }
}

/// Composite base-layer idle. The base layer is exclusive, so breathing, sway,
/// head bob and micro-movements run inside one animation rather than evicting
/// one another.
pub fn idle(parts: IdleParts) -> ProceduralAnimation {
    ProceduralAnimation::from_fn("idle", AnimationLayer::Base, 1, move |rig, t, _dt| {
        if parts.breathing {
            breathing(rig, t);
        }
        if parts.sway {
            sway(rig, t);
        }
        if parts.head_bob {
            head_bob(rig, t);
        }
        if parts.micro {
            micro_movements(rig, t);
        }
    })
}

pub fn idle_breathing() -> ProceduralAnimation {
    ProceduralAnimation::from_fn("idle_breathing", AnimationLayer::Base, 1, |rig, t, _| {
        breathing(rig, t)
    })
}

pub fn idle_sway() -> ProceduralAnimation {
    ProceduralAnimation::from_fn("idle_sway", AnimationLayer::Base, 2, |rig, t, _| sway(rig, t))
}

pub fn idle_head_bob() -> ProceduralAnimation {
    ProceduralAnimation::from_fn("head_bob", AnimationLayer::Base, 3, |rig, t, _| {
        head_bob(rig, t)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::PoseBuffer;

    #[test]
    fn idle_amplitudes_stay_subtle() {
        let mut pose = PoseBuffer::humanoid();
        let mut anim = idle(IdleParts::default());
        let mut t = 0.0;
        while t < 10.0 {
            anim.update(&mut pose, t, 0.1);
            for (_, b) in pose.bones() {
                for v in b.rotation {
                    assert!(v.abs() <= 0.03, "amplitude {v} at t={t}");
                }
            }
            t += 0.1;
        }
    }

    #[test]
    fn parts_can_be_disabled() {
        let mut pose = PoseBuffer::humanoid();
        let mut anim = idle(IdleParts {
            breathing: false,
            ..IdleParts::default()
        });
        anim.update(&mut pose, 0.8, 0.016);
        assert_eq!(pose.rotation(HumanoidBone::Spine), Some([0.0; 3]));
        assert_ne!(pose.rotation(HumanoidBone::Hips), Some([0.0; 3]));
    }
}
