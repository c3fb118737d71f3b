//! Closed-form gesture curves. Each returns a finite one-shot animation
//! (dance loops) whose pose is a pure function of normalized progress.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_3, FRAC_PI_4, FRAC_PI_6, PI};

use super::{ActionParams, DanceStyle};
use crate::animation::{AnimationLayer, ProceduralAnimation};
use crate::interp::easing::{in_cubic, in_out_cubic, out_back, out_cubic, out_elastic};
use crate::interp::{progress, there_and_back, Easing};
use crate::skeleton::{with_bone, Hand, HumanoidBone, Rig};

fn hand_suffix(hand: Hand) -> &'static str {
    match hand {
        Hand::Left => "left",
        Hand::Right => "right",
    }
}

/// Finite gesture on `layer` whose curve receives progress in `[0, 1]`.
fn gesture<F>(name: String, layer: AnimationLayer, priority: i32, secs: f32, mut curve: F) -> ProceduralAnimation
where
    F: FnMut(&mut dyn Rig, f32) + Send + Sync + 'static,
{
    ProceduralAnimation::from_fn(name, layer, priority, move |rig, elapsed, _dt| {
        curve(rig, progress(elapsed, secs))
    })
    .with_duration(secs)
}

pub fn wave(params: &ActionParams) -> ProceduralAnimation {
    let hand = params.hand;
    let s = hand.sign();
    let name = format!("wave_{}", hand_suffix(hand));
    gesture(name, AnimationLayer::Gesture, 20, params.secs_or(2.0), move |rig, p| {
        let raise = in_out_cubic((p * 2.0).min(1.0)) * FRAC_PI_2;
        with_bone(rig, hand.upper_arm(), |b| {
            b.rotation[0] = raise;
            b.rotation[2] = s * FRAC_PI_6;
        });
        with_bone(rig, hand.lower_arm(), |b| b.rotation[1] = -s * FRAC_PI_4);
        if p > 0.3 {
            let phase = (p - 0.3) / 0.7;
            let amount = (phase * PI * 6.0).sin() * 0.4;
            with_bone(rig, hand.hand(), |b| b.rotation[2] = s * amount);
        }
    })
}

pub fn point(params: &ActionParams) -> ProceduralAnimation {
    let hand = params.hand;
    let s = hand.sign();
    let name = format!("point_{}", hand_suffix(hand));
    gesture(name, AnimationLayer::Gesture, 20, params.secs_or(1.5), move |rig, p| {
        let eased = out_elastic(p);
        with_bone(rig, hand.upper_arm(), |b| {
            b.rotation[0] = eased * FRAC_PI_3;
            b.rotation[2] = s * eased * FRAC_PI_4;
        });
        with_bone(rig, hand.lower_arm(), |b| b.rotation[1] = 0.0);
        // Index stays extended; the other three fingers curl.
        for finger in &hand.finger_roots()[2..] {
            with_bone(rig, *finger, |b| b.rotation[2] = -FRAC_PI_4);
        }
    })
}

pub fn nod(params: &ActionParams) -> ProceduralAnimation {
    let intensity = params.intensity;
    gesture("nod".into(), AnimationLayer::Gesture, 15, params.secs_or(1.0), move |rig, p| {
        let amount = (p * PI * 4.0).sin() * 0.2 * intensity * (1.0 - p);
        with_bone(rig, HumanoidBone::Head, |b| b.rotation[0] = amount);
        with_bone(rig, HumanoidBone::Neck, |b| b.rotation[0] = amount * 0.5);
    })
}

pub fn shake_head(params: &ActionParams) -> ProceduralAnimation {
    gesture("shake_head".into(), AnimationLayer::Gesture, 15, params.secs_or(1.2), |rig, p| {
        let amount = (p * PI * 5.0).sin() * 0.3 * (1.0 - p);
        with_bone(rig, HumanoidBone::Head, |b| b.rotation[1] = amount);
        with_bone(rig, HumanoidBone::Neck, |b| b.rotation[1] = amount * 0.5);
    })
}

pub fn bow(params: &ActionParams) -> ProceduralAnimation {
    let depth = 0.5 * params.intensity;
    gesture("bow".into(), AnimationLayer::Gesture, 25, params.secs_or(2.0), move |rig, p| {
        let amount = there_and_back(p, Easing::InOutCubic) * depth * FRAC_PI_4;
        with_bone(rig, HumanoidBone::Spine, |b| b.rotation[0] = amount * 0.6);
        with_bone(rig, HumanoidBone::Chest, |b| b.rotation[0] = amount * 0.3);
        with_bone(rig, HumanoidBone::Neck, |b| b.rotation[0] = amount * 0.1);
    })
}

pub fn thumbs_up(params: &ActionParams) -> ProceduralAnimation {
    let hand = params.hand;
    let s = hand.sign();
    let name = format!("thumbs_up_{}", hand_suffix(hand));
    gesture(name, AnimationLayer::Gesture, 20, params.secs_or(1.5), move |rig, p| {
        let eased = out_back(p);
        with_bone(rig, hand.upper_arm(), |b| {
            b.rotation[0] = eased * FRAC_PI_4;
            b.rotation[2] = s * eased * FRAC_PI_6;
        });
        with_bone(rig, hand.lower_arm(), |b| b.rotation[1] = -s * eased * FRAC_PI_3);
    })
}

pub fn dance(params: &ActionParams) -> ProceduralAnimation {
    let (name, default_secs) = match params.dance {
        DanceStyle::Groove => ("dance_groove", 6.0),
        DanceStyle::Energetic => ("dance_energetic", 4.0),
    };
    let secs = params.secs_or(default_secs);
    gesture(name.into(), AnimationLayer::Locomotion, 30, secs, |rig, p| {
        let phase = p * PI * 2.0;
        with_bone(rig, HumanoidBone::Hips, |b| {
            b.rotation[1] = phase.sin() * 0.15;
            b.rotation[2] = (phase * 2.0).sin() * 0.1;
        });
        with_bone(rig, HumanoidBone::Spine, |b| {
            b.rotation[1] = (phase + FRAC_PI_4).sin() * 0.1;
            b.rotation[2] = (phase * 1.5).sin() * 0.08;
        });
        with_bone(rig, HumanoidBone::Chest, |b| b.rotation[1] = (phase + FRAC_PI_2).sin() * 0.12);
        with_bone(rig, HumanoidBone::LeftUpperArm, |b| {
            b.rotation[2] = -FRAC_PI_4 + phase.sin() * 0.5;
            b.rotation[0] = (phase * 2.0).sin() * 0.3;
        });
        with_bone(rig, HumanoidBone::RightUpperArm, |b| {
            b.rotation[2] = FRAC_PI_4 + (phase + PI).sin() * 0.5;
            b.rotation[0] = (phase * 2.0 + PI).sin() * 0.3;
        });
    })
    .looping(true)
}

/// Crouch, parabolic hop of the model root, land. Root height returns to 0 on end.
pub fn jump(params: &ActionParams) -> ProceduralAnimation {
    use HumanoidBone::*;
    gesture("jump".into(), AnimationLayer::Locomotion, 35, params.secs_or(1.2), |rig, p| {
        rig.root_position_mut()[1] = (p * PI).sin() * 0.5;
        let (upper, lower) = if p < 0.3 {
            let squat = (0.3 - p) / 0.3;
            (squat * FRAC_PI_4, -squat * FRAC_PI_3)
        } else if p > 0.7 {
            let land = (p - 0.7) / 0.3;
            (land * FRAC_PI_6, -land * FRAC_PI_4)
        } else {
            return;
        };
        for leg in [LeftUpperLeg, RightUpperLeg] {
            with_bone(rig, leg, |b| b.rotation[0] = upper);
        }
        for leg in [LeftLowerLeg, RightLowerLeg] {
            with_bone(rig, leg, |b| b.rotation[0] = lower);
        }
    })
    .on_end(|rig| rig.root_position_mut()[1] = 0.0)
}

pub fn celebrate(params: &ActionParams) -> ProceduralAnimation {
    gesture("celebrate".into(), AnimationLayer::Gesture, 30, params.secs_or(2.5), |rig, p| {
        let raise = out_back((p * 2.0).min(1.0));
        let pump = (p * PI * 8.0).sin();
        with_bone(rig, HumanoidBone::LeftUpperArm, |b| {
            b.rotation = [raise * FRAC_PI_2, pump * 0.2, -raise * FRAC_PI_4];
        });
        with_bone(rig, HumanoidBone::RightUpperArm, |b| {
            b.rotation = [raise * FRAC_PI_2, -pump * 0.2, raise * FRAC_PI_4];
        });
        with_bone(rig, HumanoidBone::Spine, |b| b.rotation[2] = pump * 0.1);
    })
}

/// Chin-on-hand pondering with the right arm.
pub fn think(params: &ActionParams) -> ProceduralAnimation {
    gesture("think".into(), AnimationLayer::Gesture, 18, params.secs_or(3.0), |rig, p| {
        let raise = in_out_cubic((p * 2.0).min(1.0));
        let phase = p * PI * 2.0;
        with_bone(rig, HumanoidBone::Head, |b| {
            b.rotation[0] = -0.1 + phase.sin() * 0.05;
            b.rotation[1] = 0.2 + (phase * 0.5).sin() * 0.1;
        });
        with_bone(rig, HumanoidBone::RightUpperArm, |b| {
            b.rotation[0] = raise * FRAC_PI_3;
            b.rotation[2] = raise * FRAC_PI_6;
        });
        with_bone(rig, HumanoidBone::RightLowerArm, |b| b.rotation[1] = -raise * PI / 2.5);
        with_bone(rig, HumanoidBone::RightHand, |b| b.rotation[0] = raise * 0.3);
    })
}

pub fn shrug(params: &ActionParams) -> ProceduralAnimation {
    gesture("shrug".into(), AnimationLayer::Gesture, 20, params.secs_or(1.5), |rig, p| {
        let curve = if p < 0.5 {
            out_cubic(p * 2.0)
        } else {
            in_cubic(2.0 - p * 2.0)
        };
        with_bone(rig, HumanoidBone::LeftShoulder, |b| b.rotation[2] = -curve * 0.3);
        with_bone(rig, HumanoidBone::RightShoulder, |b| b.rotation[2] = curve * 0.3);
        with_bone(rig, HumanoidBone::LeftUpperArm, |b| b.rotation[2] = -curve * 0.4);
        with_bone(rig, HumanoidBone::RightUpperArm, |b| b.rotation[2] = curve * 0.4);
        with_bone(rig, HumanoidBone::Head, |b| b.rotation[0] = curve * 0.1);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::PoseBuffer;

    fn pose_at(anim: &mut ProceduralAnimation, elapsed: f32) -> PoseBuffer {
        let mut pose = PoseBuffer::humanoid();
        anim.update(&mut pose, elapsed, 1.0 / 60.0);
        pose
    }

    #[test]
    fn left_wave_mirrors_right() {
        let mut right = wave(&ActionParams::default());
        let mut left = wave(&ActionParams {
            hand: Hand::Left,
            ..ActionParams::default()
        });
        let r = pose_at(&mut right, 1.2);
        let l = pose_at(&mut left, 1.2);
        let ra = r.rotation(HumanoidBone::RightUpperArm).unwrap();
        let la = l.rotation(HumanoidBone::LeftUpperArm).unwrap();
        assert_eq!(ra[0], la[0]);
        assert_eq!(ra[2], -la[2]);
        assert_eq!(left.name(), "wave_left");
    }

    #[test]
    fn nod_settles_to_rest() {
        let mut anim = nod(&ActionParams::default());
        let pose = pose_at(&mut anim, 1.0);
        assert!(pose.rotation(HumanoidBone::Head).unwrap()[0].abs() < 1e-6);
    }

    #[test]
    fn jump_arcs_root_and_restores_on_end() {
        let mut anim = jump(&ActionParams::default());
        let mut pose = PoseBuffer::humanoid();
        anim.update(&mut pose, 0.6, 1.0 / 60.0);
        assert!((pose.root_position()[1] - 0.5).abs() < 1e-4);
        anim.end(&mut pose);
        assert_eq!(pose.root_position()[1], 0.0);
    }

    #[test]
    fn duration_override_rescales_curve() {
        let params = ActionParams {
            duration: Some(4.0),
            ..ActionParams::default()
        };
        let mut slow = bow(&params);
        assert_eq!(slow.duration(), 4.0);
        let pose = pose_at(&mut slow, 2.0);
        let peak = 0.5 * FRAC_PI_4 * 0.6;
        assert!((pose.rotation(HumanoidBone::Spine).unwrap()[0] - peak).abs() < 1e-5);
    }

    #[test]
    fn dance_loops_on_locomotion() {
        let anim = dance(&ActionParams {
            dance: DanceStyle::Energetic,
            ..ActionParams::default()
        });
        assert!(anim.is_looping());
        assert_eq!(anim.duration(), 4.0);
        assert_eq!(anim.layer(), AnimationLayer::Locomotion);
    }
}
