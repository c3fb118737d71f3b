use avatar_api_core::lerp_f;

use crate::animation::{AnimationLayer, Motion, ProceduralAnimation};
use crate::skeleton::{with_bone, Hand, Rig};

const CLOSED: f32 = -std::f32::consts::FRAC_PI_3;

/// Curls the five finger roots toward a target openness.
pub struct HandPoseMotion {
    hand: Hand,
    target: f32,
    current: f32,
}

impl HandPoseMotion {
    /// `openness` 1.0 is a flat hand, 0.0 a fist.
    pub fn new(hand: Hand, openness: f32) -> Self {
        Self {
            hand,
            target: CLOSED * (1.0 - openness.clamp(0.0, 1.0)),
            current: 0.0,
        }
    }
}

impl Motion for HandPoseMotion {
    fn update(&mut self, rig: &mut dyn Rig, _elapsed: f32, dt: f32) {
        self.current = lerp_f(self.current, self.target, (dt * 10.0).min(1.0));
        let curl = self.current;
        for finger in self.hand.finger_roots() {
            with_bone(rig, finger, |b| b.rotation[2] = curl);
        }
    }

    fn on_start(&mut self, _rig: &mut dyn Rig) {
        self.current = 0.0;
    }
}

pub fn hand_pose(hand: Hand, openness: f32) -> ProceduralAnimation {
    let name = match hand {
        Hand::Left => "hand_pose_left",
        Hand::Right => "hand_pose_right",
    };
    ProceduralAnimation::new(name, AnimationLayer::Gesture, 8, HandPoseMotion::new(hand, openness))
        .with_duration(0.5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::{HumanoidBone, PoseBuffer};

    #[test]
    fn fist_curls_toward_closed() {
        let mut pose = PoseBuffer::humanoid();
        let mut anim = hand_pose(Hand::Left, 0.0);
        anim.start(&mut pose);
        for i in 0..30 {
            anim.update(&mut pose, i as f32 / 60.0, 1.0 / 60.0);
        }
        let z = pose.rotation(HumanoidBone::LeftIndexProximal).unwrap()[2];
        assert!(z < CLOSED * 0.9 && z >= CLOSED, "curl {z}");
        assert_eq!(pose.rotation(HumanoidBone::RightIndexProximal), Some([0.0; 3]));
    }
}
