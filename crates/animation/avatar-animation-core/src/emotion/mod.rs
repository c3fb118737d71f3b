//! Emotion blend engine.
//!
//! Holds a rendered `current` state and a `target`. Each update moves a
//! progress value toward 1 by a fixed per-call `speed` and re-blends current
//! toward target; the result is written to the expression sink and layered
//! additively on top of whatever pose the scheduler produced this frame.

mod presets;

pub use presets::{blend_presets, BodyLanguage, Emotion, EmotionState, HeadBias, MicroMovement};

use log::debug;

use crate::skeleton::{with_bone, HumanoidBone, Rig};

const RESET_SPEED: f32 = 0.1;

#[derive(Clone, Debug)]
pub struct EmotionEngine {
    current: EmotionState,
    target: EmotionState,
    progress: f32,
    speed: f32,
    time: f32,
}

impl Default for EmotionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EmotionEngine {
    /// Starts settled at neutral.
    pub fn new() -> Self {
        let neutral = EmotionState::preset(Emotion::Neutral);
        Self {
            current: neutral.clone(),
            target: neutral,
            progress: 1.0,
            speed: 0.05,
            time: 0.0,
        }
    }

    /// Begin blending toward `emotion` at `intensity`. `speed` is the progress
    /// gained per update call.
    pub fn set_emotion(&mut self, emotion: Emotion, intensity: f32, speed: f32) {
        self.target = EmotionState::scaled(emotion, intensity);
        self.progress = 0.0;
        self.speed = if speed.is_finite() { speed.max(0.0) } else { 0.05 };
        debug!(
            "emotion: transitioning to {} (intensity {:.2}, speed {:.3})",
            emotion, self.target.intensity, self.speed
        );
    }

    /// Blend back to neutral.
    pub fn reset(&mut self) {
        self.set_emotion(Emotion::Neutral, 1.0, RESET_SPEED);
    }

    pub fn update(&mut self, dt: f32, rig: &mut dyn Rig) {
        self.time += dt;
        if self.progress < 1.0 {
            self.progress = (self.progress + self.speed).min(1.0);
            self.current = EmotionState::lerp(&self.current, &self.target, self.progress);
        }
        self.apply(rig);
    }

    fn apply(&self, rig: &mut dyn Rig) {
        let c = &self.current;
        for (name, weight) in &c.expressions {
            rig.set_expression(name, *weight);
        }

        let i = c.intensity;
        let (mut pitch, mut yaw, mut roll) = (
            c.head.pitch * i,
            c.head.yaw * i,
            (c.head.roll + c.body.head_tilt) * i,
        );
        if c.micro.enabled {
            let (f, a, t) = (c.micro.frequency, c.micro.amplitude, self.time);
            pitch += (t * f * 1.5).sin() * a * 0.3;
            yaw += (t * f * 2.0).sin() * a * 0.5;
            roll += (t * f).sin() * a * 0.2;
        }
        with_bone(rig, HumanoidBone::Head, |b| {
            b.rotation[0] += pitch;
            b.rotation[1] += yaw;
            b.rotation[2] += roll;
        });
        with_bone(rig, HumanoidBone::Neck, |b| b.rotation[0] += c.body.neck_angle * i);
        with_bone(rig, HumanoidBone::Spine, |b| b.rotation[0] += c.body.spine_slump * i);
        let raise = c.body.shoulder_raise * i;
        with_bone(rig, HumanoidBone::LeftShoulder, |b| b.rotation[2] -= raise);
        with_bone(rig, HumanoidBone::RightShoulder, |b| b.rotation[2] += raise);
    }

    pub fn current(&self) -> &EmotionState {
        &self.current
    }

    pub fn target(&self) -> &EmotionState {
        &self.target
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn is_transitioning(&self) -> bool {
        self.progress < 1.0
    }

    /// Gesture amplitude multiplier of the rendered emotion.
    pub fn gesture_modifier(&self) -> f32 {
        self.current.gesture_modifier
    }

    pub fn movement_speed(&self) -> f32 {
        self.current.movement_speed
    }
}
