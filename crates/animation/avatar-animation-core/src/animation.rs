//! Procedural animation descriptors and the layers they occupy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::skeleton::Rig;

/// Exclusive scheduling slot. Each layer holds at most one animation; layers
/// are composed in [`AnimationLayer::ALL`] order every frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationLayer {
    Base,
    Gesture,
    Emotion,
    Locomotion,
    Override,
}

impl AnimationLayer {
    pub const ALL: [AnimationLayer; 5] = [
        AnimationLayer::Base,
        AnimationLayer::Gesture,
        AnimationLayer::Emotion,
        AnimationLayer::Locomotion,
        AnimationLayer::Override,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AnimationLayer::Base => "base",
            AnimationLayer::Gesture => "gesture",
            AnimationLayer::Emotion => "emotion",
            AnimationLayer::Locomotion => "locomotion",
            AnimationLayer::Override => "override",
        }
    }
}

impl fmt::Display for AnimationLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnimationLayer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnimationLayer::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown layer '{s}'"))
    }
}

/// Per-frame pose writer.
///
/// `update` receives seconds since the animation (or its current loop) started
/// and the frame delta. It should write absolute values for the bones it owns.
pub trait Motion: Send + Sync {
    fn update(&mut self, rig: &mut dyn Rig, elapsed: f32, dt: f32);

    /// Called on admission and again at every loop restart.
    fn on_start(&mut self, _rig: &mut dyn Rig) {}

    /// Called once when the animation leaves its layer for any reason.
    fn on_end(&mut self, _rig: &mut dyn Rig) {}
}

/// Adapter turning a closure into a [`Motion`].
pub struct FnMotion<F>(pub F);

impl<F> Motion for FnMotion<F>
where
    F: FnMut(&mut dyn Rig, f32, f32) + Send + Sync,
{
    fn update(&mut self, rig: &mut dyn Rig, elapsed: f32, dt: f32) {
        (self.0)(rig, elapsed, dt)
    }
}

type Hook = Box<dyn FnMut(&mut dyn Rig) + Send + Sync>;

/// A named, prioritized motion bound to one layer.
///
/// Built once, then handed to the scheduler; its metadata never changes
/// after construction.
pub struct ProceduralAnimation {
    name: String,
    layer: AnimationLayer,
    priority: i32,
    looping: bool,
    duration: f32,
    motion: Box<dyn Motion>,
    start_hook: Option<Hook>,
    end_hook: Option<Hook>,
}

impl ProceduralAnimation {
    /// Infinite, non-looping animation driven by `motion`.
    pub fn new(
        name: impl Into<String>,
        layer: AnimationLayer,
        priority: i32,
        motion: impl Motion + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            layer,
            priority,
            looping: false,
            duration: f32::INFINITY,
            motion: Box::new(motion),
            start_hook: None,
            end_hook: None,
        }
    }

    pub fn from_fn<F>(name: impl Into<String>, layer: AnimationLayer, priority: i32, f: F) -> Self
    where
        F: FnMut(&mut dyn Rig, f32, f32) + Send + Sync + 'static,
    {
        Self::new(name, layer, priority, FnMotion(f))
    }

    /// Finite duration in seconds. Non-finite or negative values mean "runs forever".
    pub fn with_duration(mut self, secs: f32) -> Self {
        self.duration = if secs.is_finite() && secs >= 0.0 {
            secs
        } else {
            f32::INFINITY
        };
        self
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn on_start(mut self, f: impl FnMut(&mut dyn Rig) + Send + Sync + 'static) -> Self {
        self.start_hook = Some(Box::new(f));
        self
    }

    pub fn on_end(mut self, f: impl FnMut(&mut dyn Rig) + Send + Sync + 'static) -> Self {
        self.end_hook = Some(Box::new(f));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layer(&self) -> AnimationLayer {
        self.layer
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn is_finite(&self) -> bool {
        self.duration.is_finite()
    }

    pub(crate) fn start(&mut self, rig: &mut dyn Rig) {
        self.motion.on_start(rig);
        if let Some(hook) = self.start_hook.as_mut() {
            hook(rig);
        }
    }

    pub(crate) fn update(&mut self, rig: &mut dyn Rig, elapsed: f32, dt: f32) {
        self.motion.update(rig, elapsed, dt);
    }

    pub(crate) fn end(&mut self, rig: &mut dyn Rig) {
        self.motion.on_end(rig);
        if let Some(hook) = self.end_hook.as_mut() {
            hook(rig);
        }
    }
}

impl fmt::Debug for ProceduralAnimation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProceduralAnimation")
            .field("name", &self.name)
            .field("layer", &self.layer)
            .field("priority", &self.priority)
            .field("looping", &self.looping)
            .field("duration", &self.duration)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_durations_become_infinite() {
        let a = ProceduralAnimation::from_fn("x", AnimationLayer::Base, 0, |_, _, _| {})
            .with_duration(-1.0);
        assert!(!a.is_finite());
        let b = ProceduralAnimation::from_fn("x", AnimationLayer::Base, 0, |_, _, _| {})
            .with_duration(f32::NAN);
        assert!(!b.is_finite());
    }

    #[test]
    fn layer_names_parse_case_insensitively() {
        assert_eq!("Gesture".parse::<AnimationLayer>(), Ok(AnimationLayer::Gesture));
        assert!("face".parse::<AnimationLayer>().is_err());
        assert_eq!(AnimationLayer::Override.index(), 4);
    }
}
