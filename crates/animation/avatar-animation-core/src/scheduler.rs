//! Layered, priority-arbitrated scheduler.
//!
//! Each [`AnimationLayer`] holds at most one [`ProceduralAnimation`]. Admission
//! into an occupied layer either replaces the occupant (forced, or strictly
//! higher priority) or is rejected. Every frame the rig is returned to rest and
//! the active animations write their pose in layer order; the last writer of a
//! bone wins.

use log::{debug, trace};
use serde::Serialize;

use crate::animation::{AnimationLayer, ProceduralAnimation};
use crate::skeleton::Rig;

/// Outcome of [`Scheduler::add_animation`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Admission {
    /// The layer was empty.
    Started,
    /// The named occupant was ended and replaced.
    Replaced { evicted: String },
    /// The occupant kept its slot; the candidate was dropped without being started.
    Rejected { occupant: String },
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        !matches!(self, Admission::Rejected { .. })
    }
}

struct LayerSlot {
    animation: ProceduralAnimation,
    /// Scheduler clock at admission or at the most recent loop restart.
    start_time: f64,
}

#[derive(Default)]
pub struct Scheduler {
    slots: [Option<LayerSlot>; 5],
    /// Seconds since construction (or the last reset). Kept in f64 so long
    /// sessions do not lose sub-frame precision.
    clock: f64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Admit `animation` into its layer.
    ///
    /// An occupied layer is taken over when `replace` is set or the candidate
    /// has strictly higher priority; the occupant's end hook runs first.
    pub fn add_animation(
        &mut self,
        mut animation: ProceduralAnimation,
        replace: bool,
        rig: &mut dyn Rig,
    ) -> Admission {
        let layer = animation.layer();
        let slot = &mut self.slots[layer.index()];

        let admission = match slot.take() {
            None => Admission::Started,
            Some(current) if !replace && animation.priority() <= current.animation.priority() => {
                debug!(
                    "scheduler: rejected '{}' (priority {}) on {} layer held by '{}' (priority {})",
                    animation.name(),
                    animation.priority(),
                    layer,
                    current.animation.name(),
                    current.animation.priority()
                );
                let occupant = current.animation.name().to_string();
                *slot = Some(current);
                return Admission::Rejected { occupant };
            }
            Some(mut current) => {
                current.animation.end(rig);
                debug!(
                    "scheduler: '{}' replaces '{}' on {} layer",
                    animation.name(),
                    current.animation.name(),
                    layer
                );
                Admission::Replaced {
                    evicted: current.animation.name().to_string(),
                }
            }
        };

        animation.start(rig);
        trace!("scheduler: started '{}' on {} layer", animation.name(), layer);
        *slot = Some(LayerSlot {
            animation,
            start_time: self.clock,
        });
        admission
    }

    /// End and clear whatever occupies `layer`. Returns the evicted name.
    pub fn remove_animation(&mut self, layer: AnimationLayer, rig: &mut dyn Rig) -> Option<String> {
        let mut slot = self.slots[layer.index()].take()?;
        slot.animation.end(rig);
        trace!("scheduler: removed '{}' from {} layer", slot.animation.name(), layer);
        Some(slot.animation.name().to_string())
    }

    /// Remove the animation called `name` from whichever layer holds it.
    pub fn remove_animation_by_name(&mut self, name: &str, rig: &mut dyn Rig) -> bool {
        match self.layer_of(name) {
            Some(layer) => self.remove_animation(layer, rig).is_some(),
            None => false,
        }
    }

    pub fn clear_layer(&mut self, layer: AnimationLayer, rig: &mut dyn Rig) {
        self.remove_animation(layer, rig);
    }

    /// Remove everything except the base layer.
    pub fn clear_all_except_base(&mut self, rig: &mut dyn Rig) {
        for layer in AnimationLayer::ALL {
            if layer != AnimationLayer::Base {
                self.remove_animation(layer, rig);
            }
        }
    }

    /// Advance the clock and compose one frame onto `rig`.
    ///
    /// Finite non-looping animations whose elapsed time reaches their duration
    /// are removed without a final update. Looping ones restart at elapsed 0.
    pub fn update(&mut self, dt: f32, rig: &mut dyn Rig) {
        self.clock += f64::from(dt.max(0.0));
        let clock = self.clock;
        rig.reset_to_rest();

        let mut finished: Vec<AnimationLayer> = Vec::new();
        for layer in AnimationLayer::ALL {
            let Some(slot) = self.slots[layer.index()].as_mut() else {
                continue;
            };
            let mut elapsed = (clock - slot.start_time) as f32;
            let animation = &mut slot.animation;
            if animation.is_finite() && elapsed >= animation.duration() {
                if animation.is_looping() {
                    slot.start_time = clock;
                    elapsed = 0.0;
                    animation.start(rig);
                } else {
                    finished.push(layer);
                    continue;
                }
            }
            animation.update(rig, elapsed, dt);
        }

        for layer in finished {
            self.remove_animation(layer, rig);
        }
    }

    /// End every animation and restart the clock at zero.
    pub fn reset(&mut self, rig: &mut dyn Rig) {
        for layer in AnimationLayer::ALL {
            self.remove_animation(layer, rig);
        }
        self.clock = 0.0;
    }

    pub fn is_animation_active(&self, name: &str) -> bool {
        self.layer_of(name).is_some()
    }

    /// Names of active animations, in layer order.
    pub fn active_animation_names(&self) -> Vec<String> {
        self.slots
            .iter()
            .flatten()
            .map(|s| s.animation.name().to_string())
            .collect()
    }

    pub fn active_on(&self, layer: AnimationLayer) -> Option<&ProceduralAnimation> {
        self.slots[layer.index()].as_ref().map(|s| &s.animation)
    }

    pub fn is_layer_empty(&self, layer: AnimationLayer) -> bool {
        self.slots[layer.index()].is_none()
    }

    /// Seconds the animation on `layer` has been running in its current loop.
    pub fn elapsed_on(&self, layer: AnimationLayer) -> Option<f32> {
        self.slots[layer.index()]
            .as_ref()
            .map(|s| (self.clock - s.start_time) as f32)
    }

    fn layer_of(&self, name: &str) -> Option<AnimationLayer> {
        AnimationLayer::ALL.into_iter().find(|l| {
            self.slots[l.index()]
                .as_ref()
                .is_some_and(|s| s.animation.name() == name)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::{HumanoidBone, PoseBuffer, Skeleton};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting(
        name: &str,
        layer: AnimationLayer,
        priority: i32,
        starts: &Arc<AtomicUsize>,
        ends: &Arc<AtomicUsize>,
    ) -> ProceduralAnimation {
        let s = Arc::clone(starts);
        let e = Arc::clone(ends);
        ProceduralAnimation::from_fn(name, layer, priority, |_, _, _| {})
            .on_start(move |_| {
                s.fetch_add(1, Ordering::SeqCst);
            })
            .on_end(move |_| {
                e.fetch_add(1, Ordering::SeqCst);
            })
    }

    #[test]
    fn higher_priority_replaces_and_ends_occupant() {
        let mut rig = PoseBuffer::humanoid();
        let mut sched = Scheduler::new();
        let starts = Arc::new(AtomicUsize::new(0));
        let ends = Arc::new(AtomicUsize::new(0));

        let a = counting("low", AnimationLayer::Gesture, 5, &starts, &ends);
        assert_eq!(sched.add_animation(a, false, &mut rig), Admission::Started);
        let b = counting("high", AnimationLayer::Gesture, 6, &starts, &ends);
        assert_eq!(
            sched.add_animation(b, false, &mut rig),
            Admission::Replaced { evicted: "low".into() }
        );
        assert_eq!(starts.load(Ordering::SeqCst), 2);
        assert_eq!(ends.load(Ordering::SeqCst), 1);
        assert_eq!(sched.active_animation_names(), vec!["high".to_string()]);
    }

    #[test]
    fn rejected_candidate_is_never_started() {
        let mut rig = PoseBuffer::humanoid();
        let mut sched = Scheduler::new();
        let starts = Arc::new(AtomicUsize::new(0));
        let ends = Arc::new(AtomicUsize::new(0));

        sched.add_animation(
            counting("a", AnimationLayer::Gesture, 5, &starts, &ends),
            false,
            &mut rig,
        );
        let outcome = sched.add_animation(
            counting("b", AnimationLayer::Gesture, 5, &starts, &ends),
            false,
            &mut rig,
        );
        assert_eq!(outcome, Admission::Rejected { occupant: "a".into() });
        assert_eq!(starts.load(Ordering::SeqCst), 1);
        assert_eq!(ends.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn forced_replace_ignores_priority() {
        let mut rig = PoseBuffer::humanoid();
        let mut sched = Scheduler::new();
        fn noop(_: &mut dyn Rig, _: f32, _: f32) {}
        sched.add_animation(
            ProceduralAnimation::from_fn("big", AnimationLayer::Gesture, 50, noop),
            false,
            &mut rig,
        );
        let outcome = sched.add_animation(
            ProceduralAnimation::from_fn("small", AnimationLayer::Gesture, 1, noop),
            true,
            &mut rig,
        );
        assert!(outcome.is_admitted());
        assert!(sched.is_animation_active("small"));
        assert!(!sched.is_animation_active("big"));
    }

    #[test]
    fn layers_compose_in_order_and_rest_between_frames() {
        let mut rig = PoseBuffer::humanoid();
        let mut sched = Scheduler::new();
        sched.add_animation(
            ProceduralAnimation::from_fn("base", AnimationLayer::Base, 1, |rig, _, _| {
                if let Some(t) = rig.bone_mut(HumanoidBone::Head) {
                    t.rotation[0] = 0.1;
                }
                if let Some(t) = rig.bone_mut(HumanoidBone::Spine) {
                    t.rotation[0] = 0.2;
                }
            }),
            false,
            &mut rig,
        );
        sched.add_animation(
            ProceduralAnimation::from_fn("over", AnimationLayer::Override, 1, |rig, _, _| {
                if let Some(t) = rig.bone_mut(HumanoidBone::Head) {
                    t.rotation[0] = 0.9;
                }
            })
            .with_duration(0.05),
            false,
            &mut rig,
        );
        sched.update(0.016, &mut rig);
        assert_eq!(rig.rotation(HumanoidBone::Head), Some([0.9, 0.0, 0.0]));
        assert_eq!(rig.rotation(HumanoidBone::Spine), Some([0.2, 0.0, 0.0]));

        for _ in 0..4 {
            sched.update(0.016, &mut rig);
        }
        assert!(sched.is_layer_empty(AnimationLayer::Override));
        assert_eq!(rig.rotation(HumanoidBone::Head), Some([0.1, 0.0, 0.0]));
    }

    #[test]
    fn reset_ends_everything_and_zeroes_clock() {
        let mut rig = PoseBuffer::humanoid();
        let mut sched = Scheduler::new();
        let starts = Arc::new(AtomicUsize::new(0));
        let ends = Arc::new(AtomicUsize::new(0));
        for (i, layer) in AnimationLayer::ALL.into_iter().enumerate() {
            sched.add_animation(
                counting(&format!("a{i}"), layer, 1, &starts, &ends),
                false,
                &mut rig,
            );
        }
        sched.update(0.5, &mut rig);
        sched.reset(&mut rig);
        assert_eq!(ends.load(Ordering::SeqCst), 5);
        assert!(sched.active_animation_names().is_empty());
        assert_eq!(sched.clock(), 0.0);
    }

    #[test]
    fn remove_by_name_finds_layer() {
        let mut rig = PoseBuffer::humanoid();
        let mut sched = Scheduler::new();
        sched.add_animation(
            ProceduralAnimation::from_fn("wave", AnimationLayer::Gesture, 20, |_, _, _| {}),
            false,
            &mut rig,
        );
        assert!(!sched.remove_animation_by_name("nod", &mut rig));
        assert!(sched.remove_animation_by_name("wave", &mut rig));
        assert!(sched.is_layer_empty(AnimationLayer::Gesture));
    }
}
