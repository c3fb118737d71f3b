use std::f32::consts::PI;

use rand_pcg::Pcg32;

use super::draw_interval;
use crate::animation::{AnimationLayer, Motion, ProceduralAnimation};
use crate::skeleton::Rig;

/// Length of one eyelid close-and-open.
pub const BLINK_SECS: f32 = 0.15;

/// Randomly timed blinks on the `blink` expression.
pub struct BlinkMotion {
    interval: [f32; 2],
    timer: f32,
    next_blink: f32,
    rng: Pcg32,
}

impl BlinkMotion {
    pub fn new(interval: [f32; 2], rng: Pcg32) -> Self {
        Self {
            interval,
            timer: 0.0,
            next_blink: interval[0],
            rng,
        }
    }

    /// Seconds until the next blink begins (negative while blinking).
    pub fn time_to_next(&self) -> f32 {
        self.next_blink - self.timer
    }
}

impl Motion for BlinkMotion {
    fn update(&mut self, rig: &mut dyn Rig, _elapsed: f32, dt: f32) {
        self.timer += dt;
        if self.timer < self.next_blink {
            return;
        }
        let p = (self.timer - self.next_blink) / BLINK_SECS;
        if p < 1.0 {
            rig.set_expression("blink", (p * PI).sin());
        } else {
            rig.set_expression("blink", 0.0);
            self.next_blink = self.timer + draw_interval(&mut self.rng, self.interval);
        }
    }

    fn on_start(&mut self, _rig: &mut dyn Rig) {
        self.timer = 0.0;
        self.next_blink = draw_interval(&mut self.rng, self.interval);
    }

    fn on_end(&mut self, rig: &mut dyn Rig) {
        rig.set_expression("blink", 0.0);
    }
}

/// Blink generator on the emotion layer, priority 10.
pub fn blinking(interval: [f32; 2], rng: Pcg32) -> ProceduralAnimation {
    ProceduralAnimation::new(
        "auto_blink",
        AnimationLayer::Emotion,
        10,
        BlinkMotion::new(interval, rng),
    )
    .looping(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::{ExpressionSink, PoseBuffer};
    use rand::SeedableRng;

    #[test]
    fn blink_peaks_then_reopens() {
        let mut pose = PoseBuffer::humanoid();
        let mut anim = blinking([2.0, 2.0], Pcg32::seed_from_u64(1));
        anim.start(&mut pose);

        let dt = 0.005;
        let mut t = 0.0;
        let mut peak: f32 = 0.0;
        while t < 2.0 + BLINK_SECS + 0.05 {
            anim.update(&mut pose, t, dt);
            peak = peak.max(pose.expression("blink").unwrap_or(0.0));
            t += dt;
        }
        assert!(peak > 0.95, "peak {peak}");
        assert_eq!(pose.expression("blink"), Some(0.0));
    }

    #[test]
    fn no_blink_before_first_interval() {
        let mut pose = PoseBuffer::humanoid();
        let mut anim = blinking([3.0, 5.0], Pcg32::seed_from_u64(9));
        anim.start(&mut pose);
        for _ in 0..170 {
            anim.update(&mut pose, 0.0, 1.0 / 60.0);
        }
        assert_eq!(pose.expression("blink"), None);
    }
}
