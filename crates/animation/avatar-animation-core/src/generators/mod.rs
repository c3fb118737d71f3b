//! Ambient procedural generators.
//!
//! Each constructor returns a self-contained [`ProceduralAnimation`]: timers,
//! RNG and smoothing state live inside the motion, so two engines never share
//! blink or gaze timing.

mod blink;
mod gaze;
mod hand;
mod idle;

pub use blink::{blinking, BlinkMotion, BLINK_SECS};
pub use gaze::{gaze, look_at, GazeMotion, LookAtMotion, DEFAULT_HEAD_ORIGIN};
pub use hand::{hand_pose, HandPoseMotion};
pub use idle::{breathing, head_bob, idle, idle_breathing, idle_head_bob, idle_sway, micro_movements, sway, IdleParts};

use rand::Rng;

/// Uniform draw from `[min, max]`; tolerates swapped or equal bounds.
pub(crate) fn draw_interval(rng: &mut impl Rng, [min, max]: [f32; 2]) -> f32 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    if hi - lo <= f32::EPSILON {
        lo
    } else {
        rng.gen_range(lo..=hi)
    }
}
