//! Easing curves and small interpolation helpers shared by the generators,
//! the emotion blender and the camera controller.

pub mod easing;

pub use easing::Easing;

use std::f32::consts::PI;

/// Normalized progress `elapsed / duration`, clamped to `[0, 1]`.
/// Infinite or non-positive durations report 0.
#[inline]
pub fn progress(elapsed: f32, duration: f32) -> f32 {
    if !duration.is_finite() || duration <= 0.0 {
        return 0.0;
    }
    (elapsed / duration).clamp(0.0, 1.0)
}

/// `sin(t * 2π * freq) * amplitude`
#[inline]
pub fn oscillate(t: f32, freq: f32, amplitude: f32) -> f32 {
    (t * 2.0 * PI * freq).sin() * amplitude
}

/// Rise-and-fall envelope: eases up over the first half, back down over the second.
#[inline]
pub fn there_and_back(p: f32, easing: Easing) -> f32 {
    if p < 0.5 {
        easing.apply(p * 2.0)
    } else {
        easing.apply(2.0 - p * 2.0)
    }
}
