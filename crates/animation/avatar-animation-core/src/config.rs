//! Engine configuration.

use serde::{Deserialize, Serialize};

/// How the lip-sync mapper eases its mouth weights toward the active phoneme.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum Smoothing {
    /// Move a fixed fraction of the remaining distance on every update.
    /// Frame-rate dependent; matches the classic `0.3` lip-sync feel at 60 Hz.
    PerUpdate { factor: f32 },
    /// Frame-rate independent exponential approach, `1 - exp(-rate * dt)`.
    Exponential { rate: f32 },
}

impl Default for Smoothing {
    fn default() -> Self {
        Smoothing::PerUpdate { factor: 0.3 }
    }
}

impl Smoothing {
    /// Blend factor in `[0, 1]` for a step of `dt` seconds.
    pub fn factor(&self, dt: f32) -> f32 {
        match *self {
            Smoothing::PerUpdate { factor } => factor.clamp(0.0, 1.0),
            Smoothing::Exponential { rate } => {
                if rate <= 0.0 || dt <= 0.0 {
                    0.0
                } else {
                    1.0 - (-rate * dt).exp()
                }
            }
        }
    }
}

/// Feature flags and tuning for [`crate::AnimationEngine`].
///
/// Every field has a default, so a partial JSON document is a valid config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub enable_breathing: bool,
    pub enable_blinking: bool,
    pub enable_idle_movements: bool,
    pub enable_micro_movements: bool,
    pub enable_gaze: bool,

    /// Seconds between blinks, drawn uniformly from `[min, max]`.
    pub blink_interval: [f32; 2],
    /// Seconds between gaze retargets, drawn uniformly from `[min, max]`.
    pub gaze_interval: [f32; 2],

    /// Emotion blend progress gained per update.
    pub emotion_transition_speed: f32,
    pub camera_transition_secs: f32,

    pub phoneme_smoothing: Smoothing,
    /// Hold time after the last phoneme ends before the mouth is released.
    pub phoneme_grace_secs: f32,

    /// Re-admit gaze and blink once their layers fall empty.
    pub restore_ambient: bool,

    /// Fixed RNG seed for reproducible blink/gaze timing. `None` seeds from entropy.
    pub seed: Option<u64>,

    /// Directory (relative to the clip source) holding named clips.
    pub clip_root: String,
    pub clip_extension: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enable_breathing: true,
            enable_blinking: true,
            enable_idle_movements: true,
            enable_micro_movements: true,
            enable_gaze: true,
            blink_interval: [2.0, 6.0],
            gaze_interval: [3.0, 8.0],
            emotion_transition_speed: 0.05,
            camera_transition_secs: 1.0,
            phoneme_smoothing: Smoothing::default(),
            phoneme_grace_secs: 0.5,
            restore_ambient: true,
            seed: None,
            clip_root: "animations".to_string(),
            clip_extension: "json".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Config with every ambient behavior switched off; useful when only
    /// explicitly scheduled animations should move the rig.
    pub fn quiet() -> Self {
        Self {
            enable_breathing: false,
            enable_blinking: false,
            enable_idle_movements: false,
            enable_micro_movements: false,
            enable_gaze: false,
            restore_ambient: false,
            ..Self::default()
        }
    }

    pub(crate) fn any_idle_enabled(&self) -> bool {
        self.enable_breathing || self.enable_idle_movements || self.enable_micro_movements
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let cfg = EngineConfig::from_json(r#"{ "enableGaze": false, "seed": 7 }"#).unwrap();
        assert!(!cfg.enable_gaze);
        assert!(cfg.enable_blinking);
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.phoneme_smoothing, Smoothing::PerUpdate { factor: 0.3 });
    }

    #[test]
    fn exponential_smoothing_is_bounded() {
        let s = Smoothing::Exponential { rate: 12.0 };
        let f = s.factor(1.0 / 60.0);
        assert!(f > 0.0 && f < 1.0);
        assert_eq!(s.factor(0.0), 0.0);
        let parsed: Smoothing =
            serde_json::from_str(r#"{ "mode": "exponential", "rate": 12.0 }"#).unwrap();
        assert_eq!(parsed, s);
    }
}
