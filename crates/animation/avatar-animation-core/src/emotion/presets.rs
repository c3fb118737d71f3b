//! Emotion preset table.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    #[default]
    Neutral,
    Happy,
    Sad,
    Angry,
    Surprised,
    Confused,
    Cute,
    Excited,
    Nervous,
}

impl Emotion {
    pub const ALL: [Emotion; 9] = [
        Emotion::Neutral,
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Surprised,
        Emotion::Confused,
        Emotion::Cute,
        Emotion::Excited,
        Emotion::Nervous,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::Neutral => "neutral",
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Surprised => "surprised",
            Emotion::Confused => "confused",
            Emotion::Cute => "cute",
            Emotion::Excited => "excited",
            Emotion::Nervous => "nervous",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Emotion::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| EngineError::UnknownEmotion(s.to_string()))
    }
}

/// Constant head rotation offset, radians.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadBias {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

/// Posture offsets, radians.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyLanguage {
    pub head_tilt: f32,
    pub neck_angle: f32,
    pub shoulder_raise: f32,
    pub spine_slump: f32,
}

/// Head jitter layered over the bias while the emotion is held.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MicroMovement {
    pub enabled: bool,
    pub frequency: f32,
    pub amplitude: f32,
}

struct Preset {
    expressions: &'static [(&'static str, f32)],
    head: HeadBias,
    body: BodyLanguage,
    micro: MicroMovement,
    gesture_modifier: f32,
    movement_speed: f32,
}

const fn head(pitch: f32, yaw: f32, roll: f32) -> HeadBias {
    HeadBias { pitch, yaw, roll }
}

const fn body(head_tilt: f32, neck_angle: f32, shoulder_raise: f32, spine_slump: f32) -> BodyLanguage {
    BodyLanguage {
        head_tilt,
        neck_angle,
        shoulder_raise,
        spine_slump,
    }
}

const fn micro(enabled: bool, frequency: f32, amplitude: f32) -> MicroMovement {
    MicroMovement {
        enabled,
        frequency,
        amplitude,
    }
}

fn preset(emotion: Emotion) -> Preset {
    match emotion {
        Emotion::Neutral => Preset {
            expressions: &[("relaxed", 0.1)],
            head: head(0.0, 0.0, 0.0),
            body: body(0.0, 0.0, 0.0, 0.0),
            micro: micro(true, 0.4, 0.08),
            gesture_modifier: 1.0,
            movement_speed: 1.0,
        },
        Emotion::Happy => Preset {
            expressions: &[("happy", 0.8), ("relaxed", 0.3)],
            head: head(0.05, 0.0, 0.0),
            body: body(0.05, 0.02, -0.02, -0.03),
            micro: micro(true, 0.8, 0.15),
            gesture_modifier: 1.3,
            movement_speed: 1.2,
        },
        Emotion::Sad => Preset {
            expressions: &[("sad", 0.7), ("relaxed", 0.2)],
            head: head(-0.15, 0.05, 0.0),
            body: body(-0.08, -0.05, 0.08, 0.15),
            micro: micro(true, 0.3, 0.05),
            gesture_modifier: 0.6,
            movement_speed: 0.7,
        },
        Emotion::Angry => Preset {
            expressions: &[("angry", 0.8)],
            head: head(0.0, 0.0, 0.0),
            body: body(-0.03, 0.05, -0.05, -0.05),
            micro: micro(true, 0.5, 0.1),
            gesture_modifier: 1.5,
            movement_speed: 1.3,
        },
        Emotion::Surprised => Preset {
            expressions: &[("surprised", 0.9)],
            head: head(0.1, 0.0, 0.0),
            body: body(0.03, 0.04, -0.04, -0.02),
            micro: micro(false, 0.0, 0.0),
            gesture_modifier: 1.2,
            movement_speed: 1.3,
        },
        Emotion::Confused => Preset {
            expressions: &[("surprised", 0.3), ("sad", 0.2)],
            head: head(0.0, 0.1, 0.05),
            body: body(0.12, 0.05, 0.05, 0.03),
            micro: micro(true, 0.6, 0.12),
            gesture_modifier: 0.9,
            movement_speed: 0.9,
        },
        Emotion::Cute => Preset {
            expressions: &[("happy", 0.7), ("relaxed", 0.5)],
            head: head(0.03, 0.0, 0.0),
            body: body(0.15, 0.08, -0.03, -0.02),
            micro: micro(true, 0.7, 0.1),
            gesture_modifier: 1.4,
            movement_speed: 1.1,
        },
        Emotion::Excited => Preset {
            expressions: &[("happy", 0.9), ("surprised", 0.4)],
            head: head(0.08, 0.0, 0.0),
            body: body(0.08, 0.05, -0.05, -0.08),
            micro: micro(true, 1.0, 0.15),
            gesture_modifier: 1.6,
            movement_speed: 1.4,
        },
        Emotion::Nervous => Preset {
            expressions: &[("sad", 0.4), ("surprised", 0.3)],
            head: head(-0.05, 0.03, 0.0),
            body: body(-0.05, -0.03, 0.12, 0.08),
            micro: micro(true, 1.2, 0.1),
            gesture_modifier: 0.8,
            movement_speed: 0.9,
        },
    }
}

/// Full emotional pose: what the face shows and how the body carries itself.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionState {
    pub emotion: Emotion,
    pub intensity: f32,
    /// Already multiplied by `intensity`.
    pub expressions: BTreeMap<String, f32>,
    pub head: HeadBias,
    pub body: BodyLanguage,
    pub micro: MicroMovement,
    pub gesture_modifier: f32,
    pub movement_speed: f32,
}

impl EmotionState {
    /// Preset at full intensity.
    pub fn preset(emotion: Emotion) -> Self {
        Self::scaled(emotion, 1.0)
    }

    /// Preset with expression weights scaled by `intensity` (clamped to `[0, 1]`).
    pub fn scaled(emotion: Emotion, intensity: f32) -> Self {
        let intensity = if intensity.is_finite() {
            intensity.clamp(0.0, 1.0)
        } else {
            1.0
        };
        let p = preset(emotion);
        Self {
            emotion,
            intensity,
            expressions: p
                .expressions
                .iter()
                .map(|(k, w)| (k.to_string(), w * intensity))
                .collect(),
            head: p.head,
            body: p.body,
            micro: p.micro,
            gesture_modifier: p.gesture_modifier,
            movement_speed: p.movement_speed,
        }
    }

    /// Field-wise blend. Expression keys are the union of both states; a key
    /// missing on one side counts as 0. `t >= 1` yields `to` exactly.
    pub fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        let m = |a: f32, b: f32| if t >= 1.0 { b } else { a + (b - a) * t };

        let mut expressions = BTreeMap::new();
        for key in from.expressions.keys().chain(to.expressions.keys()) {
            if expressions.contains_key(key) {
                continue;
            }
            let a = from.expressions.get(key).copied().unwrap_or(0.0);
            let b = to.expressions.get(key).copied().unwrap_or(0.0);
            expressions.insert(key.clone(), m(a, b));
        }

        Self {
            emotion: to.emotion,
            intensity: m(from.intensity, to.intensity),
            expressions,
            head: HeadBias {
                pitch: m(from.head.pitch, to.head.pitch),
                yaw: m(from.head.yaw, to.head.yaw),
                roll: m(from.head.roll, to.head.roll),
            },
            body: BodyLanguage {
                head_tilt: m(from.body.head_tilt, to.body.head_tilt),
                neck_angle: m(from.body.neck_angle, to.body.neck_angle),
                shoulder_raise: m(from.body.shoulder_raise, to.body.shoulder_raise),
                spine_slump: m(from.body.spine_slump, to.body.spine_slump),
            },
            micro: MicroMovement {
                enabled: to.micro.enabled,
                frequency: m(from.micro.frequency, to.micro.frequency),
                amplitude: m(from.micro.amplitude, to.micro.amplitude),
            },
            gesture_modifier: m(from.gesture_modifier, to.gesture_modifier),
            movement_speed: m(from.movement_speed, to.movement_speed),
        }
    }

    pub fn expression(&self, name: &str) -> f32 {
        self.expressions.get(name).copied().unwrap_or(0.0)
    }
}

/// Blend of two full-intensity presets.
pub fn blend_presets(a: Emotion, b: Emotion, t: f32) -> EmotionState {
    EmotionState::lerp(&EmotionState::preset(a), &EmotionState::preset(b), t.clamp(0.0, 1.0))
}
