//! Named actions and their constructor table.

pub mod gestures;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::animation::ProceduralAnimation;
use crate::error::EngineError;
use crate::skeleton::Hand;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Wave,
    Point,
    Nod,
    ShakeHead,
    Bow,
    ThumbsUp,
    Dance,
    Jump,
    Celebrate,
    Think,
    Shrug,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DanceStyle {
    #[default]
    Groove,
    Energetic,
}

/// Knobs shared by every action constructor. Each action reads the ones it uses.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActionParams {
    pub hand: Hand,
    /// Replaces the action's built-in duration.
    pub duration: Option<f32>,
    /// Amplitude scale for nod and bow.
    pub intensity: f32,
    pub dance: DanceStyle,
}

impl Default for ActionParams {
    fn default() -> Self {
        Self {
            hand: Hand::Right,
            duration: None,
            intensity: 1.0,
            dance: DanceStyle::Groove,
        }
    }
}

impl ActionParams {
    pub(crate) fn secs_or(&self, default: f32) -> f32 {
        match self.duration {
            Some(d) if d.is_finite() && d > 0.0 => d,
            _ => default,
        }
    }
}

impl ActionKind {
    /// Every action, in declaration order.
    pub const ALL: [ActionKind; 11] = [
        ActionKind::Wave,
        ActionKind::Point,
        ActionKind::Nod,
        ActionKind::ShakeHead,
        ActionKind::Bow,
        ActionKind::ThumbsUp,
        ActionKind::Dance,
        ActionKind::Jump,
        ActionKind::Celebrate,
        ActionKind::Think,
        ActionKind::Shrug,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Wave => "wave",
            ActionKind::Point => "point",
            ActionKind::Nod => "nod",
            ActionKind::ShakeHead => "shake_head",
            ActionKind::Bow => "bow",
            ActionKind::ThumbsUp => "thumbs_up",
            ActionKind::Dance => "dance",
            ActionKind::Jump => "jump",
            ActionKind::Celebrate => "celebrate",
            ActionKind::Think => "think",
            ActionKind::Shrug => "shrug",
        }
    }

    pub fn build(self, params: &ActionParams) -> ProceduralAnimation {
        let build: fn(&ActionParams) -> ProceduralAnimation = match self {
            ActionKind::Wave => gestures::wave,
            ActionKind::Point => gestures::point,
            ActionKind::Nod => gestures::nod,
            ActionKind::ShakeHead => gestures::shake_head,
            ActionKind::Bow => gestures::bow,
            ActionKind::ThumbsUp => gestures::thumbs_up,
            ActionKind::Dance => gestures::dance,
            ActionKind::Jump => gestures::jump,
            ActionKind::Celebrate => gestures::celebrate,
            ActionKind::Think => gestures::think,
            ActionKind::Shrug => gestures::shrug,
        };
        build(params)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = EngineError;

    /// Accepts `shake_head`, `shake-head` and `ShakeHead` spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-' && *c != ' ')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        ActionKind::ALL
            .into_iter()
            .find(|k| k.as_str().replace('_', "") == key)
            .ok_or_else(|| EngineError::UnknownAction(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::AnimationLayer;

    #[test]
    fn names_are_distinct_and_round_trip() {
        let mut names: Vec<&str> = ActionKind::ALL.iter().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ActionKind::ALL.len());
        for kind in ActionKind::ALL {
            assert_eq!(kind.as_str().parse::<ActionKind>(), Ok(kind));
        }
    }

    #[test]
    fn names_parse_in_several_spellings() {
        assert_eq!("shake_head".parse::<ActionKind>(), Ok(ActionKind::ShakeHead));
        assert_eq!("Shake-Head".parse::<ActionKind>(), Ok(ActionKind::ShakeHead));
        assert_eq!("thumbsUp".parse::<ActionKind>(), Ok(ActionKind::ThumbsUp));
        assert_eq!(
            "moonwalk".parse::<ActionKind>(),
            Err(EngineError::UnknownAction("moonwalk".into()))
        );
    }

    #[test]
    fn priorities_order_preemption() {
        let p = |k: ActionKind| k.build(&ActionParams::default()).priority();
        assert!(p(ActionKind::Nod) < p(ActionKind::Wave));
        assert!(p(ActionKind::ShakeHead) < p(ActionKind::Point));
        assert!(p(ActionKind::Wave) < p(ActionKind::Bow));
        assert!(p(ActionKind::Bow) < p(ActionKind::Celebrate));
        assert!(p(ActionKind::Dance) < p(ActionKind::Jump));
        assert_eq!(
            ActionKind::Jump.build(&ActionParams::default()).layer(),
            AnimationLayer::Locomotion
        );
    }

    #[test]
    fn every_action_is_finite() {
        for kind in ActionKind::ALL {
            let anim = kind.build(&ActionParams::default());
            assert!(anim.is_finite(), "{kind:?}");
        }
    }
}
