//! Planner-facing control payload.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// One batch of requests. Every field is optional; absent fields leave the
/// corresponding state alone.
///
/// ```json
/// { "emotion": "happy", "intensity": 0.7, "action": "wave", "duration": 2.5,
///   "viewMode": "half-body", "lookAtUser": true, "interrupt": true }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnimationCommand {
    pub emotion: Option<String>,
    pub action: Option<String>,
    /// Overrides the action's built-in duration, seconds.
    pub duration: Option<f32>,
    /// Emotion intensity; 1.0 when absent.
    pub intensity: Option<f32>,
    pub view_mode: Option<String>,
    pub look_at_user: bool,
    /// Clear every non-base layer before applying the rest.
    pub interrupt: bool,
}

impl AnimationCommand {
    pub fn from_json(s: &str) -> Result<Self, EngineError> {
        serde_json::from_str(s).map_err(|e| EngineError::InvalidCommand(e.to_string()))
    }

    pub fn emotion(name: impl Into<String>, intensity: f32) -> Self {
        Self {
            emotion: Some(name.into()),
            intensity: Some(intensity),
            ..Self::default()
        }
    }

    pub fn action(name: impl Into<String>) -> Self {
        Self {
            action: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn interrupting(mut self) -> Self {
        self.interrupt = true;
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_planner_payload() {
        let cmd = AnimationCommand::from_json(
            r#"{ "emotion": "happy", "action": "wave", "lookAtUser": true, "viewMode": "head-only" }"#,
        )
        .unwrap();
        assert_eq!(cmd.emotion.as_deref(), Some("happy"));
        assert_eq!(cmd.view_mode.as_deref(), Some("head-only"));
        assert!(cmd.look_at_user);
        assert!(!cmd.interrupt);
        assert_eq!(cmd.intensity, None);
    }

    #[test]
    fn rejects_wrongly_typed_fields() {
        let err = AnimationCommand::from_json(r#"{ "intensity": "loud" }"#).unwrap_err();
        assert!(matches!(err, EngineError::InvalidCommand(_)));
        assert!(AnimationCommand::from_json("{}").unwrap().is_empty());
    }
}
