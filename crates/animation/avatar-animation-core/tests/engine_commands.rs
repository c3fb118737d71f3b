use avatar_animation_core::{
    AnimationCommand, AnimationEngine, AnimationLayer, Emotion, EngineConfig, PoseBuffer,
    ViewMode, ViewState,
};
use avatar_test_fixtures::commands;

fn engine() -> AnimationEngine<PoseBuffer> {
    let config = EngineConfig {
        seed: Some(11),
        ..EngineConfig::default()
    };
    AnimationEngine::new(PoseBuffer::humanoid(), config).with_view(ViewState::default())
}

fn command(name: &str) -> AnimationCommand {
    AnimationCommand::from_json(&commands::json(name).expect("fixture")).expect("valid command")
}

#[test]
fn greet_sets_emotion_action_and_framing() {
    let mut e = engine();
    e.execute_command(&command("greet"));

    let status = e.status();
    assert_eq!(status.emotion, Emotion::Happy);
    assert_eq!(status.action.as_deref(), Some("wave"));
    assert!(status.is_transitioning);
    assert!(status.active_layer_names.contains(&"wave_right".to_string()));
    assert!(!status.active_layer_names.contains(&"auto_gaze".to_string()));
    assert!((e.emotion().target().intensity - 0.8).abs() < 1e-6);

    for _ in 0..180 {
        e.update(1.0 / 60.0);
    }
    let status = e.status();
    assert_eq!(status.view_mode, ViewMode::HalfBody);
    assert_eq!(status.action, None);
    assert!(status.active_layer_names.contains(&"auto_gaze".to_string()));
}

#[test]
fn interrupt_clears_ambient_layers_then_jumps() {
    let mut e = engine();
    e.play_action("think").unwrap();
    e.execute_command(&command("interrupt_jump"));

    let names = e.status().active_layer_names;
    assert_eq!(names, vec!["idle".to_string(), "jump".into()]);
    assert!(e.scheduler().is_layer_empty(AnimationLayer::Gesture));

    e.update(1.0 / 60.0);
    assert!(e.scheduler().is_animation_active("auto_gaze"));
    assert!(e.scheduler().is_animation_active("auto_blink"));
}

#[test]
fn invalid_fields_are_skipped_individually() {
    let mut e = engine();
    e.execute_command(&command("mixed_validity"));

    let status = e.status();
    assert_eq!(status.emotion, Emotion::Neutral);
    assert_eq!(status.view_mode, ViewMode::FullBody);
    assert_eq!(status.action.as_deref(), Some("shake_head"));

    for _ in 0..40 {
        e.update(1.0 / 60.0);
    }
    assert_eq!(e.status().action, None);
}

#[test]
fn every_fixture_command_parses() {
    for key in commands::keys() {
        assert!(AnimationCommand::from_json(&commands::json(&key).unwrap()).is_ok(), "{key}");
    }
}

#[test]
fn look_at_user_takes_gesture_layer() {
    let mut e = engine();
    let cmd = AnimationCommand {
        look_at_user: true,
        ..AnimationCommand::default()
    };
    e.execute_command(&cmd);
    assert!(e.scheduler().is_animation_active("look_at_target"));
    for _ in 0..150 {
        e.update(1.0 / 60.0);
    }
    assert!(!e.scheduler().is_animation_active("look_at_target"));
    assert!(e.scheduler().is_animation_active("auto_gaze"));
}
