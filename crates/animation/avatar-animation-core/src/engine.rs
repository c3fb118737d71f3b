//! Engine façade: owns the rig and every per-frame subsystem.
//!
//! Methods:
//! - new, with_view, with_clip_source
//! - execute_command, set_emotion, play_action, set_view_mode, look_at_camera
//! - apply_phoneme_timeline, load_clip, play_clip
//! - update (scheduler → ambient restore → emotion → camera → lip sync → clip installs)
//! - status, reset, dispose

use std::sync::Arc;

use avatar_api_core::Vec3;
use log::{debug, info, warn};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::actions::{ActionKind, ActionParams};
use crate::animation::AnimationLayer;
use crate::camera::{CameraController, View, ViewMode};
use crate::command::AnimationCommand;
use crate::config::EngineConfig;
use crate::emotion::{Emotion, EmotionEngine};
use crate::error::{EngineError, LoadError};
use crate::generators::{blinking, gaze, idle, look_at, IdleParts};
use crate::library::{ClipFuture, ClipLibrary, ClipSource};
use crate::phoneme::{PhonemeEvent, PhonemeMapper, PhonemeTimeline};
use crate::playback::clip_animation;
use crate::scheduler::{Admission, Scheduler};
use crate::skeleton::{NodeNameTable, Rig};

/// Where [`AnimationEngine::look_at_camera`] aims: the default camera eye.
pub const USER_POSITION: Vec3 = [0.0, 1.5, 5.0];

/// Snapshot for UIs and planners.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStatus {
    /// Emotion being shown or blended toward.
    pub emotion: Emotion,
    /// Last requested action, while its animation is still running.
    pub action: Option<String>,
    pub view_mode: ViewMode,
    /// Active animation names in layer order.
    pub active_layer_names: Vec<String>,
    /// Emotion or camera interpolation still in progress.
    pub is_transitioning: bool,
}

struct RunningAction {
    kind: ActionKind,
    animation: String,
}

pub struct AnimationEngine<R: Rig> {
    rig: R,
    config: EngineConfig,
    scheduler: Scheduler,
    emotion: EmotionEngine,
    camera: Option<CameraController>,
    phonemes: PhonemeMapper,
    clips: ClipLibrary,
    rng: Pcg32,
    /// Monotonic seconds since construction; unlike the scheduler clock it
    /// survives `reset`, so phoneme timelines keep a stable reference.
    clock: f64,
    action: Option<RunningAction>,
}

impl<R: Rig> AnimationEngine<R> {
    /// Engine over `rig` with the ambient animations `config` enables already
    /// admitted.
    pub fn new(rig: R, config: EngineConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => Pcg32::seed_from_u64(seed),
            None => Pcg32::from_entropy(),
        };
        let mut engine = Self {
            rig,
            scheduler: Scheduler::new(),
            emotion: EmotionEngine::new(),
            camera: None,
            phonemes: PhonemeMapper::new(config.phoneme_smoothing, config.phoneme_grace_secs),
            clips: ClipLibrary::new(config.clip_root.clone(), config.clip_extension.clone()),
            rng,
            clock: 0.0,
            action: None,
            config,
        };
        engine.install_base_animations();
        engine
    }

    /// Attach a camera; the controller starts in full-body without moving it.
    pub fn with_view(mut self, view: impl View + 'static) -> Self {
        self.camera = Some(CameraController::new(view));
        self
    }

    pub fn with_clip_source(mut self, source: Arc<dyn ClipSource>) -> Self {
        self.clips.set_source(source);
        self
    }

    fn child_rng(&mut self) -> Pcg32 {
        Pcg32::seed_from_u64(self.rng.gen())
    }

    fn install_base_animations(&mut self) {
        if self.config.any_idle_enabled() {
            let parts = IdleParts {
                breathing: self.config.enable_breathing,
                sway: self.config.enable_idle_movements,
                head_bob: self.config.enable_idle_movements,
                micro: self.config.enable_micro_movements,
            };
            self.scheduler.add_animation(idle(parts), false, &mut self.rig);
        }
        if self.config.enable_blinking {
            self.admit_blink();
        }
        if self.config.enable_gaze {
            self.admit_gaze();
        }
        info!("engine: base animations initialized");
    }

    fn admit_blink(&mut self) {
        let rng = self.child_rng();
        let anim = blinking(self.config.blink_interval, rng);
        self.scheduler.add_animation(anim, false, &mut self.rig);
    }

    fn admit_gaze(&mut self) {
        let rng = self.child_rng();
        let anim = gaze(self.config.gaze_interval, rng);
        self.scheduler.add_animation(anim, false, &mut self.rig);
    }

    /// Bring blink and gaze back once whatever displaced them has finished.
    fn restore_ambient(&mut self) {
        if !self.config.restore_ambient {
            return;
        }
        if self.config.enable_gaze && self.scheduler.is_layer_empty(AnimationLayer::Gesture) {
            debug!("engine: gesture layer idle; restoring gaze");
            self.admit_gaze();
        }
        if self.config.enable_blinking && self.scheduler.is_layer_empty(AnimationLayer::Emotion) {
            debug!("engine: emotion layer idle; restoring blink");
            self.admit_blink();
        }
    }

    /// Advance every subsystem by `dt` seconds and leave the composed frame in the rig.
    pub fn update(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.clock += dt as f64;

        self.scheduler.update(dt, &mut self.rig);
        self.restore_ambient();
        self.emotion.update(dt, &mut self.rig);
        if let Some(camera) = self.camera.as_mut() {
            camera.update(dt);
        }
        self.phonemes.update(self.clock, dt, &mut self.rig);
        self.clips.install_completed();
    }

    /// Apply every valid field of `command`. Invalid fields are logged and
    /// skipped; the rest still take effect.
    pub fn execute_command(&mut self, command: &AnimationCommand) {
        debug!("engine: executing {command:?}");
        if command.interrupt {
            self.scheduler.clear_all_except_base(&mut self.rig);
        }
        if let Some(name) = command.emotion.as_deref() {
            let _ = self.set_emotion(name, command.intensity.unwrap_or(1.0));
        }
        if let Some(name) = command.action.as_deref() {
            let _ = self.play_action_with(name, command.duration);
        }
        if let Some(mode) = command.view_mode.as_deref() {
            let _ = self.set_view_mode(mode);
        }
        if command.look_at_user {
            self.look_at_camera();
        }
    }

    /// Blend toward the named emotion. `intensity` is clamped to `[0, 1]`.
    pub fn set_emotion(&mut self, name: &str, intensity: f32) -> Result<(), EngineError> {
        let emotion = name.parse::<Emotion>().map_err(|e| {
            warn!("engine: {e}; keeping current emotion");
            e
        })?;
        let intensity = if intensity.is_finite() { intensity.clamp(0.0, 1.0) } else { 1.0 };
        self.emotion
            .set_emotion(emotion, intensity, self.config.emotion_transition_speed);
        Ok(())
    }

    pub fn play_action(&mut self, name: &str) -> Result<Admission, EngineError> {
        self.play_action_with(name, None)
    }

    fn play_action_with(
        &mut self,
        name: &str,
        duration: Option<f32>,
    ) -> Result<Admission, EngineError> {
        let kind = name.parse::<ActionKind>().map_err(|e| {
            warn!("engine: {e}; ignoring");
            e
        })?;
        let params = ActionParams {
            duration,
            intensity: self.emotion.gesture_modifier(),
            ..ActionParams::default()
        };
        Ok(self.play_action_kind(kind, &params))
    }

    /// Play `kind`, replacing whatever holds its layer.
    pub fn play_action_kind(&mut self, kind: ActionKind, params: &ActionParams) -> Admission {
        let anim = kind.build(params);
        let animation = anim.name().to_string();
        let admission = self.scheduler.add_animation(anim, true, &mut self.rig);
        self.action = Some(RunningAction { kind, animation });
        admission
    }

    pub fn set_view_mode(&mut self, name: &str) -> Result<(), EngineError> {
        let mode = name.parse::<ViewMode>().map_err(|e| {
            warn!("engine: {e}; keeping current framing");
            e
        })?;
        match self.camera.as_mut() {
            Some(camera) => {
                camera.set_view_mode(mode, self.config.camera_transition_secs);
            }
            None => debug!("engine: no view attached; ignoring view mode {mode}"),
        }
        Ok(())
    }

    /// Move to the next framing in cycle order. `None` without a view.
    pub fn cycle_view_mode(&mut self) -> Option<ViewMode> {
        let secs = self.config.camera_transition_secs;
        self.camera.as_mut().map(|c| c.cycle_view_mode(secs))
    }

    /// Turn the head toward the user for a couple of seconds.
    pub fn look_at_camera(&mut self) -> Admission {
        self.scheduler
            .add_animation(look_at(USER_POSITION, true), true, &mut self.rig)
    }

    /// Start lip sync. Event times are relative to `start_time` on the engine
    /// clock, or to now when `None`.
    pub fn apply_phoneme_timeline(&mut self, events: Vec<PhonemeEvent>, start_time: Option<f64>) {
        let start = start_time.unwrap_or(self.clock);
        self.phonemes.load(PhonemeTimeline::new(events), start);
    }

    pub fn stop_phonemes(&mut self) {
        self.phonemes.stop(&mut self.rig);
    }

    /// Begin loading the clip `name`, retargeted onto this rig. The caller
    /// drives the returned future; the clip is installed by the first `update`
    /// after it resolves. Dropping it unfinished abandons the load.
    pub fn load_clip(&mut self, name: &str) -> ClipFuture {
        let nodes = NodeNameTable::capture(&self.rig);
        self.clips.request(name, nodes)
    }

    /// Play an installed clip on `layer`, replacing the occupant.
    pub fn play_clip(
        &mut self,
        name: &str,
        layer: AnimationLayer,
        priority: i32,
        looping: bool,
    ) -> Result<Admission, LoadError> {
        let clip = self.clips.get(name).ok_or_else(|| {
            warn!("engine: clip '{name}' is not loaded");
            LoadError::NotFound(name.to_string())
        })?;
        let anim = clip_animation(clip, layer, priority, looping);
        Ok(self.scheduler.add_animation(anim, true, &mut self.rig))
    }

    pub fn status(&self) -> EngineStatus {
        let action = self
            .action
            .as_ref()
            .filter(|a| self.scheduler.is_animation_active(&a.animation))
            .map(|a| a.kind.as_str().to_string());
        let camera_moving = self.camera.as_ref().is_some_and(|c| c.is_transitioning());
        EngineStatus {
            emotion: self.emotion.target().emotion,
            action,
            view_mode: self
                .camera
                .as_ref()
                .map_or(ViewMode::FullBody, |c| c.current_mode()),
            active_layer_names: self.scheduler.active_animation_names(),
            is_transitioning: self.emotion.is_transitioning() || camera_moving,
        }
    }

    /// Evict everything, reinstall the ambient set, head back to neutral and
    /// to the full-body framing.
    pub fn reset(&mut self) {
        self.scheduler.reset(&mut self.rig);
        self.phonemes.stop(&mut self.rig);
        self.action = None;
        self.install_base_animations();
        self.emotion.reset();
        let secs = self.config.camera_transition_secs;
        if let Some(camera) = self.camera.as_mut() {
            camera.reset(secs);
        }
        info!("engine: reset");
    }

    /// Evict everything without reinstalling anything.
    pub fn dispose(&mut self) {
        self.scheduler.reset(&mut self.rig);
        self.phonemes.stop(&mut self.rig);
        self.clips.clear();
        self.action = None;
        info!("engine: disposed");
    }

    pub fn rig(&self) -> &R {
        &self.rig
    }

    pub fn rig_mut(&mut self) -> &mut R {
        &mut self.rig
    }

    pub fn into_rig(self) -> R {
        self.rig
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn emotion(&self) -> &EmotionEngine {
        &self.emotion
    }

    pub fn camera(&self) -> Option<&CameraController> {
        self.camera.as_ref()
    }

    pub fn phonemes(&self) -> &PhonemeMapper {
        &self.phonemes
    }

    pub fn clips(&self) -> &ClipLibrary {
        &self.clips
    }

    pub fn clips_mut(&mut self) -> &mut ClipLibrary {
        &mut self.clips
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::ViewState;
    use crate::skeleton::{ExpressionSink, PoseBuffer};

    fn engine() -> AnimationEngine<PoseBuffer> {
        let config = EngineConfig {
            seed: Some(3),
            ..EngineConfig::default()
        };
        AnimationEngine::new(PoseBuffer::humanoid(), config).with_view(ViewState::default())
    }

    #[test]
    fn installs_ambient_set() {
        let e = engine();
        assert_eq!(
            e.status().active_layer_names,
            vec!["idle".to_string(), "auto_gaze".into(), "auto_blink".into()]
        );
        let quiet = AnimationEngine::new(PoseBuffer::humanoid(), EngineConfig::quiet());
        assert!(quiet.status().active_layer_names.is_empty());
    }

    #[test]
    fn invalid_fields_do_not_block_valid_ones() {
        let mut e = engine();
        let cmd = AnimationCommand {
            emotion: Some("ecstatic".into()),
            action: Some("wave".into()),
            view_mode: Some("close-up".into()),
            ..AnimationCommand::default()
        };
        e.execute_command(&cmd);
        let status = e.status();
        assert_eq!(status.emotion, Emotion::Neutral);
        assert_eq!(status.action.as_deref(), Some("wave"));
        assert_eq!(status.view_mode, ViewMode::FullBody);
        assert!(!status.is_transitioning);
    }

    #[test]
    fn gaze_returns_after_gesture_finishes() {
        let mut e = engine();
        e.play_action("nod").unwrap();
        assert!(e.scheduler().is_animation_active("nod"));
        for _ in 0..70 {
            e.update(1.0 / 60.0);
        }
        assert!(!e.scheduler().is_animation_active("nod"));
        assert!(e.scheduler().is_animation_active("auto_gaze"));
        assert_eq!(e.status().action, None);
    }

    #[test]
    fn lip_sync_runs_on_engine_clock() {
        let mut e = AnimationEngine::new(PoseBuffer::humanoid(), EngineConfig::quiet());
        e.update(1.0);
        e.apply_phoneme_timeline(vec![PhonemeEvent::new("AA", 0.0, 0.5)], None);
        e.update(0.1);
        let jaw = e.rig().expression("jawOpen").unwrap_or(0.0);
        assert!((jaw - 0.24).abs() < 1e-5);
        for _ in 0..20 {
            e.update(0.1);
        }
        assert!(!e.phonemes().is_playing());
        assert_eq!(e.rig().expression("jawOpen"), Some(0.0));
    }

    #[test]
    fn reset_restores_ambient_and_neutral() {
        let mut e = engine();
        e.set_emotion("sad", 2.0).unwrap();
        assert_eq!(e.emotion().target().intensity, 1.0);
        e.play_action("jump").unwrap();
        e.update(0.3);
        e.reset();
        let status = e.status();
        assert_eq!(status.emotion, Emotion::Neutral);
        assert_eq!(status.active_layer_names.len(), 3);
        assert_eq!(e.rig().root_position()[1], 0.0);

        e.dispose();
        assert!(e.status().active_layer_names.is_empty());
    }

    #[test]
    fn unknown_names_are_rejected() {
        let mut e = engine();
        assert_eq!(
            e.set_emotion("bored", 1.0),
            Err(EngineError::UnknownEmotion("bored".into()))
        );
        assert!(e.play_action("moonwalk").is_err());
        assert!(e.set_view_mode("fisheye").is_err());
        assert!(matches!(
            e.play_clip("missing", AnimationLayer::Override, 1, false),
            Err(LoadError::NotFound(_))
        ));
    }
}
