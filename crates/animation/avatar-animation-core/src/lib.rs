//! Avatar Animation Core (engine-agnostic)
//!
//! Layered procedural body language for humanoid avatars: a priority-arbitrated
//! layer scheduler, procedural idle/blink/gaze generators, named gestures, an
//! emotion blend engine, camera framing transitions, clip retargeting and
//! phoneme-driven lip sync. Everything writes into a [`Rig`] once per frame;
//! adapters (Bevy, web, headless) copy the result onto their scene.

pub mod actions;
pub mod animation;
pub mod camera;
pub mod clip;
pub mod command;
pub mod config;
pub mod emotion;
pub mod engine;
pub mod error;
pub mod generators;
pub mod interp;
pub mod library;
pub mod phoneme;
pub mod playback;
pub mod retarget;
pub mod scheduler;
pub mod skeleton;

// Re-exports for consumers (adapters)
pub use actions::{ActionKind, ActionParams, DanceStyle};
pub use animation::{AnimationLayer, FnMotion, Motion, ProceduralAnimation};
pub use camera::{CameraController, CameraFrame, View, ViewMode, ViewState};
pub use clip::{AnimationClip, KeyframeTrack, TrackKind};
pub use command::AnimationCommand;
pub use config::{EngineConfig, Smoothing};
pub use emotion::{blend_presets, Emotion, EmotionEngine, EmotionState};
pub use engine::{AnimationEngine, EngineStatus, USER_POSITION};
pub use error::{ClipError, EngineError, LoadError};
pub use interp::Easing;
pub use library::{ClipFuture, ClipLibrary, ClipSource, FsClipSource};
pub use phoneme::{phoneme_to_blendshapes, MouthShape, PhonemeEvent, PhonemeMapper, PhonemeTimeline};
pub use playback::clip_animation;
pub use retarget::{retarget_clip, RetargetMap};
pub use scheduler::{Admission, Scheduler};
pub use skeleton::{
    BoneResolver, BoneTransform, ExpressionSink, Hand, HumanoidBone, NodeNameTable, PoseBuffer,
    Rig, Skeleton,
};
pub use avatar_api_core::{EulerXyz, Quat, Vec3};
