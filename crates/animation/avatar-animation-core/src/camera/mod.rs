//! Camera framing presets and the eased transition controller.

mod view;

pub use view::{View, ViewState};

use std::fmt;
use std::str::FromStr;

use avatar_api_core::{lerp_array, lerp_f, Vec3};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::interp::easing::in_out_cubic;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewMode {
    #[default]
    FullBody,
    HalfBody,
    HeadOnly,
    Cinematic,
}

impl ViewMode {
    /// Cycle order.
    pub const ALL: [ViewMode; 4] = [
        ViewMode::FullBody,
        ViewMode::HalfBody,
        ViewMode::HeadOnly,
        ViewMode::Cinematic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::FullBody => "full-body",
            ViewMode::HalfBody => "half-body",
            ViewMode::HeadOnly => "head-only",
            ViewMode::Cinematic => "cinematic",
        }
    }

    pub fn next(self) -> ViewMode {
        let i = ViewMode::ALL.iter().position(|m| *m == self).unwrap_or(0);
        ViewMode::ALL[(i + 1) % ViewMode::ALL.len()]
    }

    pub fn preset(self) -> CameraFrame {
        match self {
            ViewMode::FullBody => CameraFrame {
                position: [0.0, 0.8, 3.5],
                fov: 35.0,
                min_distance: 1.5,
                max_distance: 8.0,
                look_at: [0.0, 0.8, 0.0],
            },
            ViewMode::HalfBody => CameraFrame {
                position: [0.0, 1.2, 2.0],
                fov: 30.0,
                min_distance: 1.0,
                max_distance: 4.0,
                look_at: [0.0, 1.2, 0.0],
            },
            ViewMode::HeadOnly => CameraFrame {
                position: [0.0, 1.5, 1.2],
                fov: 25.0,
                min_distance: 0.5,
                max_distance: 2.0,
                look_at: [0.0, 1.5, 0.0],
            },
            ViewMode::Cinematic => CameraFrame {
                position: [2.0, 1.2, 3.0],
                fov: 40.0,
                min_distance: 2.0,
                max_distance: 10.0,
                look_at: [0.0, 1.0, 0.0],
            },
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = EngineError;

    /// Accepts `head-only`, `head_only` and `headOnly`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        ViewMode::ALL
            .into_iter()
            .find(|m| m.as_str().replace('-', "") == key)
            .ok_or_else(|| EngineError::UnknownViewMode(s.to_string()))
    }
}

/// One complete camera framing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraFrame {
    pub position: Vec3,
    pub fov: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub look_at: Vec3,
}

impl CameraFrame {
    pub fn capture(view: &dyn View) -> Self {
        let (min_distance, max_distance) = view.orbit_bounds();
        Self {
            position: view.position(),
            fov: view.fov(),
            min_distance,
            max_distance,
            look_at: view.look_at_target(),
        }
    }

    /// Eased in-between. Orbit bounds jump straight to `to` so user orbiting is
    /// constrained by the destination framing for the whole move.
    fn blend(&self, to: &CameraFrame, t: f32) -> CameraFrame {
        CameraFrame {
            position: lerp_array(&self.position, &to.position, t),
            fov: lerp_f(self.fov, to.fov, t),
            min_distance: to.min_distance,
            max_distance: to.max_distance,
            look_at: lerp_array(&self.look_at, &to.look_at, t),
        }
    }

    fn write_to(&self, view: &mut dyn View) {
        view.set_position(self.position);
        view.set_fov(self.fov);
        view.set_orbit_bounds(self.min_distance, self.max_distance);
        view.set_look_at_target(self.look_at);
    }
}

impl From<CameraFrame> for ViewState {
    fn from(f: CameraFrame) -> Self {
        ViewState {
            position: f.position,
            fov: f.fov,
            min_distance: f.min_distance,
            max_distance: f.max_distance,
            look_at: f.look_at,
        }
    }
}

struct Transition {
    start: CameraFrame,
    target: CameraFrame,
    duration: f32,
    progress: f32,
}

/// Drives a [`View`] between preset framings with a cubic in-out ease.
pub struct CameraController {
    view: Box<dyn View>,
    current_mode: ViewMode,
    target_mode: ViewMode,
    transition: Option<Transition>,
}

impl CameraController {
    /// Wraps `view` without moving it; the mode is reported as full-body.
    pub fn new(view: impl View + 'static) -> Self {
        Self {
            view: Box::new(view),
            current_mode: ViewMode::FullBody,
            target_mode: ViewMode::FullBody,
            transition: None,
        }
    }

    /// Start an eased move to `mode`'s preset over `duration` seconds, from
    /// wherever the camera is right now. Returns false when already settled
    /// at `mode`. A non-positive duration applies the preset immediately.
    pub fn set_view_mode(&mut self, mode: ViewMode, duration: f32) -> bool {
        if self.transition.is_none() && mode == self.current_mode {
            return false;
        }
        if !(duration.is_finite() && duration > 0.0) {
            self.apply_immediately(mode);
            return true;
        }
        self.target_mode = mode;
        self.transition = Some(Transition {
            start: CameraFrame::capture(self.view.as_ref()),
            target: mode.preset(),
            duration,
            progress: 0.0,
        });
        debug!("camera: transitioning to {} over {:.2}s", mode, duration);
        true
    }

    /// Snap to `mode`'s preset, cancelling any transition.
    pub fn apply_immediately(&mut self, mode: ViewMode) {
        mode.preset().write_to(self.view.as_mut());
        self.transition = None;
        self.current_mode = mode;
        self.target_mode = mode;
    }

    /// Advance to the mode after the one currently targeted.
    pub fn cycle_view_mode(&mut self, duration: f32) -> ViewMode {
        let next = self.target_mode.next();
        self.set_view_mode(next, duration);
        next
    }

    /// Transition back to full-body.
    pub fn reset(&mut self, duration: f32) {
        self.set_view_mode(ViewMode::FullBody, duration);
    }

    /// Re-aim the orbit pivot without changing the framing mode.
    pub fn look_at(&mut self, target: Vec3) {
        self.view.set_look_at_target(target);
        if let Some(tr) = self.transition.as_mut() {
            tr.target.look_at = target;
        }
    }

    pub fn update(&mut self, dt: f32) {
        let Some(tr) = self.transition.as_mut() else {
            return;
        };
        tr.progress = (tr.progress + dt.max(0.0) / tr.duration).min(1.0);
        if tr.progress >= 1.0 {
            tr.target.write_to(self.view.as_mut());
            self.current_mode = self.target_mode;
            self.transition = None;
            debug!("camera: settled at {}", self.current_mode);
            return;
        }
        let frame = tr.start.blend(&tr.target, in_out_cubic(tr.progress));
        frame.write_to(self.view.as_mut());
    }

    pub fn current_mode(&self) -> ViewMode {
        self.current_mode
    }

    pub fn target_mode(&self) -> ViewMode {
        self.target_mode
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// Transition progress in `[0, 1]`; 1 when settled.
    pub fn progress(&self) -> f32 {
        self.transition.as_ref().map_or(1.0, |t| t.progress)
    }

    pub fn frame(&self) -> CameraFrame {
        CameraFrame::capture(self.view.as_ref())
    }

    pub fn view(&self) -> &dyn View {
        self.view.as_ref()
    }
}
