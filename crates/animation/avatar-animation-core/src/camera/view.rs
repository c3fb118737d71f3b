use avatar_api_core::Vec3;
use serde::{Deserialize, Serialize};

/// The camera the controller drives: one capability covering both the
/// projection (position, fov) and the orbit rig (distance bounds, pivot).
pub trait View: Send + Sync {
    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);

    /// Vertical field of view, degrees.
    fn fov(&self) -> f32;
    fn set_fov(&mut self, fov: f32);

    /// `(min_distance, max_distance)` for user orbiting.
    fn orbit_bounds(&self) -> (f32, f32);
    fn set_orbit_bounds(&mut self, min: f32, max: f32);

    fn look_at_target(&self) -> Vec3;
    fn set_look_at_target(&mut self, target: Vec3);
}

/// Plain-data [`View`]. Hosts without a scene camera (tests, headless
/// playback) read the framing back from here.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub position: Vec3,
    pub fov: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub look_at: Vec3,
}

impl Default for ViewState {
    fn default() -> Self {
        super::ViewMode::FullBody.preset().into()
    }
}

impl View for ViewState {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn fov(&self) -> f32 {
        self.fov
    }

    fn set_fov(&mut self, fov: f32) {
        self.fov = fov;
    }

    fn orbit_bounds(&self) -> (f32, f32) {
        (self.min_distance, self.max_distance)
    }

    fn set_orbit_bounds(&mut self, min: f32, max: f32) {
        self.min_distance = min;
        self.max_distance = max;
    }

    fn look_at_target(&self) -> Vec3 {
        self.look_at
    }

    fn set_look_at_target(&mut self, target: Vec3) {
        self.look_at = target;
    }
}
