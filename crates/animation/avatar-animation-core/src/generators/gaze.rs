use std::f32::consts::FRAC_PI_6;

use avatar_api_core::{
    euler_to_quat, mul_quat, quat_from_unit_vectors, quat_to_euler, slerp, vector, Quat, Vec3,
    IDENTITY,
};
use rand::Rng;
use rand_pcg::Pcg32;

use super::draw_interval;
use crate::animation::{AnimationLayer, Motion, ProceduralAnimation};
use crate::skeleton::{HumanoidBone, Rig};

/// Gaze origin used when the rig cannot report the head's world position.
pub const DEFAULT_HEAD_ORIGIN: Vec3 = [0.0, 1.5, 0.0];

const FORWARD: Vec3 = [0.0, 0.0, 1.0];

fn origin_of(rig: &dyn Rig, bone: HumanoidBone) -> Vec3 {
    rig.bone_world_position(bone)
        .or_else(|| rig.bone_world_position(HumanoidBone::Head))
        .unwrap_or(DEFAULT_HEAD_ORIGIN)
}

/// Rotation turning +Z toward `target` as seen from `origin`.
fn facing(origin: Vec3, target: Vec3) -> Quat {
    let dir = vector::normalize(vector::sub(target, origin));
    if vector::length(dir) == 0.0 {
        return IDENTITY;
    }
    quat_from_unit_vectors(FORWARD, dir)
}

/// Ease `current` toward `target`, then write it onto `bone` composed with
/// whatever lower layers already wrote there.
fn drive(rig: &mut dyn Rig, bone: HumanoidBone, current: &mut Quat, target: Quat, t: f32) {
    *current = slerp(*current, target, t.clamp(0.0, 1.0));
    if let Some(b) = rig.bone_mut(bone) {
        b.rotation = quat_to_euler(mul_quat(euler_to_quat(b.rotation), *current));
    }
}

/// Idle gaze wander: picks a random point ahead of the avatar every few
/// seconds and drifts the head toward it, with matching eye expressions.
pub struct GazeMotion {
    interval: [f32; 2],
    timer: f32,
    next_shift: f32,
    target: Vec3,
    head: Quat,
    rng: Pcg32,
}

impl GazeMotion {
    pub fn new(interval: [f32; 2], rng: Pcg32) -> Self {
        Self {
            interval,
            timer: 0.0,
            next_shift: 0.0,
            target: [0.0, 1.5, 5.0],
            head: IDENTITY,
            rng,
        }
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    fn retarget(&mut self) {
        let x = (self.rng.gen::<f32>() - 0.5) * 3.0;
        let y = 1.3 + (self.rng.gen::<f32>() - 0.5) * 0.5;
        let z = 3.0 + self.rng.gen::<f32>() * 2.0;
        self.target = [x, y, z];
    }
}

impl Motion for GazeMotion {
    fn update(&mut self, rig: &mut dyn Rig, _elapsed: f32, dt: f32) {
        self.timer += dt;
        if self.timer >= self.next_shift {
            self.retarget();
            self.next_shift = self.timer + draw_interval(&mut self.rng, self.interval);
        }

        let origin = origin_of(rig, HumanoidBone::Head);
        let want = facing(origin, self.target);
        drive(rig, HumanoidBone::Head, &mut self.head, want, dt * 2.0);

        let [dx, _, dz] = vector::sub(self.target, origin);
        let horizontal = dx.atan2(dz).clamp(-FRAC_PI_6, FRAC_PI_6);
        let weight = horizontal.abs() / FRAC_PI_6 * 0.5;
        if horizontal > 0.0 {
            rig.set_expression("lookRight", weight);
            rig.set_expression("lookLeft", 0.0);
        } else {
            rig.set_expression("lookLeft", weight);
            rig.set_expression("lookRight", 0.0);
        }
    }

    fn on_start(&mut self, _rig: &mut dyn Rig) {
        self.timer = 0.0;
        self.next_shift = draw_interval(&mut self.rng, self.interval);
    }

    fn on_end(&mut self, rig: &mut dyn Rig) {
        rig.set_expression("lookLeft", 0.0);
        rig.set_expression("lookRight", 0.0);
    }
}

/// Gaze generator on the gesture layer, priority 5.
pub fn gaze(interval: [f32; 2], rng: Pcg32) -> ProceduralAnimation {
    ProceduralAnimation::new(
        "auto_gaze",
        AnimationLayer::Gesture,
        5,
        GazeMotion::new(interval, rng),
    )
    .looping(true)
}

const LOOK_AT_SECS: f32 = 2.0;
const LOOK_AT_RAMP_SECS: f32 = 0.5;

/// Turns head and neck toward a fixed world point.
pub struct LookAtMotion {
    target: Vec3,
    smooth: bool,
    head: Quat,
    neck: Quat,
}

impl LookAtMotion {
    pub fn new(target: Vec3, smooth: bool) -> Self {
        Self {
            target,
            smooth,
            head: IDENTITY,
            neck: IDENTITY,
        }
    }
}

impl Motion for LookAtMotion {
    fn update(&mut self, rig: &mut dyn Rig, elapsed: f32, dt: f32) {
        let alpha = if self.smooth {
            (elapsed / LOOK_AT_RAMP_SECS).min(1.0)
        } else {
            1.0
        };
        let head_want = facing(origin_of(rig, HumanoidBone::Head), self.target);
        let neck_want = facing(origin_of(rig, HumanoidBone::Neck), self.target);
        drive(rig, HumanoidBone::Head, &mut self.head, head_want, alpha * dt * 5.0);
        drive(rig, HumanoidBone::Neck, &mut self.neck, neck_want, alpha * dt * 3.0);
    }

    fn on_start(&mut self, _rig: &mut dyn Rig) {
        self.head = IDENTITY;
        self.neck = IDENTITY;
    }
}

/// Two-second look toward `target` on the gesture layer, priority 15.
pub fn look_at(target: Vec3, smooth: bool) -> ProceduralAnimation {
    ProceduralAnimation::new(
        "look_at_target",
        AnimationLayer::Gesture,
        15,
        LookAtMotion::new(target, smooth),
    )
    .with_duration(LOOK_AT_SECS)
}
