//! Rotation conversions.
//!
//! Euler angles use the intrinsic XYZ order (the order a humanoid rig's local
//! `rotation.{x,y,z}` is usually authored in). Quaternions are `[x, y, z, w]`.

use crate::blend::normalize_quat;
use crate::vector::{cross, dot, Vec3};

pub type EulerXyz = [f32; 3];
pub type Quat = [f32; 4];

pub const IDENTITY: Quat = [0.0, 0.0, 0.0, 1.0];

/// Euler (XYZ) to quaternion.
pub fn euler_to_quat(e: EulerXyz) -> Quat {
    let (s1, c1) = (e[0] * 0.5).sin_cos();
    let (s2, c2) = (e[1] * 0.5).sin_cos();
    let (s3, c3) = (e[2] * 0.5).sin_cos();
    [
        s1 * c2 * c3 + c1 * s2 * s3,
        c1 * s2 * c3 - s1 * c2 * s3,
        c1 * c2 * s3 + s1 * s2 * c3,
        c1 * c2 * c3 - s1 * s2 * s3,
    ]
}

/// Quaternion to Euler (XYZ). Near gimbal lock the Z angle is folded into X.
pub fn quat_to_euler(q: Quat) -> EulerXyz {
    let [x, y, z, w] = normalize_quat(q);
    let m11 = 1.0 - 2.0 * (y * y + z * z);
    let m12 = 2.0 * (x * y - w * z);
    let m13 = 2.0 * (x * z + w * y);
    let m22 = 1.0 - 2.0 * (x * x + z * z);
    let m23 = 2.0 * (y * z - w * x);
    let m32 = 2.0 * (y * z + w * x);
    let m33 = 1.0 - 2.0 * (x * x + y * y);

    let ey = m13.clamp(-1.0, 1.0).asin();
    if m13.abs() < 0.999_999 {
        [(-m23).atan2(m33), ey, (-m12).atan2(m11)]
    } else {
        [m32.atan2(m22), ey, 0.0]
    }
}

/// Hamilton product `a * b`: applies `b`, then `a`.
pub fn mul_quat(a: Quat, b: Quat) -> Quat {
    let [ax, ay, az, aw] = a;
    let [bx, by, bz, bw] = b;
    [
        aw * bx + ax * bw + ay * bz - az * by,
        aw * by - ax * bz + ay * bw + az * bx,
        aw * bz + ax * by - ay * bx + az * bw,
        aw * bw - ax * bx - ay * by - az * bz,
    ]
}

/// Shortest rotation taking unit vector `from` onto unit vector `to`.
pub fn quat_from_unit_vectors(from: Vec3, to: Vec3) -> Quat {
    let r = dot(from, to) + 1.0;
    if r < f32::EPSILON {
        // Opposite vectors: rotate 180 degrees about any perpendicular axis.
        if from[0].abs() > from[2].abs() {
            normalize_quat([-from[1], from[0], 0.0, 0.0])
        } else {
            normalize_quat([0.0, -from[2], from[1], 0.0])
        }
    } else {
        let c = cross(from, to);
        normalize_quat([c[0], c[1], c[2], r])
    }
}
