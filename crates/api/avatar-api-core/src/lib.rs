//! avatar-api-core: small engine-agnostic math helpers (core, no host types)
//!
//! Every crate in the workspace speaks plain arrays: `[f32; 3]` for vectors and
//! Euler angles (XYZ order, radians), `[f32; 4]` for quaternions (x, y, z, w).
//! Hosts convert to their own math types at the boundary.

pub mod blend;
pub mod rotation;
pub mod vector;

pub use blend::{lerp_array, lerp_f, normalize_quat, slerp};
pub use rotation::{
    euler_to_quat, mul_quat, quat_from_unit_vectors, quat_to_euler, EulerXyz, Quat, IDENTITY,
};
pub use vector::Vec3;
