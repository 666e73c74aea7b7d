//! # engine_math
//!
//! Math types for the component runtime. Re-exports [`glam`] for linear
//! algebra and defines [`Transform`], the spatial root every object carries.

pub mod transform;

// Re-export glam types for convenience.
pub use glam::{EulerRot, Mat3, Mat4, Quat, Vec2, Vec3, Vec4};

pub use transform::Transform;
