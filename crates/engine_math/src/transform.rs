//! Object transform.
//!
//! [`Transform`] is the position, rotation and scale of an object. Each object
//! owns exactly one and publishes it to its components through a property
//! port, so the operations here are all value-level: they never know which
//! object they belong to.

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position, rotation and per-axis scale in world space.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Transform {
    /// World-space position.
    pub position: Vec3,
    /// Rotation as a unit quaternion.
    pub rotation: Quat,
    /// Per-axis scale.
    pub scale: Vec3,
}

impl Transform {
    /// The identity transform: origin, no rotation, unit scale.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Create a transform at the given position with default rotation/scale.
    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Compute the 4×4 model matrix for this transform.
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Unit vector pointing along the local -Z axis.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Unit vector pointing along the local +Y axis.
    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Move by `offset` in world space.
    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }

    /// Apply an additional rotation given as XYZ Euler angles in radians.
    ///
    /// The new rotation is applied on top of the current one, so repeated
    /// calls accumulate.
    pub fn rotate_euler(&mut self, angles: Vec3) {
        let delta = Quat::from_euler(EulerRot::XYZ, angles.x, angles.y, angles.z);
        self.rotation = (delta * self.rotation).normalize();
    }

    /// Multiply the current scale component-wise.
    pub fn scale_by(&mut self, factor: Vec3) {
        self.scale *= factor;
    }

    /// Builder form of [`Transform::translate`].
    #[must_use]
    pub fn translated(mut self, offset: Vec3) -> Self {
        self.translate(offset);
        self
    }

    /// Builder form that replaces the scale.
    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_transform() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.scale, Vec3::ONE);
        assert_eq!(t.to_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn test_translate_accumulates() {
        let mut t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        t.translate(Vec3::new(-10.0, 4.0, -2.0));
        t.translate(Vec3::X);
        assert_eq!(t.position, Vec3::new(-8.0, 6.0, 1.0));
    }

    #[test]
    fn test_rotate_euler_turns_forward_vector() {
        let mut t = Transform::IDENTITY;
        t.rotate_euler(Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0));
        let forward = t.forward();
        assert!((forward - Vec3::NEG_X).length() < 1e-5, "got {forward:?}");
        assert!((t.up() - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_scale_by_is_per_axis() {
        let mut t = Transform::IDENTITY.with_scale(Vec3::new(20.0, 1.0, 20.0));
        t.scale_by(Vec3::new(0.5, 2.0, 1.0));
        assert_eq!(t.scale, Vec3::new(10.0, 2.0, 20.0));
    }

    #[test]
    fn test_matrix_places_origin_at_position() {
        let t = Transform::from_position(Vec3::new(0.0, -5.0, 0.0));
        let origin = t.to_matrix().transform_point3(Vec3::ZERO);
        assert_eq!(origin, Vec3::new(0.0, -5.0, 0.0));
    }

    #[test]
    fn test_deserialize_from_json() {
        let json = r#"{"position":[1.0,2.0,3.0],"rotation":[0.0,0.0,0.0,1.0],"scale":[1.0,1.0,1.0]}"#;
        let t: Transform = serde_json::from_str(json).unwrap();
        assert_eq!(t, Transform::from_position(Vec3::new(1.0, 2.0, 3.0)));
    }
}
