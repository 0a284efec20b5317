//! Math utilities and types
//!
//! Value types consumed by the scene graph. Vector and matrix primitives come
//! from `nalgebra`; [`Transform`] is the translate/rotate/scale triple every
//! entity carries.

pub use nalgebra::{Matrix3, Matrix4, Quaternion, Unit, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Local transform: position, rotation and scale
///
/// Transforms are plain values. Each entity owns its own copy; nothing is
/// shared between nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and scale
    pub fn from_position_scale(position: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            scale,
            ..Default::default()
        }
    }

    /// Offset the position
    pub fn translate(&mut self, delta: Vec3) -> &mut Self {
        self.position += delta;
        self
    }

    /// Apply an additional rotation after the current one
    pub fn rotate(&mut self, rotation: Quat) -> &mut Self {
        self.rotation = rotation * self.rotation;
        self
    }

    /// Apply an additional rotation given as Euler angles in radians
    pub fn rotate_euler(&mut self, roll: f32, pitch: f32, yaw: f32) -> &mut Self {
        self.rotate(Quat::from_euler_angles(roll, pitch, yaw))
    }

    /// Add to the scale factors
    pub fn scale_by(&mut self, delta: Vec3) -> &mut Self {
        self.scale += delta;
        self
    }

    /// Additive composition: positions and scales add, rotations compose
    ///
    /// `other.scale` is treated as a delta, so adding an identity transform
    /// adds one to every scale axis. Use [`Transform::zero_delta`] for a
    /// no-op delta.
    pub fn add(&mut self, other: &Transform) -> &mut Self {
        self.position += other.position;
        self.rotation = other.rotation * self.rotation;
        self.scale += other.scale;
        self
    }

    /// Delta transform that leaves a target unchanged under [`Transform::add`]
    pub fn zero_delta() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::zeros(),
        }
    }

    /// Flatten to a transformation matrix (T * R * S)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Apply this transform to a point
    pub fn transform_point(&self, point: Point3) -> Point3 {
        self.to_matrix().transform_point(&point)
    }

    /// Combine this transform with a child transform
    pub fn combine(&self, other: &Transform) -> Transform {
        Transform {
            position: self.position + self.rotation * (self.scale.component_mul(&other.position)),
            rotation: self.rotation * other.rotation,
            scale: self.scale.component_mul(&other.scale),
        }
    }

    /// Get the inverse transform
    pub fn inverse(&self) -> Transform {
        let inv_scale = Vec3::new(1.0 / self.scale.x, 1.0 / self.scale.y, 1.0 / self.scale.z);
        let inv_rotation = self.rotation.inverse();
        let inv_position = inv_rotation * (-self.position.component_mul(&inv_scale));

        Transform {
            position: inv_position,
            rotation: inv_rotation,
            scale: inv_scale,
        }
    }
}
