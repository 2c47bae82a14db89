//! Math utilities and types
//!
//! Provides the nalgebra aliases used by the scene graph together with a
//! TRS transform value type and an extension trait for affine transforms.

pub use nalgebra::{Matrix3, Matrix4, Quaternion, Unit, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Affine transform mapping a node's local frame into its parent's frame
pub type Affine = nalgebra::Affine3<f32>;

/// Transform representing position, rotation, and scale
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

    /// Create a transform from a translation vector
    pub fn from_translation(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform from Euler angles (radians, XYZ order)
    pub fn from_euler(position: Vec3, euler: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::from_euler_angles(euler.x, euler.y, euler.z),
            scale,
        }
    }

    /// Convert to a transformation matrix (TRS order)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Convert to an affine transform (TRS order)
    pub fn to_affine(&self) -> Affine {
        Affine::from_matrix_unchecked(self.to_matrix())
    }
}

/// Extension trait for [`Affine`] with the operations the scene graph needs
pub trait AffineExt {
    /// Pure translation
    fn from_translation(offset: Vec3) -> Affine;

    /// Uniform scale about the origin
    fn from_uniform_scale(factor: f32) -> Affine;

    /// Per-axis scale about the origin
    fn from_nonuniform_scale(factors: Vec3) -> Affine;

    /// Rotation about `axis` by `angle` radians
    fn from_axis_angle(axis: Vec3, angle: f32) -> Affine;

    /// Upper-left 3x3 block
    fn linear_part(&self) -> Mat3;

    /// Scalar scale of the transform: cube root of the absolute determinant
    /// of the linear part. Exact for uniform scale, an average otherwise.
    fn scale_factor(&self) -> f32;

    /// Transform a surface normal with the inverse transpose of the linear
    /// part and renormalize. Falls back to the untransformed normal when the
    /// linear part is singular.
    fn transform_normal(&self, normal: &Vec3) -> Vec3;
}

impl AffineExt for Affine {
    fn from_translation(offset: Vec3) -> Affine {
        Affine::from_matrix_unchecked(Mat4::new_translation(&offset))
    }

    fn from_uniform_scale(factor: f32) -> Affine {
        Affine::from_matrix_unchecked(Mat4::new_scaling(factor))
    }

    fn from_nonuniform_scale(factors: Vec3) -> Affine {
        Affine::from_matrix_unchecked(Mat4::new_nonuniform_scaling(&factors))
    }

    fn from_axis_angle(axis: Vec3, angle: f32) -> Affine {
        let axis = Unit::new_normalize(axis);
        Affine::from_matrix_unchecked(Mat4::from_axis_angle(&axis, angle))
    }

    fn linear_part(&self) -> Mat3 {
        self.matrix().fixed_view::<3, 3>(0, 0).into_owned()
    }

    fn scale_factor(&self) -> f32 {
        self.linear_part().determinant().abs().cbrt()
    }

    fn transform_normal(&self, normal: &Vec3) -> Vec3 {
        let Some(inverse) = self.linear_part().try_inverse() else {
            return *normal;
        };
        let transformed = inverse.transpose() * normal;
        transformed.try_normalize(f32::EPSILON).unwrap_or(*normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_trs_matches_manual_composition() {
        let transform = Transform::from_euler(
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0),
            Vec3::new(2.0, 2.0, 2.0),
        );
        let affine = transform.to_affine();

        // Scale, then rotate X onto -Z, then translate
        let point = affine.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(point, Point3::new(1.0, 2.0, 1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_identity_and_translation_constructors() {
        assert_eq!(Transform::identity().to_affine(), Affine::identity());

        let offset = Transform::from_translation(Vec3::new(1.0, -2.0, 3.0)).to_affine();
        assert_relative_eq!(
            offset.transform_point(&Point3::origin()),
            Point3::new(1.0, -2.0, 3.0),
            epsilon = EPSILON
        );
        assert_relative_eq!(offset.transform_vector(&Vec3::x()), Vec3::x(), epsilon = EPSILON);
    }

    #[test]
    fn test_scale_factor() {
        assert_relative_eq!(Affine::identity().scale_factor(), 1.0, epsilon = EPSILON);
        assert_relative_eq!(Affine::from_uniform_scale(3.0).scale_factor(), 3.0, epsilon = EPSILON);
        assert_relative_eq!(
            Affine::from_nonuniform_scale(Vec3::new(1.0, 2.0, 4.0)).scale_factor(),
            2.0,
            epsilon = EPSILON
        );
        assert_relative_eq!(
            Affine::from_translation(Vec3::new(9.0, -3.0, 1.0)).scale_factor(),
            1.0,
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_normal_uses_inverse_transpose() {
        // Squash along X: a 45 degree plane normal must tilt toward X, not away
        let squash = Affine::from_nonuniform_scale(Vec3::new(0.5, 1.0, 1.0));
        let normal = Vec3::new(1.0, 1.0, 0.0).normalize();

        let transformed = squash.transform_normal(&normal);
        let naive = squash.transform_vector(&normal).normalize();

        assert_relative_eq!(transformed, Vec3::new(2.0, 1.0, 0.0).normalize(), epsilon = EPSILON);
        assert!((transformed - naive).norm() > 0.1, "naive vector transform should differ");

        // The transformed normal stays perpendicular to a transformed tangent
        let tangent = Vec3::new(1.0, -1.0, 0.0);
        assert_relative_eq!(transformed.dot(&squash.transform_vector(&tangent)), 0.0, epsilon = EPSILON);
    }

    #[test]
    fn test_rotation_keeps_normals_rigid() {
        let rotation = Affine::from_axis_angle(Vec3::z(), std::f32::consts::FRAC_PI_2);
        let normal = rotation.transform_normal(&Vec3::x());
        assert_relative_eq!(normal, Vec3::y(), epsilon = EPSILON);
    }
}
