//! Rays with unit direction

use crate::foundation::math::{Affine, Point3, Vec3};

/// Half-line `origin + t * direction`, `t >= 0`
///
/// The direction is kept at unit length so that `t` is a distance in the
/// frame the ray is expressed in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start point
    pub origin: Point3,
    /// Unit direction
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray, normalizing `direction`
    ///
    /// `direction` must be non-zero and finite; use [`Ray::try_new`] for
    /// directions that come from outside the program.
    pub fn new(origin: Point3, direction: Vec3) -> Self {
        debug_assert!(direction.norm_squared() > 0.0, "ray direction must be non-zero");
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Create a ray, or `None` when `direction` cannot be normalized or
    /// either input is not finite
    pub fn try_new(origin: Point3, direction: Vec3) -> Option<Self> {
        if !origin.coords.iter().all(|c| c.is_finite()) || !direction.iter().all(|c| c.is_finite()) {
            return None;
        }
        let direction = direction.try_normalize(f32::EPSILON)?;
        Some(Self { origin, direction })
    }

    /// True when the origin is finite and the direction is finite and non-zero
    pub fn is_valid(&self) -> bool {
        self.origin.coords.iter().all(|c| c.is_finite())
            && self.direction.iter().all(|c| c.is_finite())
            && self.direction.norm_squared() > 0.0
    }

    /// Create a ray from `origin` through `target`
    pub fn through(origin: Point3, target: Point3) -> Self {
        Self::new(origin, target - origin)
    }

    /// Point at distance `t` along the ray
    pub fn at(&self, t: f32) -> Point3 {
        self.origin + self.direction * t
    }

    /// Signed distance along the ray of the projection of `point`
    pub fn parameter_of(&self, point: &Point3) -> f32 {
        (*point - self.origin).dot(&self.direction)
    }

    /// Express the ray in the frame `transform` maps into
    pub fn transformed(&self, transform: &Affine) -> Self {
        Self {
            origin: transform.transform_point(&self.origin),
            direction: transform.transform_vector(&self.direction).normalize(),
        }
    }
}

impl std::fmt::Display for Ray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Ray(origin: ({}, {}, {}), direction: ({}, {}, {}))",
            self.origin.x, self.origin.y, self.origin.z, self.direction.x, self.direction.y, self.direction.z
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::AffineExt;
    use approx::assert_relative_eq;

    #[test]
    fn test_direction_is_normalized() {
        let ray = Ray::new(Point3::origin(), Vec3::new(0.0, 3.0, 4.0));
        assert_relative_eq!(ray.direction.norm(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(ray.at(5.0), Point3::new(0.0, 3.0, 4.0), epsilon = 1e-5);
    }

    #[test]
    fn test_transform_into_scaled_frame() {
        let ray = Ray::new(Point3::new(0.0, 0.0, -10.0), Vec3::z());
        let halve = Affine::from_uniform_scale(0.5);
        let local = ray.transformed(&halve);

        assert_relative_eq!(local.origin, Point3::new(0.0, 0.0, -5.0), epsilon = 1e-6);
        assert_relative_eq!(local.direction, Vec3::z(), epsilon = 1e-6);
        assert_relative_eq!(local.parameter_of(&Point3::origin()), 5.0, epsilon = 1e-6);
    }

    #[test]
    fn test_through_points_at_target() {
        let ray = Ray::through(Point3::new(1.0, 1.0, 1.0), Point3::new(1.0, 1.0, 4.0));
        assert_relative_eq!(ray.direction, Vec3::z(), epsilon = 1e-6);
        assert_relative_eq!(ray.parameter_of(&Point3::new(1.0, 1.0, 4.0)), 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_degenerate_directions_are_rejected() {
        let origin = Point3::new(5.0, 0.0, -10.0);
        assert!(Ray::try_new(origin, Vec3::zeros()).is_none());
        assert!(Ray::try_new(origin, Vec3::new(f32::NAN, 0.0, 1.0)).is_none());
        assert!(Ray::try_new(Point3::new(f32::INFINITY, 0.0, 0.0), Vec3::z()).is_none());

        let ray = Ray::try_new(origin, Vec3::new(0.0, 0.0, 2.0)).expect("valid direction");
        assert!(ray.is_valid());
        assert_relative_eq!(ray.direction, Vec3::z(), epsilon = 1e-6);

        let degenerate = Ray {
            origin,
            direction: Vec3::zeros(),
        };
        assert!(!degenerate.is_valid());
    }
}
