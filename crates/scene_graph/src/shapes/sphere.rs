use crate::foundation::math::Vec3;
use crate::geometry::{Aabb, Ray};
use crate::shapes::ShapeHit;

/// Solid sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// Center in the element's local frame
    pub center: Vec3,
    /// Radius, non-negative
    pub radius: f32,
}

impl Sphere {
    /// Sphere of `radius` around `center`
    pub const fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Tight axis-aligned box
    pub fn bbox(&self) -> Aabb {
        Aabb::from_center_extents(self.center, Vec3::repeat(self.radius))
    }

    /// Nearest root of `|o + t d - c|^2 = r^2` with `t >= 0`
    pub fn intersect_ray(&self, ray: &Ray) -> Option<ShapeHit> {
        let to_origin = ray.origin.coords - self.center;
        // Unit direction, so the quadratic's leading coefficient is 1
        let half_b = to_origin.dot(&ray.direction);
        let c = to_origin.norm_squared() - self.radius * self.radius;
        let discriminant = half_b * half_b - c;
        if discriminant < 0.0 {
            return None;
        }

        let root = discriminant.sqrt();
        let near = -half_b - root;
        let far = -half_b + root;
        let t = if near >= 0.0 {
            near
        } else if far >= 0.0 {
            far
        } else {
            return None;
        };

        let point = ray.at(t);
        let normal = (point.coords - self.center)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(|| -ray.direction);
        Some(ShapeHit { point, normal, t })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Point3;
    use approx::assert_relative_eq;

    #[test]
    fn test_hit_front_surface() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, 5.0), 2.0);
        let ray = Ray::new(Point3::origin(), Vec3::z());
        let hit = sphere.intersect_ray(&ray).expect("ray should hit");

        assert_relative_eq!(hit.t, 3.0, epsilon = 1e-5);
        assert_relative_eq!(hit.point, Point3::new(0.0, 0.0, 3.0), epsilon = 1e-5);
        assert_relative_eq!(hit.normal, -Vec3::z(), epsilon = 1e-5);
    }

    #[test]
    fn test_sphere_behind_ray_is_missed() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0);
        let ray = Ray::new(Point3::origin(), Vec3::z());
        assert!(sphere.intersect_ray(&ray).is_none());
    }

    #[test]
    fn test_bbox() {
        let sphere = Sphere::new(Vec3::new(1.0, 2.0, 3.0), 0.5);
        assert_eq!(sphere.bbox(), Aabb::new(Vec3::new(0.5, 1.5, 2.5), Vec3::new(1.5, 2.5, 3.5)));
    }
}
