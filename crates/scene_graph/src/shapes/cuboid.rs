use crate::foundation::math::{Point3, Vec3};
use crate::geometry::{Aabb, Ray};
use crate::shapes::ShapeHit;

/// Solid axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cuboid {
    /// Extent in the element's local frame
    pub bounds: Aabb,
}

impl Cuboid {
    /// Box spanning `min..=max`
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            bounds: Aabb::new(min, max),
        }
    }

    /// Box of half-size `extents` around `center`
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            bounds: Aabb::from_center_extents(center, extents),
        }
    }

    /// The box itself
    pub const fn bbox(&self) -> Aabb {
        self.bounds
    }

    /// Entry point of the ray, or the exit point when the ray starts strictly
    /// inside. A ray starting on the surface hits at `t = 0`.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<ShapeHit> {
        let (t_enter, t_exit) = self.bounds.intersect_ray(ray)?;
        let (min, max) = (self.bounds.min, self.bounds.max);
        let inside = (0..3).all(|i| ray.origin[i] > min[i] && ray.origin[i] < max[i]);
        let t = if inside { t_exit } else { t_enter };
        let point = ray.at(t);
        Some(ShapeHit {
            point,
            normal: self.face_normal(&point),
            t,
        })
    }

    /// Normal of the face closest to a point on the surface
    fn face_normal(&self, point: &Point3) -> Vec3 {
        let center = self.bounds.center();
        let extents = self.bounds.extents();
        let offset = point.coords - center;

        let mut axis = 0;
        let mut best = f32::NEG_INFINITY;
        for i in 0..3 {
            // Flat boxes have zero extent on some axis; that face wins outright
            let closeness = if extents[i] > 0.0 {
                offset[i].abs() / extents[i]
            } else {
                f32::INFINITY
            };
            if closeness > best {
                best = closeness;
                axis = i;
            }
        }

        let mut normal = Vec3::zeros();
        normal[axis] = if offset[axis] < 0.0 { -1.0 } else { 1.0 };
        normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_cube() -> Cuboid {
        Cuboid::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_hit_from_outside_reports_entry_face() {
        let ray = Ray::new(Point3::new(0.0, 0.0, -10.0), Vec3::z());
        let hit = unit_cube().intersect_ray(&ray).expect("ray should hit");

        assert_relative_eq!(hit.t, 9.0, epsilon = 1e-5);
        assert_relative_eq!(hit.point, Point3::new(0.0, 0.0, -1.0), epsilon = 1e-5);
        assert_relative_eq!(hit.normal, Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_hit_from_inside_reports_exit_face() {
        let ray = Ray::new(Point3::new(0.25, 0.0, 0.0), Vec3::y());
        let hit = unit_cube().intersect_ray(&ray).expect("ray starts inside");

        assert_relative_eq!(hit.t, 1.0, epsilon = 1e-5);
        assert_relative_eq!(hit.normal, Vec3::y());
    }

    #[test]
    fn test_ray_starting_on_face_hits_that_face() {
        let ray = Ray::new(Point3::new(0.0, 0.0, -1.0), Vec3::z());
        let hit = unit_cube().intersect_ray(&ray).expect("ray starts on the surface");

        assert_relative_eq!(hit.t, 0.0);
        assert_relative_eq!(hit.point, Point3::new(0.0, 0.0, -1.0));
        assert_relative_eq!(hit.normal, Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_center_extents_matches_corners() {
        let cuboid = Cuboid::from_center_extents(Vec3::new(2.0, 0.0, 0.0), Vec3::new(1.0, 0.5, 0.5));
        assert_eq!(cuboid, Cuboid::new(Vec3::new(1.0, -0.5, -0.5), Vec3::new(3.0, 0.5, 0.5)));

        let hit = cuboid
            .intersect_ray(&Ray::new(Point3::new(-4.0, 0.0, 0.0), Vec3::x()))
            .expect("ray should hit");
        assert_relative_eq!(hit.t, 5.0, epsilon = 1e-5);
        assert_relative_eq!(hit.normal, -Vec3::x());
    }

    #[test]
    fn test_miss() {
        let ray = Ray::new(Point3::new(3.0, 0.0, -10.0), Vec3::z());
        assert!(unit_cube().intersect_ray(&ray).is_none());
    }
}
