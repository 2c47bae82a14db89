//! Closest-hit ray query tests

use super::{attach, translated_cube_scene, unit_cube};
use crate::config::{HitDistance, SceneConfig};
use crate::foundation::math::{Affine, AffineExt, Point3, Vec3};
use crate::geometry::Ray;
use crate::scene::{RayQueryStats, Scene, SceneError};
use crate::shapes::Sphere;
use approx::assert_relative_eq;

const EPSILON: f32 = 1e-4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translated_cube_hit() {
        let (scene, a, element) = translated_cube_scene();
        let ray = Ray::new(Point3::new(5.0, 0.0, -10.0), Vec3::z());

        let hit = scene.intersect_ray(&ray).expect("ray should hit A's cube");

        assert_eq!(hit.node, a);
        assert_eq!(hit.element, element);
        assert_eq!(hit.shape, 0);
        assert_relative_eq!(hit.point, Point3::new(5.0, 0.0, -1.0), epsilon = EPSILON);
        assert_relative_eq!(hit.normal, Vec3::new(0.0, 0.0, -1.0), epsilon = EPSILON);
        assert_relative_eq!(hit.t, 9.0, epsilon = EPSILON);
    }

    #[test]
    fn test_missing_root_box_prunes_everything() {
        let (scene, _, _) = translated_cube_scene();
        let ray = Ray::new(Point3::new(0.0, 10.0, -10.0), Vec3::z());

        let mut stats = RayQueryStats::default();
        assert!(scene.intersect_ray_with_stats(&ray, &mut stats).is_none());
        assert_eq!(
            stats,
            RayQueryStats {
                nodes_visited: 1,
                nodes_pruned: 1,
                elements_tested: 0,
            }
        );
    }

    #[test]
    fn test_degenerate_ray_misses_without_panicking() {
        let (scene, _, _) = translated_cube_scene();
        let degenerate = [
            Ray {
                origin: Point3::new(5.0, 0.0, -10.0),
                direction: Vec3::repeat(f32::NAN),
            },
            Ray {
                origin: Point3::new(5.0, 0.0, 0.0),
                direction: Vec3::zeros(),
            },
        ];

        for ray in &degenerate {
            let mut stats = RayQueryStats::default();
            assert!(scene.intersect_ray_with_stats(ray, &mut stats).is_none());
            assert_eq!(stats.nodes_pruned, 1, "root box rejects {ray:?}");
            assert!(!scene.bbox(scene.root()).expect("root").hit_by(ray));
        }
    }

    #[test]
    fn test_sibling_boxes_prune_independently() {
        let mut scene = Scene::new();
        let root = scene.root();
        let near = scene.create_node();
        let far = scene.create_node();
        scene.insert_child(root, near).expect("insert near");
        scene.insert_child(root, far).expect("insert far");
        scene
            .set_transformation(near, Affine::from_translation(Vec3::new(0.0, 0.0, 5.0)))
            .expect("invertible");
        scene
            .set_transformation(far, Affine::from_translation(Vec3::new(0.0, 20.0, 5.0)))
            .expect("invertible");
        attach(&mut scene, near, vec![unit_cube()]);
        attach(&mut scene, far, vec![unit_cube()]);

        let mut stats = RayQueryStats::default();
        let hit = scene
            .intersect_ray_with_stats(&Ray::new(Point3::origin(), Vec3::z()), &mut stats)
            .expect("ray should hit the near cube");

        assert_eq!(hit.node, near);
        assert_relative_eq!(hit.t, 4.0, epsilon = EPSILON);
        assert_eq!(stats.nodes_visited, 3);
        assert_eq!(stats.nodes_pruned, 1);
        assert_eq!(stats.elements_tested, 1);
    }

    #[test]
    fn test_closest_of_nested_hits_wins() {
        let mut scene = Scene::new();
        let root = scene.root();
        let back = scene.create_node();
        let front = scene.create_node();
        scene.insert_child(root, back).expect("insert back");
        scene.insert_child(back, front).expect("insert front");
        scene
            .set_transformation(back, Affine::from_translation(Vec3::new(0.0, 0.0, 10.0)))
            .expect("invertible");
        scene
            .set_transformation(front, Affine::from_translation(Vec3::new(0.0, 0.0, -6.0)))
            .expect("invertible");
        attach(&mut scene, back, vec![unit_cube()]);
        attach(&mut scene, front, vec![unit_cube()]);

        let hit = scene
            .intersect_ray(&Ray::new(Point3::origin(), Vec3::z()))
            .expect("ray should hit");

        assert_eq!(hit.node, front);
        assert_relative_eq!(hit.point, Point3::new(0.0, 0.0, 3.0), epsilon = EPSILON);
        assert_relative_eq!(hit.t, 3.0, epsilon = EPSILON);
    }

    #[test]
    fn test_equal_distance_keeps_first_element() {
        let (mut scene, a, first) = translated_cube_scene();
        let second = attach(&mut scene, a, vec![unit_cube()]);

        let hit = scene
            .intersect_ray(&Ray::new(Point3::new(5.0, 0.0, -10.0), Vec3::z()))
            .expect("ray should hit");

        assert_eq!(hit.element, first);
        assert_ne!(hit.element, second);
    }

    #[test]
    fn test_rotated_node_reports_parent_frame_hit() {
        let mut scene = Scene::new();
        let spinner = scene.create_node();
        scene.insert_child(scene.root(), spinner).expect("insert");
        scene
            .set_transformation(spinner, Affine::from_axis_angle(Vec3::z(), std::f32::consts::FRAC_PI_2))
            .expect("invertible");
        attach(&mut scene, spinner, vec![Sphere::new(Vec3::new(3.0, 0.0, 0.0), 1.0).into()]);

        let hit = scene
            .intersect_ray(&Ray::new(Point3::new(0.0, 3.0, -10.0), Vec3::z()))
            .expect("ray should hit the rotated sphere");

        assert_relative_eq!(hit.point, Point3::new(0.0, 3.0, -1.0), epsilon = EPSILON);
        assert_relative_eq!(hit.normal, Vec3::new(0.0, 0.0, -1.0), epsilon = EPSILON);
        assert_relative_eq!(hit.t, 9.0, epsilon = EPSILON);
    }

    #[test]
    fn test_nonuniform_scale_normal_uses_inverse_transpose() {
        // Unit sphere stretched to the ellipsoid x^2/4 + y^2 + z^2 = 1
        let mut scene = Scene::new();
        let ellipsoid = scene.create_node();
        scene.insert_child(scene.root(), ellipsoid).expect("insert");
        scene
            .set_transformation(ellipsoid, Affine::from_nonuniform_scale(Vec3::new(2.0, 1.0, 1.0)))
            .expect("invertible");
        attach(&mut scene, ellipsoid, vec![Sphere::new(Vec3::zeros(), 1.0).into()]);

        // Approach the surface point along its true normal
        let surface = Point3::new(2.0_f32.sqrt(), 0.5_f32.sqrt(), 0.0);
        let normal = Vec3::new(1.0, 2.0, 0.0).normalize();
        let ray = Ray::new(surface + normal * 5.0, -normal);

        let hit = scene.intersect_ray(&ray).expect("ray should hit the ellipsoid");

        assert_relative_eq!(hit.point, surface, epsilon = EPSILON);
        assert_relative_eq!(hit.normal, normal, epsilon = EPSILON);
        assert_relative_eq!(hit.t, 5.0, epsilon = EPSILON);
    }

    #[test]
    fn test_hit_distance_modes() {
        let build = |hit_distance: HitDistance, scale: Vec3| {
            let mut scene = Scene::with_config(SceneConfig {
                hit_distance,
                ..SceneConfig::default()
            });
            let node = scene.create_node();
            scene.insert_child(scene.root(), node).expect("insert");
            scene
                .set_transformation(node, Affine::from_nonuniform_scale(scale))
                .expect("invertible");
            attach(&mut scene, node, vec![unit_cube()]);
            scene
        };
        let ray = Ray::new(Point3::new(0.0, 0.0, -20.0), Vec3::z());
        let t = |scene: &Scene| scene.intersect_ray(&ray).expect("ray should hit").t;

        // Uniform scale: both modes agree
        let uniform = Vec3::repeat(2.0);
        assert_relative_eq!(t(&build(HitDistance::Exact, uniform)), 18.0, epsilon = EPSILON);
        assert_relative_eq!(t(&build(HitDistance::ScaleFactor, uniform)), 18.0, epsilon = EPSILON);

        // Stretched along the ray: only the exact mode measures the real distance
        let stretched = Vec3::new(1.0, 1.0, 8.0);
        assert_relative_eq!(t(&build(HitDistance::Exact, stretched)), 12.0, epsilon = EPSILON);
        assert_relative_eq!(t(&build(HitDistance::ScaleFactor, stretched)), 3.0, epsilon = EPSILON);
    }

    #[test]
    fn test_query_sees_moved_node() {
        let (mut scene, a, _) = translated_cube_scene();
        let ray = Ray::new(Point3::new(-5.0, 0.0, -10.0), Vec3::z());
        assert!(scene.intersect_ray(&ray).is_none());

        scene
            .set_transformation(a, Affine::from_translation(Vec3::new(-5.0, 0.0, 0.0)))
            .expect("invertible");

        let hit = scene.intersect_ray(&ray).expect("moved cube should be hit");
        assert_relative_eq!(hit.point, Point3::new(-5.0, 0.0, -1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_intersect_node_queries_a_subtree() {
        let (mut scene, a, _) = translated_cube_scene();

        // Ray in A's parent frame, which is the root's local frame
        let ray = Ray::new(Point3::new(5.0, 0.0, 10.0), -Vec3::z());
        let hit = scene.intersect_node(a, &ray).expect("A exists").expect("ray should hit");
        assert_relative_eq!(hit.point, Point3::new(5.0, 0.0, 1.0), epsilon = EPSILON);
        assert_relative_eq!(hit.normal, Vec3::z(), epsilon = EPSILON);

        let miss = Ray::new(Point3::new(0.0, 0.0, 10.0), -Vec3::z());
        assert!(scene.intersect_node(a, &miss).expect("A exists").is_none());

        scene.destroy_node(a).expect("destroy");
        assert!(matches!(scene.intersect_node(a, &ray), Err(SceneError::NodeNotFound(_))));
    }
}
