//! Closest-hit ray queries
//!
//! A query enters a node with a ray in the node's parent frame, prunes on the
//! node's cached box, moves the ray into the local frame and tests elements
//! then children. The winning hit is carried back out through each
//! transform on the way up, so the caller gets it in the frame of the ray it
//! passed in.

use crate::config::HitDistance;
use crate::foundation::collections::{ElementKey, NodeKey};
use crate::foundation::math::{AffineExt, Point3, Vec3};
use crate::geometry::Ray;
use crate::scene::{Scene, SceneError, SceneNode};

/// Closest intersection found by a ray query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Node the hit element is attached to
    pub node: NodeKey,
    /// Hit element
    pub element: ElementKey,
    /// Index of the hit shape within the element
    pub shape: usize,
    /// Contact point in the query ray's frame
    pub point: Point3,
    /// Unit surface normal in the query ray's frame
    pub normal: Vec3,
    /// Distance along the query ray
    pub t: f32,
}

/// Work counters for a single query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RayQueryStats {
    /// Nodes whose bounding box was tested
    pub nodes_visited: usize,
    /// Nodes rejected by their bounding box (subtree skipped)
    pub nodes_pruned: usize,
    /// Element intersection tests performed
    pub elements_tested: usize,
}

impl Scene {
    /// Closest hit under the root for a ray in the root's parent frame
    pub fn intersect_ray(&self, ray: &Ray) -> Option<RayHit> {
        let mut stats = RayQueryStats::default();
        self.intersect_ray_with_stats(ray, &mut stats)
    }

    /// [`Scene::intersect_ray`], accumulating work counters into `stats`
    pub fn intersect_ray_with_stats(&self, ray: &Ray, stats: &mut RayQueryStats) -> Option<RayHit> {
        let root = self.nodes.get(self.root)?;
        self.intersect_subtree(self.root, root, ray, stats)
    }

    /// Closest hit under `node` for a ray in `node`'s parent frame
    ///
    /// A miss is `Ok(None)`; only an unknown key is an error.
    pub fn intersect_node(&self, node: NodeKey, ray: &Ray) -> Result<Option<RayHit>, SceneError> {
        let mut stats = RayQueryStats::default();
        self.intersect_node_with_stats(node, ray, &mut stats)
    }

    /// [`Scene::intersect_node`], accumulating work counters into `stats`
    pub fn intersect_node_with_stats(
        &self,
        node: NodeKey,
        ray: &Ray,
        stats: &mut RayQueryStats,
    ) -> Result<Option<RayHit>, SceneError> {
        let node_ref = self.node_ref(node)?;
        Ok(self.intersect_subtree(node, node_ref, ray, stats))
    }

    fn intersect_subtree(
        &self,
        key: NodeKey,
        node: &SceneNode,
        ray: &Ray,
        stats: &mut RayQueryStats,
    ) -> Option<RayHit> {
        stats.nodes_visited += 1;
        if !self.ensure_bbox(key).hit_by(ray) {
            stats.nodes_pruned += 1;
            return None;
        }

        let local_ray = ray.transformed(&node.inverse_transformation);
        let mut closest: Option<RayHit> = None;

        for &element_key in &node.elements {
            let Some(element) = self.elements.get(element_key) else {
                continue;
            };
            stats.elements_tested += 1;
            let Some(hit) = element.intersect_ray(&local_ray) else {
                continue;
            };
            if is_closer(closest.as_ref(), hit.hit.t) {
                closest = Some(RayHit {
                    node: key,
                    element: element_key,
                    shape: hit.shape,
                    point: hit.hit.point,
                    normal: hit.hit.normal,
                    t: hit.hit.t,
                });
            }
        }

        for &child_key in &node.children {
            let Some(child) = self.nodes.get(child_key) else {
                continue;
            };
            // Child hits come back in this node's local frame
            if let Some(hit) = self.intersect_subtree(child_key, child, &local_ray, stats) {
                if is_closer(closest.as_ref(), hit.t) {
                    closest = Some(hit);
                }
            }
        }

        let mut hit = closest?;
        let transformation = &node.transformation;
        let point = transformation.transform_point(&hit.point);
        hit.t = match self.config.hit_distance {
            HitDistance::Exact => ray.parameter_of(&point),
            HitDistance::ScaleFactor => hit.t * transformation.scale_factor(),
        };
        hit.point = point;
        hit.normal = transformation.transform_normal(&hit.normal);
        Some(hit)
    }
}

/// Strictly closer than the current best; ties keep the earlier hit
fn is_closer(best: Option<&RayHit>, t: f32) -> bool {
    best.map_or(true, |best| t < best.t)
}
