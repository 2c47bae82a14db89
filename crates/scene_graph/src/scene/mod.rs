//! Scene graph
//!
//! A [`Scene`] owns a tree of [`SceneNode`]s and the [`SceneElement`]s
//! attached to them. Each node carries a local-to-parent transform and a
//! cached bounding box in its parent's frame; the cache is invalidated
//! eagerly on every structural or transform change and recomputed lazily
//! on read. Ray queries descend the tree, pruning subtrees whose box the ray
//! misses, and return the closest hit in the caller's frame.
//!
//! # Example
//!
//! ```
//! use scene_graph::prelude::*;
//!
//! let mut scene = Scene::new();
//! let node = scene.create_named_node("crate");
//! scene.set_transformation(node, Affine::from_translation(Vec3::new(5.0, 0.0, 0.0)))?;
//! scene.insert_child(scene.root(), node)?;
//!
//! let element = scene.create_element(SceneElement::new(vec![
//!     Cuboid::new(Vec3::repeat(-1.0), Vec3::repeat(1.0)).into(),
//! ]));
//! scene.insert_element(node, element)?;
//!
//! let ray = Ray::new(Point3::new(5.0, 0.0, -10.0), Vec3::z());
//! let hit = scene.intersect_ray(&ray).expect("ray hits the box");
//! assert_eq!(hit.node, node);
//! # Ok::<(), SceneError>(())
//! ```

mod description;
mod element;
mod error;
mod graph;
mod invariants;
mod node;
mod query;
mod traversal;

#[cfg(test)]
mod tests;

pub use description::{
    ElementDescription, NodeDescription, SceneDescription, ShapeDescription, TransformDescription,
};
pub use element::{ElementHit, SceneElement};
pub use error::SceneError;
pub use graph::{Ancestors, Scene};
pub use node::SceneNode;
pub use query::{RayHit, RayQueryStats};
pub use traversal::{SceneVisitor, TransformStack};
