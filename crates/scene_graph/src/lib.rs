//! # Scene Graph
//!
//! A hierarchical scene graph with cached bounding boxes, affine transforms
//! and closest-hit ray queries.
//!
//! ## Features
//!
//! - **Node Hierarchy**: Arena-backed tree with checked structural mutation
//! - **Bounding Box Cache**: Eager invalidation, lazy recomputation
//! - **Ray Queries**: Box pruning with hits reported in the caller's frame
//! - **Traversal**: Ordered visitor walk for renderers
//! - **Persistence**: RON scene descriptions and TOML/RON configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_graph::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SceneConfig::load_from_file("scene.toml")?;
//!     let description = SceneDescription::load("scene.ron")?;
//!     let scene = Scene::from_description(&description, config)?;
//!
//!     let ray = Ray::new(Point3::new(0.0, 0.0, -10.0), Vec3::z());
//!     if let Some(hit) = scene.intersect_ray(&ray) {
//!         println!("hit {:?} at t = {}", hit.node, hit.t);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod geometry;
pub mod scene;
pub mod shapes;

/// Common imports for scene graph users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, HitDistance, SceneConfig},
        foundation::{
            collections::{ElementKey, NodeKey},
            math::{Affine, AffineExt, Point3, Transform, Vec3},
        },
        geometry::{Aabb, Ray},
        scene::{
            RayHit, RayQueryStats, Scene, SceneDescription, SceneElement, SceneError, SceneNode,
            SceneVisitor, TransformStack,
        },
        shapes::{Cuboid, Shape, Sphere},
    };
}
