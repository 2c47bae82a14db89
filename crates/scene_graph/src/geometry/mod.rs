//! Geometric primitives
//!
//! Immutable value types the scene graph is built on: bounding boxes and
//! rays, with the transform and intersection helpers the node tree needs.

mod aabb;
mod ray;

pub use aabb::Aabb;
pub use ray::Ray;
