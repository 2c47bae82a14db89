//! Leaf shapes carried by scene elements
//!
//! A closed set of analytic shapes. Each one answers two questions in its
//! own local frame: how big is it, and where does a ray first touch it.

mod cuboid;
mod sphere;

pub use cuboid::Cuboid;
pub use sphere::Sphere;

use crate::foundation::math::{Point3, Vec3};
use crate::geometry::{Aabb, Ray};

/// First contact between a ray and a shape, in the ray's frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeHit {
    /// Contact point
    pub point: Point3,
    /// Outward unit surface normal at `point`
    pub normal: Vec3,
    /// Distance along the ray
    pub t: f32,
}

/// Geometry attached to a scene element
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Solid axis-aligned box
    Cuboid(Cuboid),
    /// Solid sphere
    Sphere(Sphere),
}

impl Shape {
    /// Local-space bounding box
    pub fn bbox(&self) -> Aabb {
        match self {
            Self::Cuboid(cuboid) => cuboid.bbox(),
            Self::Sphere(sphere) => sphere.bbox(),
        }
    }

    /// Closest hit at `t >= 0`, if any
    pub fn intersect_ray(&self, ray: &Ray) -> Option<ShapeHit> {
        match self {
            Self::Cuboid(cuboid) => cuboid.intersect_ray(ray),
            Self::Sphere(sphere) => sphere.intersect_ray(ray),
        }
    }
}

impl From<Cuboid> for Shape {
    fn from(cuboid: Cuboid) -> Self {
        Self::Cuboid(cuboid)
    }
}

impl From<Sphere> for Shape {
    fn from(sphere: Sphere) -> Self {
        Self::Sphere(sphere)
    }
}
