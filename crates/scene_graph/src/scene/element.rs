//! Scene elements: leaf geometry attached to a node

use crate::foundation::collections::NodeKey;
use crate::geometry::{Aabb, Ray};
use crate::shapes::{Shape, ShapeHit};

/// First contact between a ray and an element, in the element's frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementHit {
    /// Index of the hit shape in [`SceneElement::shapes`]
    pub shape: usize,
    /// Contact point, normal and distance
    pub hit: ShapeHit,
}

/// Ordered shapes sharing one attachment point in the tree
///
/// Elements live in the scene's element arena. A node refers to them by key
/// and the element points back at that node.
#[derive(Debug, Clone, Default)]
pub struct SceneElement {
    pub(crate) shapes: Vec<Shape>,
    pub(crate) node: Option<NodeKey>,
    pub(crate) name: Option<String>,
}

impl SceneElement {
    /// Detached element holding `shapes`
    pub fn new(shapes: Vec<Shape>) -> Self {
        Self {
            shapes,
            node: None,
            name: None,
        }
    }

    /// Builder pattern: Set name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Shapes in insertion order
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Node this element is attached to
    pub const fn node(&self) -> Option<NodeKey> {
        self.node
    }

    /// Display label
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Union of the shapes' boxes, in the owning node's local frame
    pub fn bbox(&self) -> Aabb {
        self.shapes
            .iter()
            .fold(Aabb::empty(), |bbox, shape| bbox.union(&shape.bbox()))
    }

    /// Closest shape hit; ties go to the earlier shape
    pub fn intersect_ray(&self, ray: &Ray) -> Option<ElementHit> {
        let mut closest: Option<ElementHit> = None;
        for (index, shape) in self.shapes.iter().enumerate() {
            let Some(hit) = shape.intersect_ray(ray) else {
                continue;
            };
            if closest.map_or(true, |best| hit.t < best.hit.t) {
                closest = Some(ElementHit { shape: index, hit });
            }
        }
        closest
    }
}
