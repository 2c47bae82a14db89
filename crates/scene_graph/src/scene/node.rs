//! Scene nodes
//!
//! A node is a positioned subtree root: a local-to-parent transform, the
//! elements attached at that position and an ordered list of children.
//! Nodes are stored in the scene's arena and only mutated through
//! [`Scene`](crate::scene::Scene), which keeps the back-references and the
//! bounding box cache consistent.

use std::cell::Cell;

use crate::foundation::collections::{ElementKey, NodeKey};
use crate::foundation::math::Affine;
use crate::geometry::Aabb;

/// A node of the scene tree
#[derive(Debug, Clone)]
pub struct SceneNode {
    /// Position in the scene's flat registry, `None` while unregistered
    pub(crate) scene_index: Option<usize>,
    pub(crate) parent: Option<NodeKey>,
    /// Position in the parent's `children`
    pub(crate) parent_index: Option<usize>,
    pub(crate) children: Vec<NodeKey>,
    pub(crate) elements: Vec<ElementKey>,
    pub(crate) transformation: Affine,
    pub(crate) inverse_transformation: Affine,
    /// Parent-frame bounds of everything below this node; only meaningful
    /// while `bbox_dirty` is false
    pub(crate) bbox: Cell<Aabb>,
    pub(crate) bbox_dirty: Cell<bool>,
    pub(crate) name: Option<String>,
}

impl SceneNode {
    pub(crate) fn new(name: Option<String>) -> Self {
        Self {
            scene_index: None,
            parent: None,
            parent_index: None,
            children: Vec::new(),
            elements: Vec::new(),
            transformation: Affine::identity(),
            inverse_transformation: Affine::identity(),
            bbox: Cell::new(Aabb::empty()),
            bbox_dirty: Cell::new(true),
            name,
        }
    }

    /// Position in the scene registry, `None` if unregistered
    pub const fn scene_index(&self) -> Option<usize> {
        self.scene_index
    }

    /// True while registered with the scene
    pub const fn is_registered(&self) -> bool {
        self.scene_index.is_some()
    }

    /// Parent node
    pub const fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    /// Position in the parent's child list
    pub const fn parent_index(&self) -> Option<usize> {
        self.parent_index
    }

    /// Children in list order. The order is not preserved across removals.
    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    /// Attached elements
    pub fn elements(&self) -> &[ElementKey] {
        &self.elements
    }

    /// Local frame to parent frame
    pub const fn transformation(&self) -> &Affine {
        &self.transformation
    }

    /// Parent frame to local frame
    pub const fn inverse_transformation(&self) -> &Affine {
        &self.inverse_transformation
    }

    /// Display label
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// True when the cached box is current. Read the box itself through
    /// [`Scene::bbox`](crate::scene::Scene::bbox).
    pub fn bbox_is_valid(&self) -> bool {
        !self.bbox_dirty.get()
    }

    /// Mark the cached box stale. Returns whether it already was.
    pub(crate) fn mark_bbox_dirty(&self) -> bool {
        self.bbox.set(Aabb::empty());
        self.bbox_dirty.replace(true)
    }

    pub(crate) fn store_bbox(&self, bbox: Aabb) {
        self.bbox.set(bbox);
        self.bbox_dirty.set(false);
    }

    /// Cached box if current
    pub(crate) fn cached_bbox(&self) -> Option<Aabb> {
        if self.bbox_dirty.get() {
            None
        } else {
            Some(self.bbox.get())
        }
    }
}
