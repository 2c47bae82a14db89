//! Ordered tree traversal for renderers and serializers
//!
//! The walk visits a node, its elements in list order, then its children in
//! list order. A renderer pushes the node's local transform in
//! [`SceneVisitor::enter_node`] and pops it in [`SceneVisitor::exit_node`];
//! [`TransformStack`] does the bookkeeping.

use crate::foundation::collections::{ElementKey, NodeKey};
use crate::foundation::math::Affine;
use crate::scene::{Scene, SceneElement, SceneError, SceneNode};

/// Callbacks driven by [`Scene::walk`]
pub trait SceneVisitor {
    /// Called when entering a node (before its elements and children)
    ///
    /// Returns true to visit the node's elements and children, false to
    /// skip them. [`SceneVisitor::exit_node`] is called either way.
    fn enter_node(&mut self, key: NodeKey, node: &SceneNode) -> bool;

    /// Called for each element of an entered node
    fn visit_element(&mut self, key: ElementKey, element: &SceneElement);

    /// Called when leaving a node
    fn exit_node(&mut self, key: NodeKey, node: &SceneNode);
}

/// Stack of accumulated local-to-world transforms
#[derive(Debug, Clone)]
pub struct TransformStack {
    stack: Vec<Affine>,
}

impl Default for TransformStack {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformStack {
    /// Stack holding only the identity
    pub fn new() -> Self {
        Self {
            stack: vec![Affine::identity()],
        }
    }

    /// Compose `local` onto the current transform
    pub fn push(&mut self, local: &Affine) {
        let composed = self.current() * local;
        self.stack.push(composed);
    }

    /// Drop the innermost transform. The base identity is never popped.
    pub fn pop(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    /// Accumulated transform
    pub fn current(&self) -> &Affine {
        // Never empty: the base identity is never popped
        &self.stack[self.stack.len() - 1]
    }

    /// Number of pushed transforms
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }
}

impl Scene {
    /// Walk the subtree under `node` in draw order
    pub fn walk<V: SceneVisitor>(&self, node: NodeKey, visitor: &mut V) -> Result<(), SceneError> {
        let node_ref = self.node_ref(node)?;
        self.walk_node(node, node_ref, visitor);
        Ok(())
    }

    pub(crate) fn walk_node<V: SceneVisitor>(&self, key: NodeKey, node: &SceneNode, visitor: &mut V) {
        if visitor.enter_node(key, node) {
            for &element_key in &node.elements {
                if let Some(element) = self.elements.get(element_key) {
                    visitor.visit_element(element_key, element);
                }
            }
            for &child_key in &node.children {
                if let Some(child) = self.nodes.get(child_key) {
                    self.walk_node(child_key, child, visitor);
                }
            }
        }
        visitor.exit_node(key, node);
    }

    /// Every element under the root with its local-to-world transform, in
    /// draw order
    pub fn world_elements(&self) -> Vec<(ElementKey, Affine)> {
        let mut collector = WorldElementCollector::default();
        if let Some(root) = self.nodes.get(self.root) {
            self.walk_node(self.root, root, &mut collector);
        }
        collector.elements
    }
}

#[derive(Default)]
struct WorldElementCollector {
    transforms: TransformStack,
    elements: Vec<(ElementKey, Affine)>,
}

impl SceneVisitor for WorldElementCollector {
    fn enter_node(&mut self, _key: NodeKey, node: &SceneNode) -> bool {
        self.transforms.push(node.transformation());
        true
    }

    fn visit_element(&mut self, key: ElementKey, _element: &SceneElement) {
        self.elements.push((key, *self.transforms.current()));
    }

    fn exit_node(&mut self, _key: NodeKey, _node: &SceneNode) {
        self.transforms.pop();
    }
}
