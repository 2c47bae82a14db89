//! Scene ownership, registry and structural mutation
//!
//! The scene owns every node and element in two arenas. Tree edges are keys:
//! `children` is the owning direction, `parent` and the element's `node` are
//! back-references. All mutation goes through [`Scene`] so that both
//! directions, the registry indices and the bounding box cache stay in sync.

use crate::config::SceneConfig;
use crate::foundation::collections::{ElementArena, ElementKey, NodeArena, NodeKey};
use crate::foundation::math::Affine;
use crate::geometry::Aabb;
use crate::scene::{SceneElement, SceneError, SceneNode};
use crate::shapes::Shape;

/// Log a rejected precondition and hand the error back
fn rejected(error: SceneError) -> SceneError {
    log::warn!("Rejected scene operation: {error}");
    error
}

/// Owner of a node tree and its elements
///
/// A new scene holds a single registered root node. Cached bounding boxes
/// use interior mutability so they can be refreshed during `&self` queries;
/// as a consequence the scene is `Send` but not `Sync`.
#[derive(Debug, Clone)]
pub struct Scene {
    pub(crate) nodes: NodeArena<SceneNode>,
    pub(crate) elements: ElementArena<SceneElement>,
    /// Registered nodes; `registry[i]` has `scene_index == Some(i)`
    pub(crate) registry: Vec<NodeKey>,
    pub(crate) root: NodeKey,
    pub(crate) config: SceneConfig,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create an empty scene with default configuration
    pub fn new() -> Self {
        Self::with_config(SceneConfig::default())
    }

    /// Create an empty scene with custom configuration
    pub fn with_config(config: SceneConfig) -> Self {
        let mut nodes = NodeArena::with_key();
        let mut root_node = SceneNode::new(None);
        root_node.scene_index = Some(0);
        let root = nodes.insert(root_node);

        Self {
            nodes,
            elements: ElementArena::with_key(),
            registry: vec![root],
            root,
            config,
        }
    }

    /// Scene configuration
    pub const fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Replace the configuration
    pub fn set_config(&mut self, config: SceneConfig) {
        self.config = config;
    }

    /// Root node
    pub const fn root(&self) -> NodeKey {
        self.root
    }

    /// Look up a node
    pub fn node(&self, key: NodeKey) -> Option<&SceneNode> {
        self.nodes.get(key)
    }

    /// Look up an element
    pub fn element(&self, key: ElementKey) -> Option<&SceneElement> {
        self.elements.get(key)
    }

    /// Number of live nodes, registered or not
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of live elements, attached or not
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Registered nodes in registry order
    pub fn registered_nodes(&self) -> &[NodeKey] {
        &self.registry
    }

    /// All live nodes in arena order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeKey, &SceneNode)> {
        self.nodes.iter()
    }

    /// All live elements in arena order
    pub fn elements(&self) -> impl Iterator<Item = (ElementKey, &SceneElement)> {
        self.elements.iter()
    }

    pub(crate) fn node_ref(&self, key: NodeKey) -> Result<&SceneNode, SceneError> {
        self.nodes.get(key).ok_or_else(|| rejected(SceneError::NodeNotFound(key)))
    }

    fn node_mut(&mut self, key: NodeKey) -> Result<&mut SceneNode, SceneError> {
        self.nodes.get_mut(key).ok_or_else(|| rejected(SceneError::NodeNotFound(key)))
    }

    fn element_ref(&self, key: ElementKey) -> Result<&SceneElement, SceneError> {
        self.elements.get(key).ok_or_else(|| rejected(SceneError::ElementNotFound(key)))
    }

    // ------------------------------------------------------------------
    // Registry
    // ------------------------------------------------------------------

    /// Create a registered, parentless node
    pub fn create_node(&mut self) -> NodeKey {
        let key = self.create_detached_node();
        self.push_registry(key);
        key
    }

    /// Create a registered, parentless node with a display label
    pub fn create_named_node(&mut self, name: &str) -> NodeKey {
        let key = self.create_node();
        self.nodes[key].name = Some(name.to_owned());
        key
    }

    /// Create a node that is not yet registered with the scene. It cannot
    /// join the tree until [`Scene::register_node`] is called.
    pub fn create_detached_node(&mut self) -> NodeKey {
        let key = self.nodes.insert(SceneNode::new(None));
        log::trace!("Created node {key:?}");
        key
    }

    /// Register a node, returning its registry index
    pub fn register_node(&mut self, key: NodeKey) -> Result<usize, SceneError> {
        if self.node_ref(key)?.is_registered() {
            return Err(rejected(SceneError::AlreadyRegistered(key)));
        }
        Ok(self.push_registry(key))
    }

    fn push_registry(&mut self, key: NodeKey) -> usize {
        let index = self.registry.len();
        self.registry.push(key);
        self.nodes[key].scene_index = Some(index);
        log::debug!("Registered node {key:?} at index {index}");
        index
    }

    /// Remove a node from the registry in O(1) by moving the last registered
    /// node into its slot. The node must be parentless and childless.
    pub fn unregister_node(&mut self, key: NodeKey) -> Result<(), SceneError> {
        if key == self.root {
            return Err(rejected(SceneError::RootNode));
        }
        let node = self.node_ref(key)?;
        let Some(index) = node.scene_index else {
            return Err(rejected(SceneError::NotRegistered(key)));
        };
        if node.parent.is_some() || !node.children.is_empty() {
            return Err(rejected(SceneError::NodeInUse(key)));
        }

        self.remove_from_registry(key, index);
        Ok(())
    }

    fn remove_from_registry(&mut self, key: NodeKey, index: usize) {
        debug_assert_eq!(self.registry[index], key, "registry index out of sync");
        self.registry.swap_remove(index);
        if let Some(&moved) = self.registry.get(index) {
            self.nodes[moved].scene_index = Some(index);
        }
        self.nodes[key].scene_index = None;
        log::debug!("Unregistered node {key:?} from index {index}");
    }

    /// Destroy a node and its whole subtree
    ///
    /// The node is first removed from its parent. Every destroyed node is
    /// unregistered and its elements are detached (they stay alive in the
    /// element arena). The root cannot be destroyed.
    pub fn destroy_node(&mut self, key: NodeKey) -> Result<(), SceneError> {
        if key == self.root {
            return Err(rejected(SceneError::RootNode));
        }
        let parent = self.node_ref(key)?.parent;
        if let Some(parent) = parent {
            self.remove_child(parent, key)?;
        }

        let mut pending = vec![key];
        let mut destroyed = 0_usize;
        while let Some(current) = pending.pop() {
            let Some(node) = self.nodes.remove(current) else {
                continue;
            };
            for element in &node.elements {
                if let Some(element) = self.elements.get_mut(*element) {
                    element.node = None;
                }
            }
            if let Some(index) = node.scene_index {
                // Removed from the arena already; fix the registry by hand
                self.registry.swap_remove(index);
                if let Some(&moved) = self.registry.get(index) {
                    self.nodes[moved].scene_index = Some(index);
                }
            }
            pending.extend(node.children.iter().copied());
            destroyed += 1;
        }

        log::debug!("Destroyed node {key:?} and {} descendants", destroyed - 1);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Elements
    // ------------------------------------------------------------------

    /// Move an element into the scene's element arena, unattached
    pub fn create_element(&mut self, mut element: SceneElement) -> ElementKey {
        element.node = None;
        let key = self.elements.insert(element);
        log::trace!("Created element {key:?}");
        key
    }

    /// Remove an element from the scene, detaching it from its node first
    pub fn destroy_element(&mut self, key: ElementKey) -> Result<SceneElement, SceneError> {
        let node = self.element_ref(key)?.node;
        if let Some(node) = node {
            self.remove_element(node, key)?;
        }
        self.elements
            .remove(key)
            .ok_or_else(|| rejected(SceneError::ElementNotFound(key)))
    }

    /// Replace an element's shapes, invalidating the owning node's bounds
    pub fn set_element_shapes(&mut self, key: ElementKey, shapes: Vec<Shape>) -> Result<(), SceneError> {
        let element = self
            .elements
            .get_mut(key)
            .ok_or_else(|| rejected(SceneError::ElementNotFound(key)))?;
        element.shapes = shapes;
        if let Some(node) = element.node {
            self.invalidate_bbox(node)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Structural mutation
    // ------------------------------------------------------------------

    /// Append `child` to `parent`'s children
    ///
    /// `child` must be parentless, both nodes must be registered and
    /// `child` must not be an ancestor of `parent`.
    pub fn insert_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), SceneError> {
        let parent_node = self.node_ref(parent)?;
        let child_node = self.node_ref(child)?;

        if child == self.root {
            return Err(rejected(SceneError::RootNode));
        }
        if !parent_node.is_registered() {
            return Err(rejected(SceneError::NotRegistered(parent)));
        }
        if !child_node.is_registered() {
            return Err(rejected(SceneError::NotRegistered(child)));
        }
        if let Some(current) = child_node.parent {
            return Err(rejected(SceneError::AlreadyParented { child, parent: current }));
        }
        if child == parent || self.ancestors(parent).any(|ancestor| ancestor == child) {
            return Err(rejected(SceneError::WouldCreateCycle { child, parent }));
        }

        let parent_node = &mut self.nodes[parent];
        let index = parent_node.children.len();
        parent_node.children.push(child);

        let child_node = &mut self.nodes[child];
        child_node.parent = Some(parent);
        child_node.parent_index = Some(index);

        log::trace!("Inserted child {child:?} into {parent:?} at {index}");
        self.invalidate_bbox(parent)
    }

    /// Detach `child` from `parent` in O(1)
    ///
    /// The last child is moved into the freed slot, so child order is not
    /// preserved.
    pub fn remove_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), SceneError> {
        self.node_ref(parent)?;
        let child_node = self.node_ref(child)?;
        if child_node.parent != Some(parent) {
            return Err(rejected(SceneError::NotAChild { child, parent }));
        }
        let Some(index) = child_node.parent_index else {
            return Err(rejected(SceneError::InvariantViolation(format!(
                "child {child:?} of {parent:?} has no parent index"
            ))));
        };

        let parent_node = &mut self.nodes[parent];
        debug_assert_eq!(parent_node.children.get(index), Some(&child), "parent index out of sync");
        parent_node.children.swap_remove(index);
        if let Some(&moved) = parent_node.children.get(index) {
            self.nodes[moved].parent_index = Some(index);
        }

        let child_node = &mut self.nodes[child];
        child_node.parent = None;
        child_node.parent_index = None;

        log::trace!("Removed child {child:?} from {parent:?} at {index}");
        self.invalidate_bbox(parent)
    }

    /// Attach an unattached element to `node`
    pub fn insert_element(&mut self, node: NodeKey, element: ElementKey) -> Result<(), SceneError> {
        self.node_ref(node)?;
        if let Some(current) = self.element_ref(element)?.node {
            return Err(rejected(SceneError::ElementAttached { element, node: current }));
        }

        self.nodes[node].elements.push(element);
        self.elements[element].node = Some(node);

        log::trace!("Inserted element {element:?} into {node:?}");
        self.invalidate_bbox(node)
    }

    /// Detach `element` from `node`. Element order is not preserved.
    pub fn remove_element(&mut self, node: NodeKey, element: ElementKey) -> Result<(), SceneError> {
        let node_ref = self.node_ref(node)?;
        if self.element_ref(element)?.node != Some(node) {
            return Err(rejected(SceneError::ElementNotOnNode { element, node }));
        }
        let Some(index) = node_ref.elements.iter().position(|&key| key == element) else {
            return Err(rejected(SceneError::InvariantViolation(format!(
                "element {element:?} points at {node:?} but is not listed there"
            ))));
        };

        self.nodes[node].elements.swap_remove(index);
        self.elements[element].node = None;

        log::trace!("Removed element {element:?} from {node:?}");
        self.invalidate_bbox(node)
    }

    /// Replace the local-to-parent transform
    pub fn set_transformation(&mut self, node: NodeKey, transformation: Affine) -> Result<(), SceneError> {
        let inverse = transformation
            .try_inverse()
            .ok_or_else(|| rejected(SceneError::SingularTransform))?;
        let node_mut = self.node_mut(node)?;
        node_mut.transformation = transformation;
        node_mut.inverse_transformation = inverse;
        self.invalidate_bbox(node)
    }

    /// Replace the display label; the node keeps its own copy
    pub fn set_name(&mut self, node: NodeKey, name: Option<&str>) -> Result<(), SceneError> {
        self.node_mut(node)?.name = name.map(str::to_owned);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Bounding boxes
    // ------------------------------------------------------------------

    /// Mark `node`'s box stale along with every ancestor
    ///
    /// Stops at the first ancestor that is already stale: a stale node
    /// always has stale ancestors.
    pub fn invalidate_bbox(&self, node: NodeKey) -> Result<(), SceneError> {
        self.node_ref(node)?;
        let start = node;
        let mut current = Some(node);
        while let Some(key) = current {
            let Some(node) = self.nodes.get(key) else {
                break;
            };
            let was_dirty = node.mark_bbox_dirty();
            if was_dirty && key != start {
                break;
            }
            current = node.parent;
        }
        Ok(())
    }

    /// Recompute `node`'s box now, refreshing stale descendants on the way
    pub fn update_bbox(&self, node: NodeKey) -> Result<Aabb, SceneError> {
        let node_ref = self.node_ref(node)?;
        let bbox = self.compute_bbox(node_ref);
        node_ref.store_bbox(bbox);
        Ok(bbox)
    }

    /// `node`'s box in its parent's frame, recomputed first if stale
    pub fn bbox(&self, node: NodeKey) -> Result<Aabb, SceneError> {
        self.node_ref(node)?;
        Ok(self.ensure_bbox(node))
    }

    pub(crate) fn ensure_bbox(&self, key: NodeKey) -> Aabb {
        let Some(node) = self.nodes.get(key) else {
            return Aabb::empty();
        };
        if let Some(bbox) = node.cached_bbox() {
            return bbox;
        }
        let bbox = self.compute_bbox(node);
        node.store_bbox(bbox);
        bbox
    }

    fn compute_bbox(&self, node: &SceneNode) -> Aabb {
        let mut bbox = Aabb::empty();
        for element in &node.elements {
            if let Some(element) = self.elements.get(*element) {
                bbox = bbox.union(&element.bbox().transformed(&node.transformation));
            }
        }
        for &child in &node.children {
            bbox = bbox.union(&self.ensure_bbox(child).transformed(&node.transformation));
        }
        bbox
    }

    // ------------------------------------------------------------------
    // Hierarchy helpers
    // ------------------------------------------------------------------

    /// Strict ancestors of `node`, nearest first
    pub fn ancestors(&self, node: NodeKey) -> Ancestors<'_> {
        Ancestors {
            scene: self,
            next: self.nodes.get(node).and_then(|node| node.parent),
        }
    }

    /// Number of edges between `node` and the root of its tree
    pub fn depth(&self, node: NodeKey) -> Result<usize, SceneError> {
        self.node_ref(node)?;
        Ok(self.ancestors(node).count())
    }

    /// Local frame of `node` to the frame of its tree's root's parent
    pub fn world_transformation(&self, node: NodeKey) -> Result<Affine, SceneError> {
        let mut transformation = self.node_ref(node)?.transformation;
        for ancestor in self.ancestors(node) {
            transformation = self.nodes[ancestor].transformation * transformation;
        }
        Ok(transformation)
    }

    /// First registered node carrying `name`, in registry order
    pub fn find_node_by_name(&self, name: &str) -> Option<NodeKey> {
        self.registry
            .iter()
            .copied()
            .find(|&key| self.nodes.get(key).and_then(SceneNode::name) == Some(name))
    }
}

/// Iterator over a node's ancestors, see [`Scene::ancestors`]
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    scene: &'a Scene,
    next: Option<NodeKey>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeKey;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.scene.nodes.get(current).and_then(|node| node.parent);
        Some(current)
    }
}
