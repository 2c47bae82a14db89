//! Full consistency check of a scene
//!
//! Walks every arena entry and verifies that both directions of every edge
//! agree, that the registry indices are exact and that the bounding box
//! cache is sound. Used after loading and from tests; mutations never need
//! it because they check their own preconditions.

use crate::geometry::Aabb;
use crate::scene::{Scene, SceneError};

fn violation(message: String) -> SceneError {
    log::warn!("Scene invariant violated: {message}");
    SceneError::InvariantViolation(message)
}

impl Scene {
    /// Verify every structural invariant, reporting the first violation
    pub fn check_invariants(&self) -> Result<(), SceneError> {
        self.check_registry()?;
        self.check_hierarchy()?;
        self.check_elements()?;
        self.check_bboxes()
    }

    fn check_registry(&self) -> Result<(), SceneError> {
        let root = self.node_ref(self.root)?;
        if root.parent.is_some() {
            return Err(violation(format!("root {:?} has a parent", self.root)));
        }
        if root.scene_index.is_none() {
            return Err(violation(format!("root {:?} is not registered", self.root)));
        }

        for (index, &key) in self.registry.iter().enumerate() {
            let Some(node) = self.nodes.get(key) else {
                return Err(violation(format!("registry slot {index} holds dead node {key:?}")));
            };
            if node.scene_index != Some(index) {
                return Err(violation(format!(
                    "node {key:?} sits at registry slot {index} but records {:?}",
                    node.scene_index
                )));
            }
        }

        for (key, node) in &self.nodes {
            if let Some(index) = node.scene_index {
                if self.registry.get(index) != Some(&key) {
                    return Err(violation(format!("node {key:?} claims registry slot {index}")));
                }
            }
        }
        Ok(())
    }

    fn check_hierarchy(&self) -> Result<(), SceneError> {
        for (key, node) in &self.nodes {
            for (index, &child_key) in node.children.iter().enumerate() {
                let Some(child) = self.nodes.get(child_key) else {
                    return Err(violation(format!("node {key:?} lists dead child {child_key:?}")));
                };
                if child.parent != Some(key) || child.parent_index != Some(index) {
                    return Err(violation(format!(
                        "child {child_key:?} at {index} of {key:?} points at {:?} index {:?}",
                        child.parent, child.parent_index
                    )));
                }
                if !child.is_registered() {
                    return Err(violation(format!("child {child_key:?} of {key:?} is not registered")));
                }
            }

            if let Some(parent_key) = node.parent {
                let listed = self
                    .nodes
                    .get(parent_key)
                    .zip(node.parent_index)
                    .and_then(|(parent, index)| parent.children.get(index))
                    == Some(&key);
                if !listed {
                    return Err(violation(format!("node {key:?} is not listed by its parent {parent_key:?}")));
                }
            }

            // Any cycle would be longer than the number of nodes
            let mut steps = 0_usize;
            for _ in self.ancestors(key) {
                steps += 1;
                if steps > self.nodes.len() {
                    return Err(violation(format!("node {key:?} is on a parent cycle")));
                }
            }
        }
        Ok(())
    }

    fn check_elements(&self) -> Result<(), SceneError> {
        for (key, node) in &self.nodes {
            for &element_key in &node.elements {
                let Some(element) = self.elements.get(element_key) else {
                    return Err(violation(format!("node {key:?} lists dead element {element_key:?}")));
                };
                if element.node != Some(key) {
                    return Err(violation(format!(
                        "element {element_key:?} listed by {key:?} points at {:?}",
                        element.node
                    )));
                }
            }
        }

        for (element_key, element) in &self.elements {
            if let Some(node_key) = element.node {
                let listed = self
                    .nodes
                    .get(node_key)
                    .is_some_and(|node| node.elements.contains(&element_key));
                if !listed {
                    return Err(violation(format!(
                        "element {element_key:?} points at {node_key:?} which does not list it"
                    )));
                }
            }
        }
        Ok(())
    }

    fn check_bboxes(&self) -> Result<(), SceneError> {
        for (key, node) in &self.nodes {
            if node.bbox_dirty.get() {
                if let Some(ancestor) = self.ancestors(key).find(|&a| self.nodes[a].bbox_is_valid()) {
                    return Err(violation(format!("stale node {key:?} has clean ancestor {ancestor:?}")));
                }
                continue;
            }

            let mut content = Aabb::empty();
            for element_key in &node.elements {
                if let Some(element) = self.elements.get(*element_key) {
                    content = content.union(&element.bbox().transformed(&node.transformation));
                }
            }
            for &child_key in &node.children {
                if let Some(child_box) = self.nodes.get(child_key).and_then(|child| child.cached_bbox()) {
                    content = content.union(&child_box.transformed(&node.transformation));
                }
            }
            if !node.bbox.get().contains_box(&content) {
                return Err(violation(format!("cached box of {key:?} does not cover its content")));
            }
        }
        Ok(())
    }
}
