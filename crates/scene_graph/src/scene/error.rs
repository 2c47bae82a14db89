//! Scene graph errors

use thiserror::Error;

use crate::foundation::collections::{ElementKey, NodeKey};

/// Errors raised by scene mutations and persistence
///
/// Every structural precondition is checked before anything is written, so
/// an operation that returns an error has left the scene untouched.
#[derive(Error, Debug)]
pub enum SceneError {
    /// Key does not name a live node of this scene
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeKey),

    /// Key does not name a live element of this scene
    #[error("Element not found: {0:?}")]
    ElementNotFound(ElementKey),

    /// Child insertion on a node that already has a parent
    #[error("Node {child:?} already has parent {parent:?}")]
    AlreadyParented {
        /// Node being inserted
        child: NodeKey,
        /// Its current parent
        parent: NodeKey,
    },

    /// Node is not registered with the scene
    #[error("Node {0:?} is not registered with the scene")]
    NotRegistered(NodeKey),

    /// Node is already registered with the scene
    #[error("Node {0:?} is already registered with the scene")]
    AlreadyRegistered(NodeKey),

    /// Removal of a node from a parent it does not belong to
    #[error("Node {child:?} is not a child of {parent:?}")]
    NotAChild {
        /// Node being removed
        child: NodeKey,
        /// Node it was removed from
        parent: NodeKey,
    },

    /// Insertion would make a node its own ancestor
    #[error("Inserting {child:?} under {parent:?} would create a cycle")]
    WouldCreateCycle {
        /// Node being inserted
        child: NodeKey,
        /// Intended parent
        parent: NodeKey,
    },

    /// Operation not permitted on the scene root
    #[error("Operation not permitted on the root node")]
    RootNode,

    /// Element insertion while the element is attached elsewhere
    #[error("Element {element:?} is already attached to {node:?}")]
    ElementAttached {
        /// Element being inserted
        element: ElementKey,
        /// Node it is attached to
        node: NodeKey,
    },

    /// Element removal from a node it is not attached to
    #[error("Element {element:?} is not attached to {node:?}")]
    ElementNotOnNode {
        /// Element being removed
        element: ElementKey,
        /// Node it was removed from
        node: NodeKey,
    },

    /// Node still has a parent or children
    #[error("Node {0:?} is still part of a hierarchy")]
    NodeInUse(NodeKey),

    /// Transform cannot be inverted
    #[error("Transformation is not invertible")]
    SingularTransform,

    /// Consistency check failure
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),
}
