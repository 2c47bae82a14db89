//! Arena handle types
//!
//! Nodes and elements live in slot maps owned by the scene. Keys stay
//! stable across unrelated insertions and removals and go stale (instead of
//! dangling) once their slot is freed.

pub use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Stable handle to a node in a scene's node arena
    pub struct NodeKey;

    /// Stable handle to an element in a scene's element arena
    pub struct ElementKey;
}

/// Node arena
pub type NodeArena<T> = SlotMap<NodeKey, T>;

/// Element arena
pub type ElementArena<T> = SlotMap<ElementKey, T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_keys_do_not_alias() {
        let mut arena: NodeArena<&str> = NodeArena::with_key();
        let first = arena.insert("first");
        arena.remove(first);
        let second = arena.insert("second");

        assert_ne!(first, second);
        assert!(arena.get(first).is_none());
        assert_eq!(arena.get(second), Some(&"second"));
    }
}
