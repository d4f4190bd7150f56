//! [`FrameIndex`] – frame id → tree handle lookup.
//!
//! The fast path for every existence check.  An id is indexed iff a live
//! node with that id hangs off the root.

use std::collections::HashMap;

use frameflow_tree::NodeId;

#[derive(Debug, Default, Clone)]
pub struct FrameIndex {
    nodes: HashMap<String, NodeId>,
}

impl FrameIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, frame_id: &str) -> Option<NodeId> {
        self.nodes.get(frame_id).copied()
    }

    pub fn contains(&self, frame_id: &str) -> bool {
        self.nodes.contains_key(frame_id)
    }

    pub fn insert(&mut self, frame_id: impl Into<String>, node: NodeId) {
        self.nodes.insert(frame_id.into(), node);
    }

    pub fn remove(&mut self, frame_id: &str) -> Option<NodeId> {
        self.nodes.remove(frame_id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Indexed frame ids, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frameflow_tree::Tree;

    #[test]
    fn insert_get_remove() {
        let mut tree = Tree::new(());
        let child = tree.add_child(tree.root(), ()).unwrap();

        let mut index = FrameIndex::new();
        assert!(index.is_empty());
        index.insert("world", tree.root());
        index.insert("base_link", child);

        assert_eq!(index.get("base_link"), Some(child));
        assert!(index.contains("world"));
        assert_eq!(index.len(), 2);

        assert_eq!(index.remove("base_link"), Some(child));
        assert!(!index.contains("base_link"));
        assert_eq!(index.remove("base_link"), None);
    }
}
