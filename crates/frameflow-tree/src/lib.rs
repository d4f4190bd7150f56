//! `frameflow-tree` – generic rooted tree stored in a generational arena.
//!
//! Nodes live in slots of a single `Vec` and are addressed by [`NodeId`]
//! handles.  Parent links, child lists and any external index hold handles,
//! never references, so detaching a subtree cannot leave anything dangling:
//! a freed slot is recycled with a bumped generation and old handles simply
//! stop resolving.
//!
//! # Example
//!
//! ```rust
//! use frameflow_tree::{Traversal, Tree};
//!
//! let mut tree = Tree::new("world");
//! let root = tree.root();
//! let a = tree.add_child(root, "a").unwrap();
//! let b = tree.add_child(a, "b").unwrap();
//!
//! assert_eq!(tree.depth(b), Some(2));
//! assert_eq!(tree.parent(b), Some(a));
//!
//! let mut order = Vec::new();
//! tree.traverse(Traversal::PostOrder, root, |_, name| order.push(*name));
//! assert_eq!(order, ["b", "a", "world"]);
//!
//! let removed = tree.detach(a).unwrap();
//! assert_eq!(removed, ["b", "a"]);
//! assert!(!tree.is_alive(b));
//! ```

use std::fmt::{self, Write as _};

use thiserror::Error;

// ────────────────────────────────────────────────────────────────────────────
// Handles & errors
// ────────────────────────────────────────────────────────────────────────────

/// Generational handle of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    fn idx(self) -> usize {
        self.index as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Errors raised by structural tree operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    #[error("node {0} is not alive")]
    StaleNode(NodeId),

    #[error("the root node cannot be detached")]
    DetachRoot,
}

/// Visiting order for [`Tree::traverse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// Parent before children.
    PreOrder,
    /// Children before parent.
    PostOrder,
}

// ────────────────────────────────────────────────────────────────────────────
// Tree
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Node<T> {
    generation: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    depth: usize,
    data: T,
}

/// A rooted tree owning every node's payload.
///
/// The root is created with the tree and can never be detached.  Children
/// keep their insertion order.
#[derive(Debug, Clone)]
pub struct Tree<T> {
    slots: Vec<Option<Node<T>>>,
    // last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    root: NodeId,
    len: usize,
}

impl<T> Tree<T> {
    /// Create a tree holding only a root node.
    pub fn new(root_data: T) -> Self {
        let root = NodeId::new(0, 1);
        Self {
            slots: vec![Some(Node {
                generation: 1,
                parent: None,
                children: Vec::new(),
                depth: 0,
                data: root_data,
            })],
            generations: vec![1],
            free_list: Vec::new(),
            root,
            len: 1,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false: the root is never removed.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True when `id` still refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn data(&self, id: NodeId) -> Option<&T> {
        self.node(id).map(|n| &n.data)
    }

    pub fn data_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.node_mut(id).map(|n| &mut n.data)
    }

    /// Parent of `id`; `None` for the root or a stale handle.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Children of `id` in insertion order (empty for a stale handle).
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Distance from the root (root = 0).
    pub fn depth(&self, id: NodeId) -> Option<usize> {
        self.node(id).map(|n| n.depth)
    }

    /// Attach a new node carrying `data` as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeId, data: T) -> Result<NodeId, TreeError> {
        let depth = self.depth(parent).ok_or(TreeError::StaleNode(parent))? + 1;

        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].wrapping_add(1).max(1);
            self.generations[idx] = generation;
            (idx, generation)
        } else {
            self.slots.push(None);
            self.generations.push(1);
            (self.slots.len() - 1, 1)
        };

        #[allow(clippy::cast_possible_truncation)]
        let id = NodeId::new(idx as u32, generation);
        self.slots[idx] = Some(Node {
            generation,
            parent: Some(parent),
            children: Vec::new(),
            depth,
            data,
        });
        if let Some(p) = self.node_mut(parent) {
            p.children.push(id);
        }
        self.len += 1;
        Ok(id)
    }

    /// Remove `id` and its whole subtree, returning the payloads in
    /// post-order (descendants first, `id` itself last).
    pub fn detach(&mut self, id: NodeId) -> Result<Vec<T>, TreeError> {
        if id == self.root {
            return Err(TreeError::DetachRoot);
        }
        let parent = self
            .node(id)
            .ok_or(TreeError::StaleNode(id))?
            .parent;

        if let Some(p) = parent.and_then(|p| self.node_mut(p)) {
            p.children.retain(|c| *c != id);
        }

        let order = self.collect(Traversal::PostOrder, id);
        let mut removed = Vec::with_capacity(order.len());
        for node_id in order {
            if let Some(node) = self.slots[node_id.idx()].take() {
                self.free_list.push(node_id.idx());
                self.len -= 1;
                removed.push(node.data);
            }
        }
        Ok(removed)
    }

    /// Visit the subtree rooted at `start` in the requested order.
    ///
    /// Uses an explicit stack, so arbitrarily deep trees are safe.  A stale
    /// `start` visits nothing.
    pub fn traverse(&self, order: Traversal, start: NodeId, mut visitor: impl FnMut(NodeId, &T)) {
        for id in self.collect(order, start) {
            if let Some(node) = self.node(id) {
                visitor(id, &node.data);
            }
        }
    }

    /// Render the tree as a Graphviz `digraph`, naming nodes with `label`.
    pub fn to_graphviz(&self, label: impl Fn(&T) -> String) -> String {
        let mut out = String::from("digraph {\n");
        self.traverse(Traversal::PreOrder, self.root, |id, data| {
            let name = label(data);
            if id == self.root {
                let _ = writeln!(out, "    {name};");
            }
            for child in self.children(id) {
                if let Some(c) = self.data(*child) {
                    let _ = writeln!(out, "    {name} -> {};", label(c));
                }
            }
        });
        out.push('}');
        out
    }

    fn collect(&self, order: Traversal, start: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.is_alive(start) {
            return out;
        }
        let mut stack = vec![start];
        match order {
            Traversal::PreOrder => {
                while let Some(id) = stack.pop() {
                    out.push(id);
                    stack.extend(self.children(id).iter().rev());
                }
            }
            Traversal::PostOrder => {
                // reversed (parent, right-to-left children) pre-order
                while let Some(id) = stack.pop() {
                    out.push(id);
                    stack.extend(self.children(id).iter());
                }
                out.reverse();
            }
        }
        out
    }

    fn node(&self, id: NodeId) -> Option<&Node<T>> {
        self.slots
            .get(id.idx())
            .and_then(|slot| slot.as_ref())
            .filter(|n| n.generation == id.generation)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<T>> {
        self.slots
            .get_mut(id.idx())
            .and_then(|slot| slot.as_mut())
            .filter(|n| n.generation == id.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Tree<&'static str>, [NodeId; 4]) {
        // world ─┬─ a ─┬─ b
        //        │     └─ c
        //        └─ d
        let mut tree = Tree::new("world");
        let root = tree.root();
        let a = tree.add_child(root, "a").unwrap();
        let b = tree.add_child(a, "b").unwrap();
        let c = tree.add_child(a, "c").unwrap();
        let d = tree.add_child(root, "d").unwrap();
        (tree, [a, b, c, d])
    }

    fn names(tree: &Tree<&'static str>, order: Traversal) -> Vec<&'static str> {
        let mut out = Vec::new();
        tree.traverse(order, tree.root(), |_, n| out.push(*n));
        out
    }

    #[test]
    fn new_tree_has_only_root() {
        let tree = Tree::new(0u8);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.depth(tree.root()), Some(0));
        assert_eq!(tree.parent(tree.root()), None);
        assert!(tree.children(tree.root()).is_empty());
    }

    #[test]
    fn depth_follows_parent_chain() {
        let (tree, [a, b, _, d]) = sample();
        assert_eq!(tree.depth(a), Some(1));
        assert_eq!(tree.depth(b), Some(2));
        assert_eq!(tree.depth(d), Some(1));
        assert_eq!(tree.parent(b), Some(a));
    }

    #[test]
    fn pre_and_post_order() {
        let (tree, _) = sample();
        assert_eq!(names(&tree, Traversal::PreOrder), ["world", "a", "b", "c", "d"]);
        assert_eq!(names(&tree, Traversal::PostOrder), ["b", "c", "a", "d", "world"]);
    }

    #[test]
    fn detach_returns_subtree_post_order() {
        let (mut tree, [a, b, c, d]) = sample();
        let removed = tree.detach(a).unwrap();
        assert_eq!(removed, ["b", "c", "a"]);
        assert_eq!(tree.len(), 2);
        assert!(!tree.is_alive(a));
        assert!(!tree.is_alive(b));
        assert!(!tree.is_alive(c));
        assert_eq!(tree.children(tree.root()), &[d]);
    }

    #[test]
    fn detach_root_is_refused() {
        let (mut tree, _) = sample();
        let root = tree.root();
        assert_eq!(tree.detach(root), Err(TreeError::DetachRoot));
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn recycled_slot_rejects_stale_handle() {
        let (mut tree, [_, b, _, d]) = sample();
        tree.detach(b).unwrap();
        let e = tree.add_child(d, "e").unwrap();
        assert!(!tree.is_alive(b));
        assert_eq!(tree.data(b), None);
        assert_eq!(tree.data(e), Some(&"e"));
        assert_eq!(tree.add_child(b, "x"), Err(TreeError::StaleNode(b)));
        assert_eq!(tree.detach(b), Err(TreeError::StaleNode(b)));
    }

    #[test]
    fn deep_chain_does_not_overflow() {
        let mut tree = Tree::new(0usize);
        let mut tip = tree.root();
        for i in 1..=200_000 {
            tip = tree.add_child(tip, i).unwrap();
        }
        assert_eq!(tree.depth(tip), Some(200_000));
        let mut count = 0;
        tree.traverse(Traversal::PostOrder, tree.root(), |_, _| count += 1);
        assert_eq!(count, 200_001);
        let first = tree.children(tree.root())[0];
        assert_eq!(tree.detach(first).unwrap().len(), 200_000);
    }

    #[test]
    fn data_mut_replaces_payload() {
        let (mut tree, [a, ..]) = sample();
        *tree.data_mut(a).unwrap() = "alpha";
        assert_eq!(tree.data(a), Some(&"alpha"));
    }

    #[test]
    fn graphviz_lists_every_edge() {
        let (tree, _) = sample();
        let dot = tree.to_graphviz(|n| format!("\"{n}\""));
        assert!(dot.starts_with("digraph {"));
        assert!(dot.contains("\"world\" -> \"a\";"));
        assert!(dot.contains("\"a\" -> \"c\";"));
        assert!(dot.contains("\"world\" -> \"d\";"));
        assert!(dot.ends_with('}'));
    }
}
