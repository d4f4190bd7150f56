//! Lowest-common-ancestor pathfinding.
//!
//! Given two live nodes, [`paths_to_lca`] walks the deeper one up until both
//! sit at the same depth, then walks both up in lockstep until they meet.
//! The meeting node is the LCA; every node left behind on the way is
//! recorded bottom-up (closest to the start first).  The LCA itself is
//! excluded from both paths.
//!
//! Both walks are plain loops bounded by tree depth.

use frameflow_tree::{NodeId, Tree};

/// The two bottom-up paths from a pair of nodes to their LCA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LcaPaths {
    /// From the base node up to, not including, the LCA.
    pub base_path: Vec<NodeId>,
    /// From the target node up to, not including, the LCA.
    pub target_path: Vec<NodeId>,
    pub ancestor: NodeId,
}

/// Compute the paths from `base` and `target` to their lowest common
/// ancestor.
///
/// Returns `None` when either handle is stale.
pub fn paths_to_lca<T>(tree: &Tree<T>, base: NodeId, target: NodeId) -> Option<LcaPaths> {
    let base_depth = tree.depth(base)?;
    let target_depth = tree.depth(target)?;

    let mut base_path = Vec::new();
    let mut target_path = Vec::new();

    // Only one of the two produces a non-empty path.
    let mut current_base = equalize(tree, base, target_depth, &mut base_path)?;
    let mut current_target = equalize(tree, target, base_depth, &mut target_path)?;

    while current_base != current_target {
        base_path.push(current_base);
        target_path.push(current_target);
        current_base = tree.parent(current_base)?;
        current_target = tree.parent(current_target)?;
    }

    Some(LcaPaths {
        base_path,
        target_path,
        ancestor: current_base,
    })
}

fn equalize<T>(tree: &Tree<T>, start: NodeId, depth: usize, path: &mut Vec<NodeId>) -> Option<NodeId> {
    let mut current = start;
    while tree.depth(current)? > depth {
        path.push(current);
        current = tree.parent(current)?;
    }
    Some(current)
}
