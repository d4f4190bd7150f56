//! [`FrameGraph`] – the streaming frame tree.
//!
//! Owns the `"world"`-rooted tree, the [`FrameIndex`] and the
//! [`PendingBuffer`], and implements the three public operations:
//!
//! - [`submit_transform`][FrameGraph::submit_transform] attaches, refreshes or
//!   parks an edge, then cascades any pending edges that became routable.
//! - [`lookup_transform`][FrameGraph::lookup_transform] finds the LCA of two
//!   frames and composes the edges on both sides of it, rejecting stale
//!   chains.
//! - [`remove_frame`][FrameGraph::remove_frame] drops a frame and demotes
//!   its descendants to pending so they can snap back in later.
//!
//! A graph is a plain owned value with no internal locking; callers that
//! share one across threads serialise access themselves (e.g. a `Mutex`).
//!
//! # Example
//!
//! ```rust
//! use chrono::Utc;
//! use frameflow_graph::FrameGraph;
//! use frameflow_types::{SubmitStatus, Transform3D, Vec3};
//!
//! let mut graph = FrameGraph::new();
//! let now = Utc::now();
//! let step = Transform3D::from_translation(Vec3::new(1.0, 0.0, 0.0));
//!
//! // Children may arrive before their parents.
//! assert_eq!(graph.submit_transform("b", "c", step, now, false), SubmitStatus::NoRouteToWorld);
//! assert_eq!(graph.submit_transform("a", "b", step, now, false), SubmitStatus::NoRouteToWorld);
//! assert_eq!(graph.submit_transform("world", "a", step, now, false), SubmitStatus::AddedNew);
//!
//! let t = graph.lookup_transform_at("world", "c", now).unwrap();
//! assert!((t.translation.x - 3.0).abs() < 1e-5);
//! ```

use chrono::{DateTime, Utc};
use frameflow_tree::{NodeId, Tree};
use frameflow_types::{
    FrameRecord, LookupError, RemovalResult, SubmitStatus, Transform3D, WORLD_FRAME,
};
use tracing::{debug, trace, warn};

use crate::chain::compose_chain;
use crate::index::FrameIndex;
use crate::lca::{LcaPaths, paths_to_lca};
use crate::params::GraphParams;
use crate::pending::PendingBuffer;
use crate::snapshot::GraphSnapshot;

/// A dynamic tree of named coordinate frames fed by unordered edge updates.
#[derive(Debug, Clone)]
pub struct FrameGraph {
    params: GraphParams,
    tree: Tree<FrameRecord>,
    index: FrameIndex,
    pending: PendingBuffer,
}

impl Default for FrameGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameGraph {
    /// Create a graph holding only the `"world"` root, with default params.
    pub fn new() -> Self {
        Self::with_params(GraphParams::default())
    }

    pub fn with_params(params: GraphParams) -> Self {
        let tree = Tree::new(FrameRecord::world(Utc::now()));
        let mut index = FrameIndex::new();
        index.insert(WORLD_FRAME, tree.root());
        Self {
            params,
            tree,
            index,
            pending: PendingBuffer::new(),
        }
    }

    pub fn params(&self) -> &GraphParams {
        &self.params
    }

    /// Replace the params; applies to subsequent lookups only.
    pub fn set_params(&mut self, params: GraphParams) {
        self.params = params;
    }

    pub fn set_expire_threshold(&mut self, threshold: std::time::Duration) {
        self.params.expire_threshold = threshold;
    }

    // ── Submission ──────────────────────────────────────────────────────────

    /// Submit the edge `parent_id → frame_id`.
    pub fn submit_transform(
        &mut self,
        parent_id: &str,
        frame_id: &str,
        transform: Transform3D,
        timestamp: DateTime<Utc>,
        is_static: bool,
    ) -> SubmitStatus {
        self.submit(FrameRecord::new(parent_id, frame_id, transform, timestamp, is_static))
    }

    /// Submit a prepared [`FrameRecord`].
    pub fn submit(&mut self, record: FrameRecord) -> SubmitStatus {
        let frame_id = record.frame_id.clone();
        let parent_id = record.parent_id.clone();

        let status = match self.index.get(&record.parent_id) {
            // Materialized frames always have an indexed parent, so an unknown
            // parent contradicts the tree.
            None if self.index.contains(&record.frame_id) => SubmitStatus::UnmatchedParent,
            None => {
                if self.pending.stage(record) {
                    SubmitStatus::NoRouteToWorld
                } else {
                    SubmitStatus::UnmatchedParent
                }
            }
            Some(parent) => match self.index.get(&record.frame_id) {
                None => {
                    self.attach(parent, record);
                    SubmitStatus::AddedNew
                }
                // Checked against the parent's live children, not just ids.
                Some(existing) if self.tree.children(parent).contains(&existing) => {
                    if let Some(slot) = self.tree.data_mut(existing) {
                        *slot = record;
                    }
                    SubmitStatus::UpdatedExisting
                }
                Some(_) => SubmitStatus::UnmatchedParent,
            },
        };

        if status == SubmitStatus::UnmatchedParent {
            warn!(frame_id = %frame_id, parent_id = %parent_id, %status, "rejected conflicting edge");
        } else {
            debug!(frame_id = %frame_id, parent_id = %parent_id, %status, "submitted edge");
        }
        status
    }

    // ── Lookup ──────────────────────────────────────────────────────────────

    /// Transform from `base_id` to `target_id` (the pose of the target
    /// expressed in the base frame), checked for expiry against now.
    pub fn lookup_transform(&self, base_id: &str, target_id: &str) -> Result<Transform3D, LookupError> {
        self.lookup_transform_at(base_id, target_id, Utc::now())
    }

    /// Like [`lookup_transform`][Self::lookup_transform] but evaluating
    /// expiry against the instant `now`.
    pub fn lookup_transform_at(
        &self,
        base_id: &str,
        target_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Transform3D, LookupError> {
        let base = self
            .index
            .get(base_id)
            .ok_or_else(|| LookupError::NoBaseFrame(base_id.to_string()))?;
        let target = self
            .index
            .get(target_id)
            .ok_or_else(|| LookupError::NoTargetFrame(target_id.to_string()))?;

        // Both handles come from the index, so they are live and share the root.
        let LcaPaths {
            base_path,
            target_path,
            ancestor,
        } = paths_to_lca(&self.tree, base, target)
            .ok_or_else(|| LookupError::NoBaseFrame(base_id.to_string()))?;
        trace!(
            base = base_id,
            target = target_id,
            lca = ?self.tree.data(ancestor).map(|r| r.frame_id.as_str()),
            base_edges = base_path.len(),
            target_edges = target_path.len(),
            "resolved lookup paths"
        );

        // Both halves run from the ancestor down, so the base half is T_lca_base
        // and must be inverted; folding the base path bottom-up instead breaks
        // once edges rotate.
        let threshold = self.params.expire_delta();
        let base_half = compose_chain(self.records_top_down(&base_path), now, threshold);
        let target_half = compose_chain(self.records_top_down(&target_path), now, threshold);

        if base_half.expired || target_half.expired {
            debug!(base = base_id, target = target_id, "lookup hit an expired edge");
            return Err(LookupError::ExpiredChain {
                base: base_id.to_string(),
                target: target_id.to_string(),
            });
        }

        Ok(base_half.transform.inverse().compose(target_half.transform))
    }

    /// Frame ids on the bottom-up paths from `base_id` and `target_id` to
    /// their lowest common ancestor, which is excluded from both.
    pub fn paths_to_lca(&self, base_id: &str, target_id: &str) -> Option<(Vec<String>, Vec<String>)> {
        let base = self.index.get(base_id)?;
        let target = self.index.get(target_id)?;
        let paths = paths_to_lca(&self.tree, base, target)?;
        Some((self.frame_ids_of(&paths.base_path), self.frame_ids_of(&paths.target_path)))
    }

    // ── Removal ─────────────────────────────────────────────────────────────

    /// Remove `frame_id`, discarding its own record and demoting every
    /// descendant edge to pending.
    pub fn remove_frame(&mut self, frame_id: &str) -> RemovalResult {
        let Some(node) = self.index.get(frame_id) else {
            return RemovalResult::FrameNotFound;
        };
        if node == self.tree.root() {
            warn!(frame_id, "refusing to remove the root frame");
            return RemovalResult::RootProtected;
        }

        let removed = match self.tree.detach(node) {
            Ok(removed) => removed,
            Err(e) => {
                warn!(frame_id, error = %e, "indexed frame could not be detached");
                self.index.remove(frame_id);
                return RemovalResult::FrameNotFound;
            }
        };

        let mut demoted = 0usize;
        for record in removed {
            self.index.remove(&record.frame_id);
            if record.frame_id != frame_id {
                self.pending.demote(record);
                demoted += 1;
            }
        }
        debug!(frame_id, demoted, "removed frame");
        RemovalResult::Ok
    }

    // ── Queries ─────────────────────────────────────────────────────────────

    /// True when `frame_id` is materialized in the tree.
    pub fn contains_frame(&self, frame_id: &str) -> bool {
        self.index.contains(frame_id)
    }

    /// True when `frame_id` is waiting for its parent.
    pub fn is_pending(&self, frame_id: &str) -> bool {
        self.pending.contains(frame_id)
    }

    /// Number of materialized frames, `"world"` included.
    pub fn frame_count(&self) -> usize {
        self.index.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Materialized frame ids, sorted.
    pub fn frame_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.index.ids().map(str::to_string).collect();
        ids.sort();
        ids
    }

    /// Pending `(frame_id, parent_id)` pairs, sorted.
    pub fn pending_frames(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .pending
            .iter()
            .map(|r| (r.frame_id.clone(), r.parent_id.clone()))
            .collect();
        pairs.sort();
        pairs
    }

    /// Current record of a materialized or pending frame.
    pub fn frame_record(&self, frame_id: &str) -> Option<&FrameRecord> {
        match self.index.get(frame_id) {
            Some(node) => self.tree.data(node),
            None => self.pending.get(frame_id),
        }
    }

    /// Depth of a materialized frame (`"world"` = 0).
    pub fn depth_of(&self, frame_id: &str) -> Option<usize> {
        self.index.get(frame_id).and_then(|n| self.tree.depth(n))
    }

    /// Actual parent of a materialized frame, read from the tree links.
    pub fn parent_of(&self, frame_id: &str) -> Option<&str> {
        let node = self.index.get(frame_id)?;
        let parent = self.tree.parent(node)?;
        self.tree.data(parent).map(|r| r.frame_id.as_str())
    }

    // ── Diagnostics ─────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot::capture(&self.tree, &self.pending)
    }

    /// Pretty JSON of [`snapshot`][Self::snapshot].
    pub fn dump(&self) -> String {
        serde_json::to_string_pretty(&self.snapshot()).unwrap_or_default()
    }

    /// Graphviz `digraph` of the materialized tree, nodes named by frame id.
    pub fn to_graphviz(&self) -> String {
        self.tree.to_graphviz(|r| format!("\"{}\"", r.frame_id))
    }

    // ── Internals ───────────────────────────────────────────────────────────

    /// Attach `record` under `parent`, then drain every pending edge that
    /// becomes routable, transitively.
    ///
    /// The drain is a worklist of newly materialized frame ids: each one is
    /// popped and the pending records naming it as parent are attached and
    /// pushed in turn.  Stack usage stays flat however long the chain is.
    fn attach(&mut self, parent: NodeId, record: FrameRecord) {
        let mut worklist: Vec<String> = self.materialize(parent, record).into_iter().collect();

        while let Some(frame_id) = worklist.pop() {
            let Some(node) = self.index.get(&frame_id) else {
                continue;
            };
            for child in self.pending.take_children_of(&frame_id) {
                debug!(frame_id = %child.frame_id, parent_id = %frame_id, "pending edge resolved");
                worklist.extend(self.materialize(node, child));
            }
        }
    }

    /// Create the tree node and index entry for `record`; returns its id.
    fn materialize(&mut self, parent: NodeId, record: FrameRecord) -> Option<String> {
        let frame_id = record.frame_id.clone();
        if self.pending.remove(&frame_id).is_some() {
            debug!(frame_id = %frame_id, "dropped superseded pending edge");
        }
        match self.tree.add_child(parent, record) {
            Ok(node) => {
                self.index.insert(frame_id.clone(), node);
                Some(frame_id)
            }
            Err(e) => {
                warn!(frame_id = %frame_id, error = %e, "parent vanished before attach");
                None
            }
        }
    }

    fn records_top_down<'a>(&'a self, bottom_up: &'a [NodeId]) -> impl Iterator<Item = &'a FrameRecord> + 'a {
        bottom_up.iter().rev().filter_map(|n| self.tree.data(*n))
    }

    fn frame_ids_of(&self, path: &[NodeId]) -> Vec<String> {
        path.iter()
            .filter_map(|n| self.tree.data(*n))
            .map(|r| r.frame_id.clone())
            .collect()
    }
}
