//! Diagnostic export of a frame graph.
//!
//! [`GraphSnapshot`] exposes the tree shape as flat parent/child records, the
//! materialized frame ids and the pending `(frame, parent)` pairs.  Consumers should rely on these facts
//! only; the JSON layout produced by [`FrameGraph::dump`][crate::FrameGraph::dump]
//! is best-effort.

use frameflow_tree::{Traversal, Tree};
use frameflow_types::FrameRecord;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::pending::PendingBuffer;

/// One materialized frame and the frame it hangs from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TreeEntry {
    pub frame_id: String,
    pub parent_id: String,
}

/// One pending edge.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub struct PendingEntry {
    pub frame_id: String,
    pub parent_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GraphSnapshot {
    /// Tree edges in pre-order from `"world"`: every parent precedes its
    /// children, and siblings keep attachment order.
    pub tree: Vec<TreeEntry>,
    /// Materialized frame ids, sorted.
    pub frames: Vec<String>,
    /// Pending edges, sorted by frame id.
    pub pending: Vec<PendingEntry>,
}

impl GraphSnapshot {
    /// JSON schema of the snapshot, pretty-printed.
    pub fn json_schema() -> String {
        let schema = schemars::schema_for!(GraphSnapshot);
        serde_json::to_string_pretty(&schema).unwrap_or_default()
    }

    pub(crate) fn capture(tree: &Tree<FrameRecord>, pending: &PendingBuffer) -> Self {
        let mut entries = Vec::with_capacity(tree.len());
        tree.traverse(Traversal::PreOrder, tree.root(), |_, record| {
            entries.push(TreeEntry {
                frame_id: record.frame_id.clone(),
                parent_id: record.parent_id.clone(),
            });
        });

        let mut frames: Vec<String> = entries.iter().map(|e| e.frame_id.clone()).collect();
        frames.sort();

        let mut pending: Vec<PendingEntry> = pending
            .iter()
            .map(|r| PendingEntry {
                frame_id: r.frame_id.clone(),
                parent_id: r.parent_id.clone(),
            })
            .collect();
        pending.sort();

        Self {
            tree: entries,
            frames,
            pending,
        }
    }
}
