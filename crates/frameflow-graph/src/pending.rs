//! [`PendingBuffer`] – edges whose parent frame is not known yet.
//!
//! Records wait here until an ancestor chain to `"world"` appears, at which
//! point the frame graph drains them into the tree.  Keys never overlap the
//! [`FrameIndex`][crate::index::FrameIndex].

use std::collections::{HashMap, HashSet};

use frameflow_types::FrameRecord;

#[derive(Debug, Default, Clone)]
pub struct PendingBuffer {
    records: HashMap<String, FrameRecord>,
    // parent id -> ids of pending frames declaring it
    by_parent: HashMap<String, HashSet<String>>,
}

impl PendingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store or refresh a submitted record.
    ///
    /// Returns `false`, leaving the buffer untouched, when a record for the
    /// same frame is already pending under a different parent.
    pub fn stage(&mut self, record: FrameRecord) -> bool {
        if let Some(existing) = self.records.get(&record.frame_id)
            && existing.parent_id != record.parent_id
        {
            return false;
        }
        self.insert(record);
        true
    }

    /// Store a record demoted out of the tree, replacing any entry.
    pub fn demote(&mut self, record: FrameRecord) {
        self.insert(record);
    }

    pub fn remove(&mut self, frame_id: &str) -> Option<FrameRecord> {
        let record = self.records.remove(frame_id)?;
        self.unlink_parent(&record.parent_id, frame_id);
        Some(record)
    }

    /// Remove and return every record whose declared parent is `parent_id`.
    ///
    /// The order of the returned records is unspecified.
    pub fn take_children_of(&mut self, parent_id: &str) -> Vec<FrameRecord> {
        let Some(ids) = self.by_parent.remove(parent_id) else {
            return Vec::new();
        };
        ids.iter().filter_map(|id| self.records.remove(id)).collect()
    }

    pub fn get(&self, frame_id: &str) -> Option<&FrameRecord> {
        self.records.get(frame_id)
    }

    pub fn contains(&self, frame_id: &str) -> bool {
        self.records.contains_key(frame_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FrameRecord> {
        self.records.values()
    }

    fn insert(&mut self, record: FrameRecord) {
        self.remove(&record.frame_id);
        self.by_parent
            .entry(record.parent_id.clone())
            .or_default()
            .insert(record.frame_id.clone());
        self.records.insert(record.frame_id.clone(), record);
    }

    fn unlink_parent(&mut self, parent_id: &str, frame_id: &str) {
        if let Some(ids) = self.by_parent.get_mut(parent_id) {
            ids.remove(frame_id);
            if ids.is_empty() {
                self.by_parent.remove(parent_id);
            }
        }
    }
}
