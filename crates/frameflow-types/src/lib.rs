//! `frameflow-types` – shared vocabulary of the frame graph.
//!
//! # Modules
//!
//! - [`transform`] – [`Transform3D`][transform::Transform3D]: rigid-body
//!   transform algebra (identity, composition, inversion).
//!
//! The crate root holds the [`FrameRecord`] edge snapshot and the status
//! taxonomy returned by every frame graph operation.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod transform;

pub use transform::{Quaternion, Transform3D, Vec3};

/// Id of the root frame every materialized frame descends from.
pub const WORLD_FRAME: &str = "world";

/// Parent id stored on the root frame's record.
pub const ROOT_PARENT: &str = "none";

/// Value snapshot of one edge of the frame tree.
///
/// `transform` is the pose of `frame_id` expressed in `parent_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub parent_id: String,
    pub frame_id: String,
    pub transform: Transform3D,
    pub timestamp: DateTime<Utc>,
    /// Static edges never expire regardless of age.
    pub is_static: bool,
}

impl FrameRecord {
    pub fn new(
        parent_id: impl Into<String>,
        frame_id: impl Into<String>,
        transform: Transform3D,
        timestamp: DateTime<Utc>,
        is_static: bool,
    ) -> Self {
        Self {
            parent_id: parent_id.into(),
            frame_id: frame_id.into(),
            transform,
            timestamp,
            is_static,
        }
    }

    /// The fixed record of the `"world"` root frame.
    pub fn world(timestamp: DateTime<Utc>) -> Self {
        Self::new(ROOT_PARENT, WORLD_FRAME, Transform3D::identity(), timestamp, true)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Status taxonomy
// ────────────────────────────────────────────────────────────────────────────

/// Outcome of submitting one edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmitStatus {
    /// A new frame was attached under a known parent.
    AddedNew,
    /// An existing frame under the same parent had its record replaced.
    UpdatedExisting,
    /// The parent is not known yet; the edge is held as pending.
    NoRouteToWorld,
    /// The submission contradicts the known topology and was rejected.
    UnmatchedParent,
}

impl SubmitStatus {
    /// True when the edge was stored (materialized or pending).
    pub fn is_accepted(self) -> bool {
        !matches!(self, SubmitStatus::UnmatchedParent)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SubmitStatus::AddedNew => "ADDED_NEW",
            SubmitStatus::UpdatedExisting => "UPDATED_EXISTING",
            SubmitStatus::NoRouteToWorld => "NO_ROUTE_TO_WORLD",
            SubmitStatus::UnmatchedParent => "UNMATCHED_PARENT",
        }
    }
}

impl fmt::Display for SubmitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a transform lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LookupStatus {
    Ok,
    NoBaseFrame,
    NoTargetFrame,
    ExpiredChain,
}

impl LookupStatus {
    /// Status of a lookup result.
    pub fn of<T>(result: &Result<T, LookupError>) -> Self {
        match result {
            Ok(_) => LookupStatus::Ok,
            Err(e) => e.status(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LookupStatus::Ok => "OK",
            LookupStatus::NoBaseFrame => "NO_BASE_FRAME",
            LookupStatus::NoTargetFrame => "NO_TARGET_FRAME",
            LookupStatus::ExpiredChain => "EXPIRED_CHAIN",
        }
    }
}

impl fmt::Display for LookupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of removing a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RemovalResult {
    Ok,
    FrameNotFound,
    /// The `"world"` root can never be removed.
    RootProtected,
}

impl RemovalResult {
    pub fn as_str(self) -> &'static str {
        match self {
            RemovalResult::Ok => "OK",
            RemovalResult::FrameNotFound => "FRAME_NOT_FOUND",
            RemovalResult::RootProtected => "ROOT_PROTECTED",
        }
    }
}

impl fmt::Display for RemovalResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons a lookup produced no transform.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LookupError {
    #[error("NO_BASE_FRAME: frame '{0}' is not materialized")]
    NoBaseFrame(String),

    #[error("NO_TARGET_FRAME: frame '{0}' is not materialized")]
    NoTargetFrame(String),

    #[error("EXPIRED_CHAIN: a non-static edge between '{base}' and '{target}' is stale")]
    ExpiredChain { base: String, target: String },
}

impl LookupError {
    pub fn status(&self) -> LookupStatus {
        match self {
            LookupError::NoBaseFrame(_) => LookupStatus::NoBaseFrame,
            LookupError::NoTargetFrame(_) => LookupStatus::NoTargetFrame,
            LookupError::ExpiredChain { .. } => LookupStatus::ExpiredChain,
        }
    }
}
