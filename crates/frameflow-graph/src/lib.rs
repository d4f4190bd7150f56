//! `frameflow-graph` – streaming coordinate-frame tree.
//!
//! Answers "what is the transform between these two frames right now" while
//! edges arrive out of order from independent publishers and go stale.
//!
//! # Modules
//!
//! - [`graph`] – [`FrameGraph`][graph::FrameGraph]: submission, lookup and
//!   removal protocols over a `"world"`-rooted tree.
//! - [`index`] – [`FrameIndex`][index::FrameIndex]: frame id → node handle.
//! - [`pending`] – [`PendingBuffer`][pending::PendingBuffer]: edges waiting
//!   for their parent frame.
//! - [`lca`] – [`paths_to_lca`][lca::paths_to_lca]: lowest-common-ancestor
//!   path walk.
//! - [`chain`] – [`compose_chain`][chain::compose_chain]: edge composition
//!   with expiry checking.
//! - [`params`] – [`GraphParams`][params::GraphParams]: expiry threshold.
//! - [`snapshot`] – [`GraphSnapshot`][snapshot::GraphSnapshot]: diagnostic
//!   export.

pub mod chain;
pub mod graph;
pub mod index;
pub mod lca;
pub mod params;
pub mod pending;
pub mod snapshot;

pub use graph::FrameGraph;
pub use params::GraphParams;
pub use snapshot::{GraphSnapshot, PendingEntry, TreeEntry};
