//! Transform chain evaluation with staleness checking.
//!
//! A chain half is the composition of the edges met while walking from just
//! below an LCA down to a frame.  One stale non-static edge expires the
//! whole half; static edges never expire.

use chrono::{DateTime, TimeDelta, Utc};
use frameflow_types::{FrameRecord, Transform3D};

/// Composed transform of one chain half plus its expiry flag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainHalf {
    pub transform: Transform3D,
    pub expired: bool,
}

/// True when `record` is non-static and older than `now - threshold`.
pub fn is_expired(record: &FrameRecord, now: DateTime<Utc>, threshold: TimeDelta) -> bool {
    !record.is_static && now.signed_duration_since(record.timestamp) > threshold
}

/// Compose `records`, ordered root-ward first, into one transform.
///
/// Every record is still folded in after an expiry is seen, so the result
/// stays well defined for diagnostics.
pub fn compose_chain<'a>(
    records: impl IntoIterator<Item = &'a FrameRecord>,
    now: DateTime<Utc>,
    threshold: TimeDelta,
) -> ChainHalf {
    let mut chain = Transform3D::identity();
    let mut expired = false;
    for record in records {
        expired |= is_expired(record, now, threshold);
        chain = chain.compose(record.transform);
    }
    ChainHalf {
        transform: chain,
        expired,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frameflow_types::Vec3;

    fn edge(x: f32, age_ms: i64, is_static: bool, now: DateTime<Utc>) -> FrameRecord {
        FrameRecord::new(
            "p",
            "c",
            Transform3D::from_translation(Vec3::new(x, 0.0, 0.0)),
            now - TimeDelta::milliseconds(age_ms),
            is_static,
        )
    }

    #[test]
    fn empty_chain_is_identity_and_fresh() {
        let half = compose_chain(std::iter::empty(), Utc::now(), TimeDelta::zero());
        assert_eq!(half.transform, Transform3D::identity());
        assert!(!half.expired);
    }

    #[test]
    fn translations_accumulate() {
        let now = Utc::now();
        let edges = [edge(1.0, 0, false, now), edge(0.5, 0, false, now)];
        let half = compose_chain(&edges, now, TimeDelta::seconds(1));
        assert!((half.transform.translation.x - 1.5).abs() < 1e-5);
        assert!(!half.expired);
    }

    #[test]
    fn one_stale_edge_expires_the_half() {
        let now = Utc::now();
        let edges = [edge(1.0, 0, false, now), edge(1.0, 5_000, false, now)];
        let half = compose_chain(&edges, now, TimeDelta::seconds(1));
        assert!(half.expired);
        assert!((half.transform.translation.x - 2.0).abs() < 1e-5);
    }

    #[test]
    fn static_edges_never_expire() {
        let now = Utc::now();
        let old = edge(1.0, 86_400_000, true, now);
        assert!(!is_expired(&old, now, TimeDelta::zero()));
    }

    #[test]
    fn edge_exactly_at_threshold_is_fresh() {
        let now = Utc::now();
        let rec = edge(1.0, 1_000, false, now);
        assert!(!is_expired(&rec, now, TimeDelta::seconds(1)));
        assert!(is_expired(&rec, now, TimeDelta::milliseconds(999)));
    }
}
