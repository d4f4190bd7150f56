//! [`GraphParams`] – tunables of a [`FrameGraph`][crate::FrameGraph].

use std::time::Duration;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

/// Default maximum age of a non-static edge.
pub const DEFAULT_EXPIRE_THRESHOLD: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphParams {
    /// Non-static edges older than this make a lookup fail with
    /// `EXPIRED_CHAIN`.  Read on every lookup, never cached.
    #[serde(default = "default_expire_threshold")]
    pub expire_threshold: Duration,
}

fn default_expire_threshold() -> Duration {
    DEFAULT_EXPIRE_THRESHOLD
}

impl Default for GraphParams {
    fn default() -> Self {
        Self {
            expire_threshold: default_expire_threshold(),
        }
    }
}

impl GraphParams {
    pub fn with_expire_threshold(expire_threshold: Duration) -> Self {
        Self { expire_threshold }
    }

    /// The threshold as a signed chrono delta, saturating on overflow.
    pub fn expire_delta(&self) -> TimeDelta {
        TimeDelta::from_std(self.expire_threshold).unwrap_or(TimeDelta::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_ten_seconds() {
        assert_eq!(GraphParams::default().expire_threshold, Duration::from_secs(10));
        assert_eq!(GraphParams::default().expire_delta(), TimeDelta::seconds(10));
    }

    #[test]
    fn huge_threshold_saturates() {
        let params = GraphParams::with_expire_threshold(Duration::MAX);
        assert_eq!(params.expire_delta(), TimeDelta::MAX);
    }

    #[test]
    fn missing_field_uses_default() {
        let params: GraphParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params, GraphParams::default());
    }
}
