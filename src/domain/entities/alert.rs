use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::health::HealthStatus;
use super::keys::TrackedKey;

const PRE_LIQUIDATION_DOCS: &str = "https://docs.keep.network/tbtc/index.html#pre-liquidation";

/// A tracked deposit that fell below its courtesy threshold.
///
/// Delivered once to every subscriber of the key, after which the key is
/// evicted from the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourtesyAlert {
    pub key: TrackedKey,
    pub status: HealthStatus,
    pub detected_at: DateTime<Utc>,
}

impl CourtesyAlert {
    #[must_use]
    pub fn new(key: TrackedKey, status: HealthStatus) -> Self {
        Self {
            key,
            status,
            detected_at: Utc::now(),
        }
    }

    /// Text sent to each subscriber.
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "Deposit with address {key} has entered the courtesy call state \
             (collateralization {ratio} below threshold {threshold}), action is required \
             in the next 6 hours to prevent liquidation. See {PRE_LIQUIDATION_DOCS}\n\
             You have been automatically unsubscribed from this deposit in order to avoid \
             duplication of messages, if you'd like to subscribe again just send the \
             following command:\n/watch {key}",
            key = self.key,
            ratio = self.status.ratio,
            threshold = self.status.threshold,
        )
    }
}
