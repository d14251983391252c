use serde::{Deserialize, Serialize};

/// Current collateralization of a tracked entity and the ratio below which
/// it enters the courtesy-call state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub ratio: f64,
    pub threshold: f64,
}

impl HealthStatus {
    #[must_use]
    pub const fn new(ratio: f64, threshold: f64) -> Self {
        Self { ratio, threshold }
    }

    /// Strictly below the threshold. Sitting exactly on it is still healthy.
    #[must_use]
    pub fn is_unhealthy(&self) -> bool {
        self.ratio < self.threshold
    }
}
