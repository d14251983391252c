use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::entities::health::HealthStatus;
use crate::domain::entities::keys::TrackedKey;
use crate::domain::ports::health_oracle::{HealthOracle, OracleError};

#[derive(Default)]
struct OracleTable {
    statuses: HashMap<TrackedKey, HealthStatus>,
    signers: HashMap<TrackedKey, Vec<TrackedKey>>,
    unavailable: HashSet<TrackedKey>,
    delays: HashMap<TrackedKey, Duration>,
    calls: HashMap<TrackedKey, usize>,
}

/// Table-driven oracle for tests and local runs.
///
/// Keys missing from the table are invalid. Individual keys can be marked
/// unavailable or slowed down to exercise transient failures and timeouts.
#[derive(Default)]
pub struct StaticHealthOracle {
    table: Mutex<OracleTable>,
}

impl StaticHealthOracle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`Self::set_status`].
    #[must_use]
    pub fn with_status(self, key: impl Into<TrackedKey>, status: HealthStatus) -> Self {
        self.set_status(key, status);
        self
    }

    /// Register `signer` as backing `deposits`.
    #[must_use]
    pub fn with_signer(self, signer: impl Into<TrackedKey>, deposits: Vec<TrackedKey>) -> Self {
        if let Ok(mut table) = self.table.lock() {
            table.signers.insert(signer.into(), deposits);
        }
        self
    }

    pub fn set_status(&self, key: impl Into<TrackedKey>, status: HealthStatus) {
        if let Ok(mut table) = self.table.lock() {
            table.statuses.insert(key.into(), status);
        }
    }

    /// Make `key` fail with a transient error until cleared.
    pub fn set_unavailable(&self, key: impl Into<TrackedKey>, unavailable: bool) {
        if let Ok(mut table) = self.table.lock() {
            let key = key.into();
            if unavailable {
                table.unavailable.insert(key);
            } else {
                table.unavailable.remove(&key);
            }
        }
    }

    /// Delay every resolution of `key` by `delay`.
    pub fn set_delay(&self, key: impl Into<TrackedKey>, delay: Option<Duration>) {
        if let Ok(mut table) = self.table.lock() {
            let key = key.into();
            match delay {
                Some(d) => table.delays.insert(key, d),
                None => table.delays.remove(&key),
            };
        }
    }

    /// How many times `resolve` was called for `key`.
    #[must_use]
    pub fn resolve_count(&self, key: &TrackedKey) -> usize {
        self.table
            .lock()
            .map(|t| t.calls.get(key).copied().unwrap_or(0))
            .unwrap_or(0)
    }
}

#[async_trait]
impl HealthOracle for StaticHealthOracle {
    async fn resolve(&self, key: &TrackedKey) -> Result<HealthStatus, OracleError> {
        let delay = {
            let mut table = self
                .table
                .lock()
                .map_err(|e| OracleError::Unavailable(format!("lock poisoned: {e}")))?;
            *table.calls.entry(key.clone()).or_default() += 1;
            table.delays.get(key).copied()
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let table = self
            .table
            .lock()
            .map_err(|e| OracleError::Unavailable(format!("lock poisoned: {e}")))?;
        if table.unavailable.contains(key) {
            return Err(OracleError::Unavailable(format!("ledger unreachable for {key}")));
        }
        table
            .statuses
            .get(key)
            .copied()
            .ok_or_else(|| OracleError::InvalidKey(key.clone()))
    }

    async fn expand(&self, key: &TrackedKey) -> Result<Vec<TrackedKey>, OracleError> {
        let table = self
            .table
            .lock()
            .map_err(|e| OracleError::Unavailable(format!("lock poisoned: {e}")))?;
        Ok(table
            .signers
            .get(key)
            .cloned()
            .unwrap_or_else(|| vec![key.clone()]))
    }
}
