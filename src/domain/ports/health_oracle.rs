use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::health::HealthStatus;
use crate::domain::entities::keys::TrackedKey;

#[derive(Error, Debug)]
pub enum OracleError {
    /// The key does not correspond to a trackable deposit. Not worth retrying.
    #[error("not a trackable deposit: {0}")]
    InvalidKey(TrackedKey),
    #[error("health oracle unavailable: {0}")]
    Unavailable(String),
    #[error("invalid response from health oracle: {0}")]
    InvalidResponse(String),
    #[error("health oracle timed out")]
    Timeout,
}

impl OracleError {
    /// Everything except `InvalidKey` may succeed on a later attempt.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        !matches!(self, Self::InvalidKey(_))
    }
}

/// Resolves tracked keys against the external ledger.
#[async_trait]
pub trait HealthOracle: Send + Sync {
    /// Current collateralization and courtesy threshold of `key`.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::InvalidKey` when the key is not a deposit and a
    /// transient variant when the ledger cannot be reached.
    async fn resolve(&self, key: &TrackedKey) -> Result<HealthStatus, OracleError>;

    /// Underlying deposit keys for an identity. A signer address expands to
    /// every deposit it backs; a deposit address stands for itself.
    ///
    /// # Errors
    ///
    /// Returns a transient `OracleError` when the ledger cannot be reached.
    async fn expand(&self, key: &TrackedKey) -> Result<Vec<TrackedKey>, OracleError> {
        Ok(vec![key.clone()])
    }
}
