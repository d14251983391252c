use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::timeout;

use crate::domain::entities::keys::{SubscriberId, TrackedKey};
use crate::domain::ports::health_oracle::{HealthOracle, OracleError};
use crate::domain::ports::key_store::{list_keys, KeyStore, StoreError};
use crate::domain::value_objects::outcome::{UnwatchOutcome, WatchOutcome};

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("subscription storage failed: {0}")]
    Storage(#[from] StoreError),
}

/// What happened to one underlying key of a watch request.
#[derive(Debug)]
enum KeyAttempt {
    Watched(WatchOutcome),
    Invalid,
    Transient,
    StorageFailed(StoreError),
}

/// Subscription logic on top of the key store.
///
/// A watch is only recorded once the oracle confirms the key is a deposit.
/// Unwatch goes straight to the store.
pub struct Registry {
    store: Arc<dyn KeyStore>,
    oracle: Arc<dyn HealthOracle>,
    oracle_timeout: Duration,
}

impl Registry {
    #[must_use]
    pub fn new(
        store: Arc<dyn KeyStore>,
        oracle: Arc<dyn HealthOracle>,
        oracle_timeout: Duration,
    ) -> Self {
        Self {
            store,
            oracle,
            oracle_timeout,
        }
    }

    /// Subscribe `subscriber` to `key`.
    ///
    /// A signer address expands into every deposit it backs; each is tried
    /// and the request succeeds if at least one ends up watched.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Storage` only when no underlying key could be
    /// watched and at least one failed because the store was unavailable.
    pub async fn watch(
        &self,
        key: &TrackedKey,
        subscriber: &SubscriberId,
    ) -> Result<WatchOutcome, RegistryError> {
        let expanded = timeout(self.oracle_timeout, self.oracle.expand(key))
            .await
            .unwrap_or(Err(OracleError::Timeout));
        let targets = match expanded {
            Ok(targets) if !targets.is_empty() => targets,
            Ok(_) => vec![key.clone()],
            Err(e) if !e.is_transient() => return Ok(WatchOutcome::Invalid),
            Err(e) => {
                tracing::warn!(%key, "key expansion failed: {e}");
                return Ok(WatchOutcome::TransientFailure);
            }
        };

        let mut attempts = Vec::with_capacity(targets.len());
        for target in &targets {
            attempts.push(self.watch_one(target, subscriber).await);
        }
        let outcome = aggregate(attempts);
        let targets = targets.len();
        match &outcome {
            Ok(o) if o.is_success() => {
                tracing::info!(%key, %subscriber, targets, outcome = %o, "watch request");
            }
            Ok(o) => tracing::warn!(%key, %subscriber, targets, outcome = %o, "watch rejected"),
            // Storage failures are logged where they happen.
            Err(_) => {}
        }
        outcome
    }

    async fn watch_one(&self, key: &TrackedKey, subscriber: &SubscriberId) -> KeyAttempt {
        let resolved = timeout(self.oracle_timeout, self.oracle.resolve(key))
            .await
            .unwrap_or(Err(OracleError::Timeout));
        match resolved {
            Ok(_) => {}
            Err(e) if !e.is_transient() => return KeyAttempt::Invalid,
            Err(e) => {
                tracing::warn!(%key, "health lookup failed: {e}");
                return KeyAttempt::Transient;
            }
        }

        match self.store.add_subscriber(key, subscriber).await {
            Ok(added) => KeyAttempt::Watched(added.into()),
            Err(e) => {
                tracing::error!(%key, %subscriber, "failed to store subscription: {e}");
                KeyAttempt::StorageFailed(e)
            }
        }
    }

    /// Unsubscribe `subscriber` from `key`. Unknown keys are harmless.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Storage` if the store is unavailable.
    pub async fn unwatch(
        &self,
        key: &TrackedKey,
        subscriber: &SubscriberId,
    ) -> Result<UnwatchOutcome, RegistryError> {
        let removed = self.store.remove_subscriber(key, subscriber).await?;
        let outcome = UnwatchOutcome::from(removed);
        tracing::info!(%key, %subscriber, ?outcome, "unwatch request");
        Ok(outcome)
    }

    /// Every key currently under watch.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Storage` if the traversal fails.
    pub async fn tracked_keys(
        &self,
    ) -> Result<std::collections::BTreeSet<TrackedKey>, RegistryError> {
        Ok(list_keys(self.store.as_ref()).await?)
    }
}

/// Fold per-key attempts into one answer, preferring the most useful one:
/// newly watched, then already subscribed, then storage failure, then a
/// transient failure, and only then invalid.
fn aggregate(attempts: Vec<KeyAttempt>) -> Result<WatchOutcome, RegistryError> {
    let mut already = false;
    let mut transient = false;
    let mut storage = None;

    for attempt in attempts {
        match attempt {
            KeyAttempt::Watched(WatchOutcome::NewlyWatched) => {
                return Ok(WatchOutcome::NewlyWatched)
            }
            KeyAttempt::Watched(_) => already = true,
            KeyAttempt::Transient => transient = true,
            KeyAttempt::StorageFailed(e) => {
                storage.get_or_insert(e);
            }
            KeyAttempt::Invalid => {}
        }
    }

    if already {
        Ok(WatchOutcome::AlreadySubscribed)
    } else if let Some(e) = storage {
        Err(RegistryError::Storage(e))
    } else if transient {
        Ok(WatchOutcome::TransientFailure)
    } else {
        Ok(WatchOutcome::Invalid)
    }
}
