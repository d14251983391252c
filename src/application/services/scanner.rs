use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use futures::stream::{self, StreamExt};
use thiserror::Error;
use tokio::time::timeout;

use super::scan_cycle::{KeyVerdict, ScanCycle, ScanReport};
use crate::application::config::ScannerConfig;
use crate::domain::entities::alert::CourtesyAlert;
use crate::domain::entities::keys::{SubscriberId, TrackedKey};
use crate::domain::ports::health_oracle::HealthOracle;
use crate::domain::ports::key_store::{KeyPager, KeyStore, StoreError};
use crate::domain::ports::notifier::{NotificationError, Notifier};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("scan aborted, key store failed: {0}")]
    Storage(#[from] StoreError),
}

/// Result of asking the scanner to run.
#[derive(Debug)]
pub enum TickOutcome {
    Completed(ScanReport),
    /// A previous cycle was still running.
    Skipped,
}

/// Per-cycle limits.
#[derive(Debug, Clone, Copy)]
pub struct ScanSettings {
    pub oracle_timeout: Duration,
    pub delivery_timeout: Duration,
    pub max_concurrent_checks: usize,
}

impl From<&ScannerConfig> for ScanSettings {
    fn from(config: &ScannerConfig) -> Self {
        Self {
            oracle_timeout: config.oracle_timeout(),
            delivery_timeout: config.delivery_timeout(),
            max_concurrent_checks: config.concurrency(),
        }
    }
}

/// Clears the in-flight flag when the cycle ends, however it ends.
struct FlightGuard<'a>(&'a AtomicBool);

impl<'a> FlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Periodic health sweep: traverse every tracked key, check it against the
/// oracle, alert and evict the ones that fell below their threshold.
pub struct Scanner {
    store: Arc<dyn KeyStore>,
    oracle: Arc<dyn HealthOracle>,
    notifier: Arc<dyn Notifier>,
    settings: ScanSettings,
    in_flight: AtomicBool,
}

impl Scanner {
    #[must_use]
    pub fn new(
        store: Arc<dyn KeyStore>,
        oracle: Arc<dyn HealthOracle>,
        notifier: Arc<dyn Notifier>,
        settings: ScanSettings,
    ) -> Self {
        Self {
            store,
            oracle,
            notifier,
            settings: ScanSettings {
                max_concurrent_checks: settings.max_concurrent_checks.max(1),
                ..settings
            },
            in_flight: AtomicBool::new(false),
        }
    }

    /// Run one cycle unless another one is still in progress.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::Storage` if the traversal or an eviction fails.
    /// Keys not yet reached stay tracked and are picked up next time.
    pub async fn tick(&self) -> Result<TickOutcome, ScanError> {
        let Some(_guard) = FlightGuard::acquire(&self.in_flight) else {
            tracing::debug!("Previous scan still running, skipping tick");
            return Ok(TickOutcome::Skipped);
        };
        self.run_cycle().await.map(TickOutcome::Completed)
    }

    async fn run_cycle(&self) -> Result<ScanReport, ScanError> {
        let mut cycle = ScanCycle::new();
        let mut pager = KeyPager::new(self.store.as_ref());

        while let Some(batch) = pager.next_page().await? {
            let fresh = cycle.admit(batch);
            let verdicts: Vec<Result<KeyVerdict, StoreError>> = stream::iter(fresh)
                .map(|key| async move { self.evaluate(&key).await })
                .buffer_unordered(self.settings.max_concurrent_checks)
                .collect()
                .await;
            for verdict in verdicts {
                cycle.record(verdict?);
            }
        }

        let report = cycle.finish();
        if report.evicted > 0 {
            tracing::warn!(
                evicted = report.evicted,
                deliveries_failed = report.deliveries_failed,
                "{} deposit(s) entered courtesy call",
                report.evicted
            );
        } else {
            tracing::debug!(evaluated = report.evaluated, "All tracked deposits healthy");
        }
        Ok(report)
    }

    async fn evaluate(&self, key: &TrackedKey) -> Result<KeyVerdict, StoreError> {
        let status = match timeout(self.settings.oracle_timeout, self.oracle.resolve(key)).await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) if !e.is_transient() => {
                tracing::warn!(%key, "Tracked key no longer resolves to a deposit: {e}");
                return Ok(KeyVerdict::Deferred);
            }
            Ok(Err(e)) => {
                tracing::warn!(%key, "Health check deferred: {e}");
                return Ok(KeyVerdict::Deferred);
            }
            Err(_) => {
                tracing::warn!(%key, "Health check deferred: oracle timed out");
                return Ok(KeyVerdict::Deferred);
            }
        };

        if !status.is_unhealthy() {
            tracing::debug!(%key, ratio = status.ratio, threshold = status.threshold, "Healthy");
            return Ok(KeyVerdict::Healthy);
        }

        let alert = CourtesyAlert::new(key.clone(), status);
        let subscribers = self.store.list_subscribers(key).await?;
        let message = alert.message();
        let results = join_all(subscribers.iter().map(|s| self.deliver(s, &message))).await;
        let delivered = results.iter().filter(|ok| **ok).count();
        let failed = results.len() - delivered;

        self.store.delete_key(key).await?;
        tracing::info!(
            %key,
            ratio = status.ratio,
            threshold = status.threshold,
            delivered,
            failed,
            "Courtesy alert sent, key evicted"
        );
        Ok(KeyVerdict::Evicted { delivered, failed })
    }

    async fn deliver(&self, subscriber: &SubscriberId, message: &str) -> bool {
        let result = timeout(
            self.settings.delivery_timeout,
            self.notifier.deliver(subscriber, message),
        )
        .await
        .unwrap_or(Err(NotificationError::Timeout));

        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(%subscriber, "Alert delivery failed: {e}");
                false
            }
        }
    }
}
