use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::keys::TrackedKey;

/// How a single key came out of evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyVerdict {
    /// At or above its threshold. Left in place.
    Healthy,
    /// The oracle could not answer in time. Left in place for the next cycle.
    Deferred,
    /// Below threshold; subscribers were notified and the key removed.
    Evicted { delivered: usize, failed: usize },
}

/// Summary of one completed scan cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub started_at: DateTime<Utc>,
    pub pages: usize,
    pub keys_seen: usize,
    pub duplicates_skipped: usize,
    pub evaluated: usize,
    pub healthy: usize,
    pub deferred: usize,
    pub evicted: usize,
    pub deliveries_ok: usize,
    pub deliveries_failed: usize,
}

/// Bookkeeping for one traversal of the key space.
///
/// Created fresh for every cycle, so deduplication never leaks from one
/// cycle into the next.
pub struct ScanCycle {
    seen: HashSet<TrackedKey>,
    report: ScanReport,
}

impl ScanCycle {
    #[must_use]
    pub fn new() -> Self {
        Self {
            seen: HashSet::new(),
            report: ScanReport {
                started_at: Utc::now(),
                pages: 0,
                keys_seen: 0,
                duplicates_skipped: 0,
                evaluated: 0,
                healthy: 0,
                deferred: 0,
                evicted: 0,
                deliveries_ok: 0,
                deliveries_failed: 0,
            },
        }
    }

    /// Filter a page down to keys not yet evaluated in this cycle.
    pub fn admit(&mut self, batch: Vec<TrackedKey>) -> Vec<TrackedKey> {
        self.report.pages += 1;
        self.report.keys_seen += batch.len();
        let fresh: Vec<TrackedKey> = batch
            .into_iter()
            .filter(|key| self.seen.insert(key.clone()))
            .collect();
        self.report.duplicates_skipped = self.report.keys_seen - self.seen.len();
        fresh
    }

    pub fn record(&mut self, verdict: KeyVerdict) {
        self.report.evaluated += 1;
        match verdict {
            KeyVerdict::Healthy => self.report.healthy += 1,
            KeyVerdict::Deferred => self.report.deferred += 1,
            KeyVerdict::Evicted { delivered, failed } => {
                self.report.evicted += 1;
                self.report.deliveries_ok += delivered;
                self.report.deliveries_failed += failed;
            }
        }
    }

    #[must_use]
    pub fn finish(self) -> ScanReport {
        self.report
    }
}

impl Default for ScanCycle {
    fn default() -> Self {
        Self::new()
    }
}
