use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use depwatch::application::services::registry::Registry;
use depwatch::application::services::scanner::{ScanSettings, Scanner};
use depwatch::domain::entities::health::HealthStatus;
use depwatch::domain::entities::keys::SubscriberId;
use depwatch::domain::ports::notifier::{NotificationError, Notifier};
use depwatch::infrastructure::oracle::static_oracle::StaticHealthOracle;
use depwatch::infrastructure::persistence::in_memory_store::InMemoryKeyStore;

pub const DEPOSIT: &str = "0xC309D0C7DC827ea92e956324F1e540eeA6e1AEaa";
pub const OTHER_DEPOSIT: &str = "0x8a5a1d8e4c1f0c9f1b07f4c5d2e8e0a4b1d3c7e2";

pub const SETTINGS: ScanSettings = ScanSettings {
    oracle_timeout: Duration::from_secs(10),
    delivery_timeout: Duration::from_secs(5),
    max_concurrent_checks: 4,
};

pub const fn healthy() -> HealthStatus {
    HealthStatus::new(160.0, 125.0)
}

pub const fn undercollateralized() -> HealthStatus {
    HealthStatus::new(118.5, 125.0)
}

// ---------------------------------------------------------------------------
// TrackingNotifier
// ---------------------------------------------------------------------------

pub struct TrackingNotifier {
    deliveries: Mutex<Vec<(SubscriberId, String)>>,
}

impl TrackingNotifier {
    pub const fn new() -> Self {
        Self {
            deliveries: Mutex::new(vec![]),
        }
    }

    pub fn deliveries(&self) -> Vec<(SubscriberId, String)> {
        let mut all = self.deliveries.lock().expect("lock").clone();
        all.sort();
        all
    }
}

#[async_trait]
impl Notifier for TrackingNotifier {
    async fn deliver(
        &self,
        subscriber: &SubscriberId,
        message: &str,
    ) -> Result<(), NotificationError> {
        self.deliveries
            .lock()
            .expect("lock")
            .push((subscriber.clone(), message.to_string()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

pub struct Harness {
    pub store: Arc<InMemoryKeyStore>,
    pub oracle: Arc<StaticHealthOracle>,
    pub notifier: Arc<TrackingNotifier>,
    pub registry: Registry,
    pub scanner: Scanner,
}

impl Harness {
    pub fn new(oracle: StaticHealthOracle, page_size: usize) -> Self {
        let store = Arc::new(InMemoryKeyStore::with_page_size(page_size));
        let oracle = Arc::new(oracle);
        let notifier = Arc::new(TrackingNotifier::new());
        let registry = Registry::new(store.clone(), oracle.clone(), SETTINGS.oracle_timeout);
        let scanner = Scanner::new(store.clone(), oracle.clone(), notifier.clone(), SETTINGS);
        Self {
            store,
            oracle,
            notifier,
            registry,
            scanner,
        }
    }
}
