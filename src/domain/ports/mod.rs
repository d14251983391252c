pub mod health_oracle;
pub mod key_store;
pub mod notifier;

pub use health_oracle::{HealthOracle, OracleError};
pub use key_store::{list_keys, KeyPager, KeyStore, StoreError};
pub use notifier::{NotificationError, Notifier};
