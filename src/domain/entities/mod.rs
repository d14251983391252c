pub mod alert;
pub mod health;
pub mod keys;

pub use alert::CourtesyAlert;
pub use health::HealthStatus;
pub use keys::{SubscriberId, TrackedKey};
