use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::keys::SubscriberId;

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("failed to send notification: {0}")]
    SendFailed(String),
    #[error("notification channel unavailable: {0}")]
    ChannelUnavailable(String),
    #[error("notification timed out")]
    Timeout,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `message` to a single subscriber.
    ///
    /// # Errors
    ///
    /// Returns `NotificationError` if the message could not be handed to the
    /// delivery channel. Callers log and move on; nothing is retried.
    async fn deliver(&self, subscriber: &SubscriberId, message: &str)
        -> Result<(), NotificationError>;
}
