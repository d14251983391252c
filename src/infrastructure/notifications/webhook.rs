use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::domain::entities::keys::SubscriberId;
use crate::domain::ports::notifier::{NotificationError, Notifier};

/// Delivers messages by POSTing them to an HTTP endpoint.
///
/// The payload follows the chat `sendMessage` shape,
/// `{"chat_id": <subscriber>, "text": <message>}`, so the endpoint can be a
/// bot API URL directly or a relay in front of one.
pub struct WebhookNotifier {
    url: String,
    client: reqwest::Client,
}

impl WebhookNotifier {
    /// Creates a new webhook notifier targeting the given URL.
    ///
    /// # Errors
    ///
    /// Returns `NotificationError::ChannelUnavailable` if the HTTP client
    /// cannot be initialized (e.g. TLS backend failure).
    pub fn new(url: String, timeout: Duration) -> Result<Self, NotificationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                NotificationError::ChannelUnavailable(format!("cannot build HTTP client: {e}"))
            })?;
        Ok(Self { url, client })
    }

    fn payload(subscriber: &SubscriberId, message: &str) -> Value {
        json!({
            "chat_id": chat_id_value(subscriber),
            "text": message,
            "disable_web_page_preview": true,
        })
    }
}

/// Numeric chat ids go out as JSON numbers, anything else as a string.
fn chat_id_value(subscriber: &SubscriberId) -> Value {
    subscriber
        .as_str()
        .parse::<i64>()
        .map_or_else(|_| Value::from(subscriber.as_str()), Value::from)
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn deliver(
        &self,
        subscriber: &SubscriberId,
        message: &str,
    ) -> Result<(), NotificationError> {
        let response = self
            .client
            .post(&self.url)
            .json(&Self::payload(subscriber, message))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NotificationError::Timeout
                } else {
                    NotificationError::ChannelUnavailable(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(NotificationError::SendFailed(format!(
                "webhook answered HTTP {status} for {subscriber}"
            )))
        }
    }
}
