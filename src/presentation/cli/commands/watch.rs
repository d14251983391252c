use colored::Colorize;

use crate::application::services::registry::Registry;
use crate::domain::entities::keys::{SubscriberId, TrackedKey};
use crate::presentation::cli::formatters::replies::{unwatch_reply, watch_reply, UNEXPECTED_ERROR};

/// Subscribe and return the reply to show the subscriber.
pub async fn watch_and_reply(
    registry: &Registry,
    key: &TrackedKey,
    subscriber: &SubscriberId,
) -> String {
    match registry.watch(key, subscriber).await {
        Ok(outcome) => watch_reply(outcome).to_string(),
        Err(e) => {
            tracing::error!(%key, %subscriber, "watch failed: {e}");
            UNEXPECTED_ERROR.to_string()
        }
    }
}

/// Unsubscribe and return the reply to show the subscriber.
pub async fn unwatch_and_reply(
    registry: &Registry,
    key: &TrackedKey,
    subscriber: &SubscriberId,
) -> String {
    match registry.unwatch(key, subscriber).await {
        Ok(outcome) => unwatch_reply(outcome).to_string(),
        Err(e) => {
            tracing::error!(%key, %subscriber, "unwatch failed: {e}");
            UNEXPECTED_ERROR.to_string()
        }
    }
}

/// `depwatch watch <key> --subscriber <id>`
pub async fn run_watch(registry: &Registry, key: &TrackedKey, subscriber: &SubscriberId) {
    let reply = watch_and_reply(registry, key, subscriber).await;
    println!("{} {}", format!("[{subscriber}]").dimmed(), reply);
}

/// `depwatch unwatch <key> --subscriber <id>`
pub async fn run_unwatch(registry: &Registry, key: &TrackedKey, subscriber: &SubscriberId) {
    let reply = unwatch_and_reply(registry, key, subscriber).await;
    println!("{} {}", format!("[{subscriber}]").dimmed(), reply);
}
