use crate::application::services::registry::Registry;
use crate::domain::entities::keys::SubscriberId;
use crate::presentation::cli::commands::watch::{unwatch_and_reply, watch_and_reply};
use crate::presentation::cli::formatters::replies::{
    not_understood, start_reply, MALFORMED_ADDRESS, MISSING_UNWATCH_ADDRESS,
    MISSING_WATCH_ADDRESS,
};
use crate::presentation::request::{parse, AddressCommand, Request};

/// Answer one chat line from `subscriber`.
///
/// Malformed input never reaches the registry.
pub async fn respond(registry: &Registry, subscriber: &SubscriberId, text: &str) -> String {
    match parse(text) {
        Request::Start => start_reply(),
        Request::Watch(key) => watch_and_reply(registry, &key, subscriber).await,
        Request::Unwatch(key) => unwatch_and_reply(registry, &key, subscriber).await,
        Request::MissingArgument(AddressCommand::Watch) => MISSING_WATCH_ADDRESS.to_string(),
        Request::MissingArgument(AddressCommand::Unwatch) => MISSING_UNWATCH_ADDRESS.to_string(),
        Request::MalformedAddress => MALFORMED_ADDRESS.to_string(),
        Request::Unknown => {
            tracing::debug!(%subscriber, "unrecognized input");
            not_understood()
        }
    }
}

/// `depwatch handle "<text>" --subscriber <id>`
pub async fn run_handle(registry: &Registry, subscriber: &SubscriberId, text: &str) {
    println!("{}", respond(registry, subscriber, text).await);
}
