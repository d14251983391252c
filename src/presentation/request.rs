use crate::domain::entities::keys::TrackedKey;

/// Chat commands that take a deposit address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressCommand {
    Watch,
    Unwatch,
}

/// One parsed chat line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Start,
    Watch(TrackedKey),
    Unwatch(TrackedKey),
    /// `/watch` or `/unwatch` without an address.
    MissingArgument(AddressCommand),
    /// `/watch` with something that is not shaped like an Ethereum address.
    MalformedAddress,
    Unknown,
}

/// Parse a chat line such as `/watch 0xC309D0C7DC827ea92e956324F1e540eeA6e1AEaa`.
///
/// A `@botname` suffix on the command is ignored. Only `/watch` checks the
/// address shape; `/unwatch` accepts anything so stale entries can always be
/// removed.
#[must_use]
pub fn parse(text: &str) -> Request {
    let mut words = text.split_whitespace();
    let Some(head) = words.next() else {
        return Request::Unknown;
    };
    let command = head.split_once('@').map_or(head, |(command, _)| command);

    match (command, words.next()) {
        ("/start", _) => Request::Start,
        ("/watch", None) => Request::MissingArgument(AddressCommand::Watch),
        ("/watch", Some(address)) if is_ethereum_address(address) => {
            Request::Watch(TrackedKey::new(address))
        }
        ("/watch", Some(_)) => Request::MalformedAddress,
        ("/unwatch", None) => Request::MissingArgument(AddressCommand::Unwatch),
        ("/unwatch", Some(address)) => Request::Unwatch(TrackedKey::new(address)),
        _ => Request::Unknown,
    }
}

/// `0x` followed by exactly 40 hex digits, either case.
#[must_use]
pub fn is_ethereum_address(candidate: &str) -> bool {
    candidate
        .strip_prefix("0x")
        .is_some_and(|hex| hex.len() == 40 && hex.bytes().all(|b| b.is_ascii_hexdigit()))
}
