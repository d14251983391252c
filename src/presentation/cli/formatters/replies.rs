//! Fixed texts sent back to the person issuing a command.

use crate::domain::value_objects::outcome::{UnwatchOutcome, WatchOutcome};

pub const INSTRUCTIONS: &str = "/watch {deposit_address} - Subscribe to undercollateralization alerts from a deposit\n\
eg: /watch 0xC309D0C7DC827ea92e956324F1e540eeA6e1AEaa\n\
/unwatch {deposit_address} - Unsubscribe to undercollateralization alerts from a deposit\n\
eg: /unwatch 0xC309D0C7DC827ea92e956324F1e540eeA6e1AEaa";

pub const GREETING: &str = "Hey there :)";

pub const NOT_UNDERSTOOD: &str =
    "I didn't understand your command, could you please rephrase it using one of the following commands?";

pub const MALFORMED_ADDRESS: &str = "The address provided is not a valid ethereum address, please try again with a different address";

pub const MISSING_WATCH_ADDRESS: &str =
    "You must provide the ethereum address of the deposit/TBT ID to watch";

pub const MISSING_UNWATCH_ADDRESS: &str =
    "You must provide the ethereum address of the deposit to unwatch";

pub const UNEXPECTED_ERROR: &str = "An unexpected error happened";

#[must_use]
pub const fn watch_reply(outcome: WatchOutcome) -> &'static str {
    match outcome {
        WatchOutcome::NewlyWatched => {
            "Your deposit has been registered, we will send you an update if it ever falls below \
             the first threshold (where it could get courtesy-called)."
        }
        WatchOutcome::AlreadySubscribed => "You are already subscribed to this deposit",
        WatchOutcome::Invalid => {
            "The address provided does not correspond to a tbtc deposit, aka it's not a correct \
             TBT ID, please try again with a different address"
        }
        WatchOutcome::TransientFailure => {
            "We could not check this deposit right now, please try again in a few minutes"
        }
    }
}

#[must_use]
pub const fn unwatch_reply(outcome: UnwatchOutcome) -> &'static str {
    match outcome {
        UnwatchOutcome::Unwatched => {
            "You have been successfully unsubscribed from alerts on this deposit"
        }
        UnwatchOutcome::NotSubscribed => {
            "You were not subscribed to this deposit so no action has been taken"
        }
    }
}

/// Reply to `/start`: a greeting followed by the command list.
#[must_use]
pub fn start_reply() -> String {
    format!("{GREETING}\nPlease use the following instructions to communicate with me:\n{INSTRUCTIONS}")
}

/// Reply to input that is not a known command: a greeting, an apology and
/// the command list.
#[must_use]
pub fn not_understood() -> String {
    format!("{GREETING}\n{NOT_UNDERSTOOD}\n{INSTRUCTIONS}")
}
