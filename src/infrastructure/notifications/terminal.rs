use std::borrow::Cow;

use async_trait::async_trait;
use colored::Colorize;

use crate::domain::entities::keys::SubscriberId;
use crate::domain::ports::notifier::{NotificationError, Notifier};

const SEPARATOR_WIDTH: usize = 70;

/// Prints deliveries to stdout. Used when no delivery endpoint is configured.
#[derive(Default)]
pub struct TerminalNotifier;

impl TerminalNotifier {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for TerminalNotifier {
    async fn deliver(
        &self,
        subscriber: &SubscriberId,
        message: &str,
    ) -> Result<(), NotificationError> {
        let separator = "\u{2500}".repeat(SEPARATOR_WIDTH);

        println!("\n{}", separator.dimmed());
        println!(
            "{} {}",
            " ALERT ".on_red().white().bold(),
            format!("\u{2192} {}", sanitize(subscriber.as_str())).bold()
        );
        println!("{}", separator.dimmed());
        println!("{}", sanitize(message));
        println!("{}\n", separator.dimmed());
        Ok(())
    }
}

const fn is_stripped(c: char) -> bool {
    matches!(c as u32, 0x00..=0x08 | 0x0B..=0x0C | 0x0E..=0x1F | 0x7F..=0x9F)
}

/// Strip C0 and C1 control characters (which also defuses ANSI escape
/// sequences) from a string, preserving printable content, newlines, and tabs.
fn sanitize(s: &str) -> Cow<'_, str> {
    if s.chars().any(is_stripped) {
        Cow::Owned(s.chars().filter(|&c| !is_stripped(c)).collect())
    } else {
        Cow::Borrowed(s)
    }
}
