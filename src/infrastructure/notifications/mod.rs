pub mod terminal;
pub mod webhook;

pub use terminal::TerminalNotifier;
pub use webhook::WebhookNotifier;
