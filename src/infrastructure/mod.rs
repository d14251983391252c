pub mod notifications;
pub mod oracle;
pub mod persistence;
