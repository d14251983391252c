use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// depwatch: deposit health watcher
///
/// Keeps a registry of who watches which deposit and periodically checks
/// every watched deposit, alerting subscribers when one falls below its
/// courtesy-call threshold.
#[derive(Parser, Debug)]
#[command(name = "depwatch")]
#[command(version, about, long_about)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to custom config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the periodic health scanner
    #[command(alias = "d")]
    Daemon,

    /// Run a single scan cycle and print the report
    #[command(alias = "sc")]
    Scan {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Subscribe to alerts for a deposit
    #[command(alias = "w")]
    Watch {
        /// Deposit (or signer) address
        key: String,

        /// Chat id that receives the alerts
        #[arg(short, long, allow_hyphen_values = true)]
        subscriber: String,
    },

    /// Unsubscribe from a deposit
    #[command(alias = "u")]
    Unwatch {
        /// Deposit address
        key: String,

        /// Chat id to unsubscribe
        #[arg(short, long, allow_hyphen_values = true)]
        subscriber: String,
    },

    /// Answer one chat command line (/start, /watch, /unwatch)
    #[command(alias = "h")]
    Handle {
        /// The raw message text
        text: String,

        /// Chat id the message came from
        #[arg(short, long, allow_hyphen_values = true)]
        subscriber: String,
    },
}
