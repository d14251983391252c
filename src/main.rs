use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use depwatch::application::config::AppConfig;
use depwatch::application::services::registry::Registry;
use depwatch::application::services::scanner::{ScanSettings, Scanner};
use depwatch::domain::entities::keys::{SubscriberId, TrackedKey};
use depwatch::domain::ports::health_oracle::HealthOracle;
use depwatch::domain::ports::key_store::KeyStore;
use depwatch::domain::ports::notifier::Notifier;
use depwatch::infrastructure::notifications::terminal::TerminalNotifier;
use depwatch::infrastructure::notifications::webhook::WebhookNotifier;
use depwatch::infrastructure::oracle::http_oracle::HttpHealthOracle;
use depwatch::infrastructure::persistence::redis_store::RedisKeyStore;
use depwatch::presentation::cli::app::{Cli, Commands};
use depwatch::presentation::cli::commands::daemon::run_daemon;
use depwatch::presentation::cli::commands::handle::run_handle;
use depwatch::presentation::cli::commands::scan::run_scan;
use depwatch::presentation::cli::commands::watch::{run_unwatch, run_watch};

fn print_banner() {
    println!("{}", "━".repeat(40).cyan());
    println!("{}", "  DEPWATCH  Deposit Health Watcher".bold().cyan());
    println!("{}", "━".repeat(40).cyan());
}

fn setup_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn build_notifier(config: &AppConfig) -> anyhow::Result<Arc<dyn Notifier>> {
    match config.notifications.endpoint {
        Some(ref url) => {
            let notifier = WebhookNotifier::new(url.clone(), config.scanner.delivery_timeout())
                .context("Failed to build webhook notifier")?;
            Ok(Arc::new(notifier))
        }
        None => {
            tracing::info!("No notification endpoint configured, alerts go to the terminal");
            Ok(Arc::new(TerminalNotifier::new()))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose);

    // Load configuration, environment wins over the file
    let config = if let Some(ref path) = cli.config {
        AppConfig::load_from(path)?
    } else {
        AppConfig::load()?
    };
    let config = config.with_env_overrides();

    // Manual DI: concrete adapters are only named here
    let store: Arc<dyn KeyStore> = Arc::new(
        RedisKeyStore::connect(
            &config.store.url,
            config.store.key_prefix.clone(),
            config.store.scan_count,
        )
        .await
        .context("Failed to connect to the key store")?,
    );
    let oracle: Arc<dyn HealthOracle> = Arc::new(
        HttpHealthOracle::new(&config.oracle.endpoint, config.scanner.oracle_timeout())
            .context("Failed to build health oracle client")?,
    );
    let registry = Registry::new(
        Arc::clone(&store),
        Arc::clone(&oracle),
        config.scanner.oracle_timeout(),
    );

    match cli.command {
        Some(Commands::Watch { key, subscriber }) => {
            run_watch(&registry, &TrackedKey::new(key), &SubscriberId::new(subscriber)).await;
        }
        Some(Commands::Unwatch { key, subscriber }) => {
            run_unwatch(&registry, &TrackedKey::new(key), &SubscriberId::new(subscriber)).await;
        }
        Some(Commands::Handle { text, subscriber }) => {
            run_handle(&registry, &SubscriberId::new(subscriber), &text).await;
        }
        Some(Commands::Scan { json }) => {
            let scanner = Scanner::new(
                store,
                oracle,
                build_notifier(&config)?,
                ScanSettings::from(&config.scanner),
            );
            run_scan(&scanner, json).await?;
        }
        Some(Commands::Daemon) | None => {
            let scanner = Arc::new(Scanner::new(
                store,
                oracle,
                build_notifier(&config)?,
                ScanSettings::from(&config.scanner),
            ));
            print_banner();
            run_daemon(scanner, config.scanner.interval()).await?;
        }
    }

    Ok(())
}
