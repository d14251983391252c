use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;

use crate::application::services::scanner::{ScanError, Scanner, TickOutcome};

/// Run the scanner on a fixed interval until Ctrl+C.
///
/// Every tick spawns a cycle; the scanner's single-flight guard turns ticks
/// that land while a cycle is still running into no-ops. Cycle errors are
/// logged and the daemon keeps going. SIGTERM is not handled.
///
/// # Errors
///
/// Currently always returns `Ok(())` once the shutdown signal arrives.
pub async fn run_daemon(scanner: Arc<Scanner>, interval: Duration) -> anyhow::Result<()> {
    tracing::info!("Scanner started (interval: {}s)", interval.as_secs());
    run_until(scanner, interval, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
        }
    })
    .await;
    Ok(())
}

/// Tick until `shutdown` resolves, then wait for the in-flight cycle.
///
/// A cycle interrupted between alert delivery and eviction would re-alert
/// on the next start, so shutdown never abandons one.
pub async fn run_until(
    scanner: Arc<Scanner>,
    interval: Duration,
    shutdown: impl Future<Output = ()>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut cycles = JoinSet::new();

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                while cycles.try_join_next().is_some() {}
                let scanner = Arc::clone(&scanner);
                cycles.spawn(async move { log_tick(&scanner.tick().await) });
            }
            () = &mut shutdown => {
                tracing::info!("Shutdown signal received, stopping scanner");
                println!("\nStopping depwatch...");
                break;
            }
        }
    }

    if !cycles.is_empty() {
        tracing::info!("Waiting for the running cycle to finish");
    }
    while let Some(joined) = cycles.join_next().await {
        if let Err(e) = joined {
            tracing::error!("Scan cycle task failed: {e}");
        }
    }
}

fn log_tick(result: &Result<TickOutcome, ScanError>) {
    match result {
        Ok(TickOutcome::Completed(report)) => {
            tracing::info!(
                evaluated = report.evaluated,
                healthy = report.healthy,
                deferred = report.deferred,
                evicted = report.evicted,
                deliveries_failed = report.deliveries_failed,
                "Cycle complete: {} key(s) checked, {} evicted",
                report.evaluated,
                report.evicted
            );
        }
        Ok(TickOutcome::Skipped) => {
            tracing::info!("Tick dropped, previous cycle still running");
        }
        Err(e) => {
            tracing::error!("Scan cycle failed: {e}");
        }
    }
}
