use std::time::Duration;

use depwatch::application::services::scanner::TickOutcome;
use depwatch::application::services::ScanReport;
use depwatch::domain::entities::keys::{SubscriberId, TrackedKey};
use depwatch::domain::value_objects::outcome::WatchOutcome;
use depwatch::infrastructure::oracle::static_oracle::StaticHealthOracle;

use crate::common::{healthy, undercollateralized, Harness, DEPOSIT, OTHER_DEPOSIT};

async fn run(h: &Harness) -> ScanReport {
    match h.scanner.tick().await.expect("tick") {
        TickOutcome::Completed(report) => report,
        TickOutcome::Skipped => panic!("tick unexpectedly skipped"),
    }
}

#[tokio::test]
async fn courtesy_call_alerts_once_and_allows_resubscribe() {
    let h = Harness::new(
        StaticHealthOracle::new()
            .with_status(DEPOSIT, healthy())
            .with_status(OTHER_DEPOSIT, healthy()),
        10,
    );
    let key = TrackedKey::from(DEPOSIT);
    let other = TrackedKey::from(OTHER_DEPOSIT);
    for sub in ["A", "B"] {
        h.registry
            .watch(&key, &SubscriberId::from(sub))
            .await
            .expect("watch");
    }
    h.registry
        .watch(&other, &SubscriberId::from("A"))
        .await
        .expect("watch");

    // Everything healthy: nothing happens.
    let report = run(&h).await;
    assert_eq!(report.healthy, 2);
    assert!(h.notifier.deliveries().is_empty());

    // The deposit drops below its threshold.
    h.oracle.set_status(DEPOSIT, undercollateralized());
    let report = run(&h).await;
    assert_eq!(report.evicted, 1);
    assert_eq!(report.healthy, 1);

    let deliveries = h.notifier.deliveries();
    assert_eq!(deliveries.len(), 2);
    assert_eq!(deliveries[0].0, SubscriberId::from("A"));
    assert_eq!(deliveries[1].0, SubscriberId::from("B"));
    assert!(deliveries[0].1.contains(&format!("/watch {DEPOSIT}")));

    // Evicted: the next cycle does not alert again, the healthy key stays.
    run(&h).await;
    assert_eq!(h.notifier.deliveries().len(), 2);
    assert_eq!(
        h.registry.tracked_keys().await.expect("keys").into_iter().collect::<Vec<_>>(),
        vec![other]
    );

    let again = h
        .registry
        .watch(&key, &SubscriberId::from("A"))
        .await
        .expect("watch");
    assert_eq!(again, WatchOutcome::NewlyWatched);
}

#[tokio::test]
async fn every_key_is_checked_exactly_once_across_pages() {
    let mut oracle = StaticHealthOracle::new();
    let keys: Vec<String> = (0..25).map(|i| format!("0x{i:040x}")).collect();
    for key in &keys {
        oracle = oracle.with_status(key.as_str(), healthy());
    }
    let h = Harness::new(oracle, 3);
    for key in &keys {
        h.registry
            .watch(&TrackedKey::from(key.as_str()), &SubscriberId::from("ops"))
            .await
            .expect("watch");
    }

    let report = run(&h).await;
    assert_eq!(report.evaluated, 25);
    assert_eq!(report.pages, 9);
    for key in &keys {
        // One resolve during watch, one during the scan.
        assert_eq!(h.oracle.resolve_count(&TrackedKey::from(key.as_str())), 2);
    }
}

#[tokio::test(start_paused = true)]
async fn hung_oracle_defers_one_key_without_blocking_others() {
    let h = Harness::new(
        StaticHealthOracle::new()
            .with_status(DEPOSIT, undercollateralized())
            .with_status(OTHER_DEPOSIT, undercollateralized()),
        10,
    );
    for key in [DEPOSIT, OTHER_DEPOSIT] {
        h.registry
            .watch(&TrackedKey::from(key), &SubscriberId::from("A"))
            .await
            .expect("watch");
    }
    h.oracle.set_delay(DEPOSIT, Some(Duration::from_secs(3600)));

    let report = run(&h).await;
    assert_eq!(report.deferred, 1);
    assert_eq!(report.evicted, 1);
    assert_eq!(
        h.registry.tracked_keys().await.expect("keys").into_iter().collect::<Vec<_>>(),
        vec![TrackedKey::from(DEPOSIT)]
    );

    // Oracle recovers: the deferred key is handled on the next cycle.
    h.oracle.set_delay(DEPOSIT, None);
    let report = run(&h).await;
    assert_eq!(report.evicted, 1);
    assert!(h.registry.tracked_keys().await.expect("keys").is_empty());
    assert_eq!(h.notifier.deliveries().len(), 2);
}
