use std::collections::BTreeSet;
use std::sync::Arc;

use depwatch::domain::entities::keys::{SubscriberId, TrackedKey};
use depwatch::domain::ports::key_store::KeyStore;
use depwatch::domain::value_objects::outcome::{UnwatchOutcome, WatchOutcome};
use depwatch::infrastructure::oracle::static_oracle::StaticHealthOracle;
use depwatch::presentation::cli::commands::handle::respond;
use depwatch::presentation::cli::formatters::replies::{
    unwatch_reply, watch_reply, MALFORMED_ADDRESS,
};

use crate::common::{healthy, Harness, DEPOSIT, OTHER_DEPOSIT};

#[tokio::test]
async fn chat_session_watch_and_unwatch() {
    let h = Harness::new(StaticHealthOracle::new().with_status(DEPOSIT, healthy()), 10);
    let alice = SubscriberId::from(1001);
    let watch = format!("/watch {DEPOSIT}");
    let unwatch = format!("/unwatch {DEPOSIT}");

    assert_eq!(
        respond(&h.registry, &alice, &watch).await,
        watch_reply(WatchOutcome::NewlyWatched)
    );
    assert_eq!(
        respond(&h.registry, &alice, &watch).await,
        watch_reply(WatchOutcome::AlreadySubscribed)
    );
    assert_eq!(
        h.registry.tracked_keys().await.expect("keys"),
        BTreeSet::from([TrackedKey::from(DEPOSIT)])
    );

    assert_eq!(
        respond(&h.registry, &alice, &unwatch).await,
        unwatch_reply(UnwatchOutcome::Unwatched)
    );
    assert_eq!(
        respond(&h.registry, &alice, &unwatch).await,
        unwatch_reply(UnwatchOutcome::NotSubscribed)
    );
    assert!(h.registry.tracked_keys().await.expect("keys").is_empty());
}

#[tokio::test]
async fn key_survives_until_last_subscriber_leaves() {
    let h = Harness::new(StaticHealthOracle::new().with_status(DEPOSIT, healthy()), 10);
    let key = TrackedKey::from(DEPOSIT);
    let a = SubscriberId::from("a");
    let b = SubscriberId::from("b");

    h.registry.watch(&key, &a).await.expect("watch a");
    h.registry.watch(&key, &b).await.expect("watch b");
    h.registry.unwatch(&key, &a).await.expect("unwatch a");
    assert_eq!(
        h.store.list_subscribers(&key).await.expect("subscribers"),
        BTreeSet::from([b.clone()])
    );

    h.registry.unwatch(&key, &b).await.expect("unwatch b");
    assert!(h.store.is_empty().expect("is_empty"));
}

#[tokio::test]
async fn malformed_and_unknown_deposits_store_nothing() {
    let h = Harness::new(StaticHealthOracle::new(), 10);
    let sub = SubscriberId::from("9");

    assert_eq!(
        respond(&h.registry, &sub, "/watch 0xnothex").await,
        MALFORMED_ADDRESS
    );
    // Well-formed but the ledger does not know it.
    assert_eq!(
        respond(&h.registry, &sub, &format!("/watch {OTHER_DEPOSIT}")).await,
        watch_reply(WatchOutcome::Invalid)
    );
    assert!(h.store.is_empty().expect("is_empty"));
}

#[tokio::test]
async fn signer_address_subscribes_to_every_backed_deposit() {
    let signer = "0x1111111111111111111111111111111111111111";
    let oracle = StaticHealthOracle::new()
        .with_signer(
            signer,
            vec![TrackedKey::from(DEPOSIT), TrackedKey::from(OTHER_DEPOSIT)],
        )
        .with_status(DEPOSIT, healthy())
        .with_status(OTHER_DEPOSIT, healthy());
    let h = Harness::new(oracle, 10);

    let outcome = h
        .registry
        .watch(&TrackedKey::from(signer), &SubscriberId::from("9"))
        .await
        .expect("watch");
    assert_eq!(outcome, WatchOutcome::NewlyWatched);
    assert_eq!(
        h.registry.tracked_keys().await.expect("keys"),
        BTreeSet::from([TrackedKey::from(DEPOSIT), TrackedKey::from(OTHER_DEPOSIT)])
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_watches_each_register_once() {
    let h = Arc::new(Harness::new(
        StaticHealthOracle::new().with_status(DEPOSIT, healthy()),
        10,
    ));
    let key = TrackedKey::from(DEPOSIT);

    let mut handles = Vec::new();
    for i in 0..20_i64 {
        for _ in 0..2 {
            let h = Arc::clone(&h);
            let key = key.clone();
            handles.push(tokio::spawn(async move {
                h.registry
                    .watch(&key, &SubscriberId::from(i))
                    .await
                    .expect("watch")
            }));
        }
    }

    let mut newly = 0;
    for handle in handles {
        if handle.await.expect("join") == WatchOutcome::NewlyWatched {
            newly += 1;
        }
    }
    assert_eq!(newly, 20);
    assert_eq!(h.store.list_subscribers(&key).await.expect("subs").len(), 20);
}
