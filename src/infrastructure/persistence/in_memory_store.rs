use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::entities::keys::{SubscriberId, TrackedKey};
use crate::domain::ports::key_store::{KeyStore, StoreError};
use crate::domain::value_objects::outcome::{AddOutcome, RemoveOutcome};
use crate::domain::value_objects::scan_cursor::{ScanCursor, ScanPage};

const DEFAULT_PAGE_SIZE: usize = 10;

/// In-memory key store for tests and local runs.
///
/// Mirrors the Redis set semantics: empty sets do not exist, and `SCAN`
/// walks keys in batches with an offset cursor. Like Redis, a traversal
/// running while keys are added or removed may skip or repeat entries.
pub struct InMemoryKeyStore {
    sets: Mutex<BTreeMap<TrackedKey, BTreeSet<SubscriberId>>>,
    page_size: usize,
}

impl InMemoryKeyStore {
    #[must_use]
    pub const fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    #[must_use]
    pub const fn with_page_size(page_size: usize) -> Self {
        Self {
            sets: Mutex::new(BTreeMap::new()),
            page_size: if page_size == 0 { 1 } else { page_size },
        }
    }

    /// Number of tracked keys.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ReadFailed` if the lock is poisoned.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self
            .sets
            .lock()
            .map_err(|_| StoreError::ReadFailed("lock poisoned".into()))?
            .len())
    }

    /// Whether no key is tracked.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ReadFailed` if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

impl Default for InMemoryKeyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyStore for InMemoryKeyStore {
    async fn add_subscriber(
        &self,
        key: &TrackedKey,
        subscriber: &SubscriberId,
    ) -> Result<AddOutcome, StoreError> {
        let inserted = self
            .sets
            .lock()
            .map_err(|_| StoreError::WriteFailed("lock poisoned".into()))?
            .entry(key.clone())
            .or_default()
            .insert(subscriber.clone());
        Ok(if inserted {
            AddOutcome::Added
        } else {
            AddOutcome::AlreadyMember
        })
    }

    async fn remove_subscriber(
        &self,
        key: &TrackedKey,
        subscriber: &SubscriberId,
    ) -> Result<RemoveOutcome, StoreError> {
        let mut sets = self
            .sets
            .lock()
            .map_err(|_| StoreError::WriteFailed("lock poisoned".into()))?;
        let Some(members) = sets.get_mut(key) else {
            return Ok(RemoveOutcome::NotMember);
        };
        let removed = members.remove(subscriber);
        if members.is_empty() {
            sets.remove(key);
        }
        drop(sets);
        Ok(if removed {
            RemoveOutcome::Removed
        } else {
            RemoveOutcome::NotMember
        })
    }

    async fn scan_page(&self, cursor: ScanCursor) -> Result<ScanPage, StoreError> {
        let sets = self
            .sets
            .lock()
            .map_err(|_| StoreError::ReadFailed("lock poisoned".into()))?;
        let offset = usize::try_from(cursor.position())
            .map_err(|_| StoreError::ReadFailed(format!("cursor out of range: {cursor}")))?;
        let keys: Vec<TrackedKey> = sets
            .keys()
            .skip(offset)
            .take(self.page_size)
            .cloned()
            .collect();
        let end = offset + keys.len();
        let next = if end >= sets.len() {
            ScanCursor::START
        } else {
            ScanCursor::new(end as u64)
        };
        drop(sets);
        Ok(ScanPage { next, keys })
    }

    async fn list_subscribers(
        &self,
        key: &TrackedKey,
    ) -> Result<BTreeSet<SubscriberId>, StoreError> {
        Ok(self
            .sets
            .lock()
            .map_err(|_| StoreError::ReadFailed("lock poisoned".into()))?
            .get(key)
            .cloned()
            .unwrap_or_default())
    }

    async fn delete_key(&self, key: &TrackedKey) -> Result<(), StoreError> {
        self.sets
            .lock()
            .map_err(|_| StoreError::WriteFailed("lock poisoned".into()))?
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::domain::ports::key_store::list_keys;

    fn key(k: &str) -> TrackedKey {
        TrackedKey::from(k)
    }

    fn sub(s: &str) -> SubscriberId {
        SubscriberId::from(s)
    }

    #[tokio::test]
    async fn add_reports_first_and_repeat_membership() {
        let store = InMemoryKeyStore::new();
        let first = store.add_subscriber(&key("k"), &sub("a")).await.expect("add");
        let second = store.add_subscriber(&key("k"), &sub("a")).await.expect("add");
        assert_eq!(first, AddOutcome::Added);
        assert_eq!(second, AddOutcome::AlreadyMember);
        assert_eq!(store.len().expect("len"), 1);
    }

    #[tokio::test]
    async fn removing_last_member_deletes_key() {
        let store = InMemoryKeyStore::new();
        store.add_subscriber(&key("k"), &sub("a")).await.expect("add");
        store.add_subscriber(&key("k"), &sub("b")).await.expect("add");

        let removed = store.remove_subscriber(&key("k"), &sub("a")).await.expect("remove");
        assert_eq!(removed, RemoveOutcome::Removed);
        assert_eq!(store.len().expect("len"), 1);

        store.remove_subscriber(&key("k"), &sub("b")).await.expect("remove");
        assert!(store.is_empty().expect("is_empty"));
        assert!(list_keys(&store).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn removing_unknown_member_is_not_an_error() {
        let store = InMemoryKeyStore::new();
        let missing_key = store.remove_subscriber(&key("k"), &sub("a")).await.expect("remove");
        assert_eq!(missing_key, RemoveOutcome::NotMember);

        store.add_subscriber(&key("k"), &sub("a")).await.expect("add");
        let missing_member = store.remove_subscriber(&key("k"), &sub("z")).await.expect("remove");
        assert_eq!(missing_member, RemoveOutcome::NotMember);
        assert_eq!(
            store.list_subscribers(&key("k")).await.expect("members"),
            BTreeSet::from([sub("a")])
        );
    }

    #[tokio::test]
    async fn subscribers_of_absent_key_is_empty() {
        let store = InMemoryKeyStore::new();
        assert!(store.list_subscribers(&key("nope")).await.expect("members").is_empty());
    }

    #[tokio::test]
    async fn delete_key_drops_every_subscriber() {
        let store = InMemoryKeyStore::new();
        store.add_subscriber(&key("k"), &sub("a")).await.expect("add");
        store.add_subscriber(&key("k"), &sub("b")).await.expect("add");
        store.delete_key(&key("k")).await.expect("delete");
        assert!(store.list_subscribers(&key("k")).await.expect("members").is_empty());
        assert!(store.is_empty().expect("is_empty"));
    }

    #[tokio::test]
    async fn scan_pages_cover_every_key() {
        let store = InMemoryKeyStore::with_page_size(2);
        for i in 0..7 {
            store
                .add_subscriber(&key(&format!("k{i}")), &sub("a"))
                .await
                .expect("add");
        }

        let first = store.scan_page(ScanCursor::START).await.expect("scan");
        assert_eq!(first.keys.len(), 2);
        assert_eq!(first.next, ScanCursor::new(2));

        let keys = list_keys(&store).await.expect("list");
        assert_eq!(keys.len(), 7);
    }

    #[tokio::test]
    async fn scan_of_empty_store_terminates_immediately() {
        let store = InMemoryKeyStore::new();
        let page = store.scan_page(ScanCursor::START).await.expect("scan");
        assert!(page.keys.is_empty());
        assert!(page.next.is_terminal());
    }

    #[tokio::test]
    async fn key_listed_iff_it_has_subscribers() {
        let store = InMemoryKeyStore::with_page_size(3);
        store.add_subscriber(&key("a"), &sub("1")).await.expect("add");
        store.add_subscriber(&key("b"), &sub("1")).await.expect("add");
        store.add_subscriber(&key("b"), &sub("2")).await.expect("add");
        store.remove_subscriber(&key("a"), &sub("1")).await.expect("remove");

        for k in list_keys(&store).await.expect("list") {
            assert!(!store.list_subscribers(&k).await.expect("members").is_empty());
        }
        assert!(!list_keys(&store).await.expect("list").contains(&key("a")));
    }
}
