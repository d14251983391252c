use std::collections::BTreeSet;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::keys::{SubscriberId, TrackedKey};
use crate::domain::value_objects::outcome::{AddOutcome, RemoveOutcome};
use crate::domain::value_objects::scan_cursor::{ScanCursor, ScanPage};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("key store unavailable: {0}")]
    Unavailable(String),
    #[error("storage read failed: {0}")]
    ReadFailed(String),
    #[error("storage write failed: {0}")]
    WriteFailed(String),
}

/// Durable mapping from tracked key to its set of subscribers.
///
/// Every method is a single atomic round trip against the backing store.
/// A key exists exactly as long as its subscriber set is non-empty.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Add `subscriber` to the set of `key`, creating the set if absent.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing store is unreachable or rejects the write.
    async fn add_subscriber(
        &self,
        key: &TrackedKey,
        subscriber: &SubscriberId,
    ) -> Result<AddOutcome, StoreError>;

    /// Remove `subscriber` from the set of `key`. Removing the last member
    /// deletes the key. Unknown keys and members are not an error.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing store is unreachable or rejects the write.
    async fn remove_subscriber(
        &self,
        key: &TrackedKey,
        subscriber: &SubscriberId,
    ) -> Result<RemoveOutcome, StoreError>;

    /// Fetch one batch of tracked keys starting at `cursor`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing store is unreachable.
    async fn scan_page(&self, cursor: ScanCursor) -> Result<ScanPage, StoreError>;

    /// All current subscribers of `key`; empty when the key is absent.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing store is unreachable.
    async fn list_subscribers(&self, key: &TrackedKey) -> Result<BTreeSet<SubscriberId>, StoreError>;

    /// Drop `key` and all of its subscribers.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing store is unreachable or rejects the write.
    async fn delete_key(&self, key: &TrackedKey) -> Result<(), StoreError>;
}

/// Lazy traversal of every tracked key, one `SCAN` batch at a time.
///
/// Always starts from cursor `0`. Keys created or deleted during the
/// traversal may or may not show up, and a key can be yielded more than once.
pub struct KeyPager<'a> {
    store: &'a dyn KeyStore,
    cursor: ScanCursor,
    finished: bool,
}

impl<'a> KeyPager<'a> {
    #[must_use]
    pub fn new(store: &'a dyn KeyStore) -> Self {
        Self {
            store,
            cursor: ScanCursor::START,
            finished: false,
        }
    }

    /// Next batch of keys, or `None` once the store returned the terminal cursor.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if fetching the batch fails. The pager is left
    /// where it was, so the caller decides whether to give up.
    pub async fn next_page(&mut self) -> Result<Option<Vec<TrackedKey>>, StoreError> {
        if self.finished {
            return Ok(None);
        }
        let page = self.store.scan_page(self.cursor).await?;
        self.cursor = page.next;
        self.finished = page.next.is_terminal();
        Ok(Some(page.keys))
    }
}

/// Drain a full traversal into a set.
///
/// # Errors
///
/// Returns the first `StoreError` raised by the traversal.
pub async fn list_keys(store: &dyn KeyStore) -> Result<BTreeSet<TrackedKey>, StoreError> {
    let mut pager = KeyPager::new(store);
    let mut keys = BTreeSet::new();
    while let Some(batch) = pager.next_page().await? {
        keys.extend(batch);
    }
    Ok(keys)
}
