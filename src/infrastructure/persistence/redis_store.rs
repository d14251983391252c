use std::collections::BTreeSet;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisError};

use crate::domain::entities::keys::{SubscriberId, TrackedKey};
use crate::domain::ports::key_store::{KeyStore, StoreError};
use crate::domain::value_objects::outcome::{AddOutcome, RemoveOutcome};
use crate::domain::value_objects::scan_cursor::{ScanCursor, ScanPage};

/// Redis-backed key store: one Redis set per tracked key.
///
/// Each tracked key is stored as `{prefix}{key}` and holds the subscriber ids
/// as set members. Redis drops a set once its last member is removed, which
/// keeps "key exists iff it has subscribers" true without extra bookkeeping.
pub struct RedisKeyStore {
    conn: ConnectionManager,
    key_prefix: String,
    scan_count: usize,
}

impl RedisKeyStore {
    /// Connect to `url` (e.g. `redis://127.0.0.1/`).
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the URL is malformed or the
    /// initial connection cannot be established.
    pub async fn connect(
        url: &str,
        key_prefix: impl Into<String>,
        scan_count: usize,
    ) -> Result<Self, StoreError> {
        let client = redis::Client::open(url).map_err(unavailable)?;
        let conn = ConnectionManager::new(client).await.map_err(unavailable)?;
        Ok(Self {
            conn,
            key_prefix: key_prefix.into(),
            scan_count: scan_count.max(1),
        })
    }

    fn storage_key(&self, key: &TrackedKey) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    fn match_pattern(&self) -> String {
        format!("{}*", escape_glob(&self.key_prefix))
    }
}

/// Strip the namespace prefix from a raw Redis key. Keys outside the
/// namespace, or the bare prefix itself, are ignored.
fn tracked_key(prefix: &str, raw: &str) -> Option<TrackedKey> {
    raw.strip_prefix(prefix)
        .filter(|k| !k.is_empty())
        .map(TrackedKey::new)
}

fn unavailable(e: RedisError) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

fn read_failed(e: RedisError) -> StoreError {
    if e.is_io_error() || e.is_connection_dropped() || e.is_timeout() {
        unavailable(e)
    } else {
        StoreError::ReadFailed(e.to_string())
    }
}

fn write_failed(e: RedisError) -> StoreError {
    if e.is_io_error() || e.is_connection_dropped() || e.is_timeout() {
        unavailable(e)
    } else {
        StoreError::WriteFailed(e.to_string())
    }
}

/// Escape the glob metacharacters Redis honours in `MATCH` patterns.
fn escape_glob(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl KeyStore for RedisKeyStore {
    async fn add_subscriber(
        &self,
        key: &TrackedKey,
        subscriber: &SubscriberId,
    ) -> Result<AddOutcome, StoreError> {
        let mut conn = self.conn.clone();
        let added: i64 = conn
            .sadd(self.storage_key(key), subscriber.as_str())
            .await
            .map_err(write_failed)?;
        Ok(AddOutcome::from_added_count(added))
    }

    async fn remove_subscriber(
        &self,
        key: &TrackedKey,
        subscriber: &SubscriberId,
    ) -> Result<RemoveOutcome, StoreError> {
        let mut conn = self.conn.clone();
        let removed: i64 = conn
            .srem(self.storage_key(key), subscriber.as_str())
            .await
            .map_err(write_failed)?;
        Ok(RemoveOutcome::from_removed_count(removed))
    }

    async fn scan_page(&self, cursor: ScanCursor) -> Result<ScanPage, StoreError> {
        let mut conn = self.conn.clone();
        let (next, raw_keys): (u64, Vec<String>) = redis::cmd("SCAN")
            .arg(cursor.position())
            .arg("MATCH")
            .arg(self.match_pattern())
            .arg("COUNT")
            .arg(self.scan_count)
            .query_async(&mut conn)
            .await
            .map_err(read_failed)?;
        let keys = raw_keys
            .iter()
            .filter_map(|raw| tracked_key(&self.key_prefix, raw))
            .collect();
        Ok(ScanPage {
            next: ScanCursor::new(next),
            keys,
        })
    }

    async fn list_subscribers(
        &self,
        key: &TrackedKey,
    ) -> Result<BTreeSet<SubscriberId>, StoreError> {
        let mut conn = self.conn.clone();
        let members: Vec<String> = conn
            .smembers(self.storage_key(key))
            .await
            .map_err(read_failed)?;
        Ok(members.into_iter().map(SubscriberId::new).collect())
    }

    async fn delete_key(&self, key: &TrackedKey) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: i64 = conn
            .del(self.storage_key(key))
            .await
            .map_err(write_failed)?;
        Ok(())
    }
}
