//! Cache storage backends.
//!
//! The catalog cache talks to storage through the `CacheStore` capability
//! trait; the in-process `MemoryStore` is the default backend. Callers
//! treat every error as a miss, so a flaky backend degrades hit rate but
//! never correctness.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheStoreError {
    #[error("cache store unavailable: {0}")]
    Unavailable(String),
}

/// Byte-oriented cache storage with TTL and prefix deletion.
///
/// Implementations must honor two contracts: an expired entry is never
/// returned from `get`, and `delete_prefix` removes exactly the entries
/// whose key starts with the given prefix.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheStoreError>;

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheStoreError>;

    async fn delete(&self, keys: &[String]) -> Result<(), CacheStoreError>;

    async fn delete_prefix(&self, prefix: &str) -> Result<(), CacheStoreError>;

    async fn clear(&self) -> Result<(), CacheStoreError>;
}

struct StoredEntry {
    value: Bytes,
    expires_at: Instant,
}

/// In-process cache backend over a concurrent map.
///
/// Expiry is lazy: an entry past its deadline is dropped on the read that
/// finds it, not by a background sweeper.
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, StoredEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheStoreError> {
        let expired = match self.entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                return Ok(Some(entry.value.clone()));
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheStoreError> {
        let entry = StoredEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<(), CacheStoreError> {
        for key in keys {
            self.entries.remove(key);
        }
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<(), CacheStoreError> {
        self.entries.retain(|key, _| !key.starts_with(prefix));
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheStoreError> {
        self.entries.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let store = MemoryStore::new();

        store
            .set("menus", Bytes::from_static(b"[]"), TTL)
            .await
            .unwrap();

        let value = store.get("menus").await.unwrap();
        assert_eq!(value, Some(Bytes::from_static(b"[]")));
    }

    #[tokio::test]
    async fn get_missing_key_returns_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get("absent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn expired_entry_reads_as_miss_and_is_dropped() {
        let store = MemoryStore::new();

        store
            .set("menus", Bytes::from_static(b"[]"), Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(store.get("menus").await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn delete_removes_exact_keys_only() {
        let store = MemoryStore::new();

        store
            .set("menus", Bytes::from_static(b"a"), TTL)
            .await
            .unwrap();
        store
            .set("menus/1111", Bytes::from_static(b"b"), TTL)
            .await
            .unwrap();

        store.delete(&["menus".to_string()]).await.unwrap();

        assert_eq!(store.get("menus").await.unwrap(), None);
        assert!(store.get("menus/1111").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn delete_prefix_removes_the_subtree() {
        let store = MemoryStore::new();

        store
            .set("menus/aa/submenus/bb", Bytes::from_static(b"s"), TTL)
            .await
            .unwrap();
        store
            .set(
                "menus/aa/submenus/bb/dishes/cc",
                Bytes::from_static(b"d"),
                TTL,
            )
            .await
            .unwrap();
        store
            .set("menus/aa/submenus/zz", Bytes::from_static(b"z"), TTL)
            .await
            .unwrap();

        store.delete_prefix("menus/aa/submenus/bb").await.unwrap();

        assert_eq!(store.get("menus/aa/submenus/bb").await.unwrap(), None);
        assert_eq!(
            store.get("menus/aa/submenus/bb/dishes/cc").await.unwrap(),
            None
        );
        assert!(store.get("menus/aa/submenus/zz").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn clear_empties_the_store() {
        let store = MemoryStore::new();

        store
            .set("menus", Bytes::from_static(b"a"), TTL)
            .await
            .unwrap();
        store
            .set("tree", Bytes::from_static(b"t"), TTL)
            .await
            .unwrap();

        store.clear().await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn set_overwrites_existing_entry() {
        let store = MemoryStore::new();

        store
            .set("tree", Bytes::from_static(b"old"), TTL)
            .await
            .unwrap();
        store
            .set("tree", Bytes::from_static(b"new"), TTL)
            .await
            .unwrap();

        assert_eq!(
            store.get("tree").await.unwrap(),
            Some(Bytes::from_static(b"new"))
        );
    }
}
