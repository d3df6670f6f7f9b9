use super::{CacheError, CacheStore};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
enum Slot {
    Text(String),
    Hash(BTreeMap<String, String>),
}

#[derive(Debug, Clone)]
struct Entry {
    slot: Slot,
    expires_at: Option<Instant>,
}

impl Entry {
    fn new(slot: Slot, ttl: Option<Duration>) -> Self {
        Self {
            slot,
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

fn parse_int(key: &str, field: &str, raw: &str) -> Result<i64, CacheError> {
    raw.parse().map_err(|_| CacheError::NotAnInteger {
        key: key.to_string(),
        field: field.to_string(),
    })
}

/// In-memory [`CacheStore`] backed by `DashMap`.
///
/// Expired entries are evicted lazily when touched, or in bulk by
/// [`MemoryCache::evict_expired`] (which `ShopSystem` runs periodically through
/// [`CacheStore::purge_expired`]). Clones share the same map.
#[derive(Clone, Default)]
pub struct MemoryCache {
    inner: Arc<DashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove all expired entries. Returns how many were dropped.
    pub fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let mut dropped = 0;
        self.inner.retain(|_, entry| {
            let expired = entry.is_expired(now);
            dropped += usize::from(expired);
            !expired
        });
        dropped
    }

    /// Number of stored keys, expired ones included until they are evicted.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn drop_if_expired(&self, key: &str) {
        let now = Instant::now();
        self.inner.remove_if(key, |_, entry| entry.is_expired(now));
    }

    /// Runs `f` on the live hash at `key`, creating an empty one if needed.
    fn with_hash<R>(
        &self,
        key: &str,
        f: impl FnOnce(&mut BTreeMap<String, String>) -> Result<R, CacheError>,
    ) -> Result<R, CacheError> {
        self.drop_if_expired(key);
        let mut entry = self
            .inner
            .entry(key.to_string())
            .or_insert_with(|| Entry::new(Slot::Hash(BTreeMap::new()), None));
        let result = match &mut entry.slot {
            Slot::Hash(map) => f(map),
            Slot::Text(_) => return Err(CacheError::WrongType(key.to_string())),
        };
        let emptied = matches!(&entry.slot, Slot::Hash(map) if map.is_empty());
        drop(entry);
        if emptied {
            self.inner
                .remove_if(key, |_, e| matches!(&e.slot, Slot::Hash(map) if map.is_empty()));
        }
        result
    }

    fn read_hash<R>(
        &self,
        key: &str,
        f: impl FnOnce(&BTreeMap<String, String>) -> R,
    ) -> Result<Option<R>, CacheError> {
        self.drop_if_expired(key);
        match self.inner.get(key) {
            None => Ok(None),
            Some(entry) => match &entry.slot {
                Slot::Hash(map) => Ok(Some(f(map))),
                Slot::Text(_) => Err(CacheError::WrongType(key.to_string())),
            },
        }
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.drop_if_expired(key);
        match self.inner.get(key) {
            None => Ok(None),
            Some(entry) => match &entry.slot {
                Slot::Text(value) => Ok(Some(value.clone())),
                Slot::Hash(_) => Err(CacheError::WrongType(key.to_string())),
            },
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), CacheError> {
        self.inner
            .insert(key.to_string(), Entry::new(Slot::Text(value), ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        self.drop_if_expired(key);
        Ok(self.inner.remove(key).is_some())
    }

    async fn increment(&self, key: &str, by: i64) -> Result<i64, CacheError> {
        self.drop_if_expired(key);
        let mut entry = self
            .inner
            .entry(key.to_string())
            .or_insert_with(|| Entry::new(Slot::Text("0".into()), None));
        match &mut entry.slot {
            Slot::Text(raw) => {
                let next = parse_int(key, "", raw)? + by;
                *raw = next.to_string();
                Ok(next)
            }
            Slot::Hash(_) => Err(CacheError::WrongType(key.to_string())),
        }
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, CacheError> {
        self.drop_if_expired(key);
        match self.inner.get_mut(key) {
            Some(mut entry) => {
                entry.expires_at = Some(Instant::now() + ttl);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>, CacheError> {
        Ok(self.read_hash(key, |map| map.get(field).cloned())?.flatten())
    }

    async fn hash_set(&self, key: &str, field: &str, value: String) -> Result<(), CacheError> {
        self.with_hash(key, |map| {
            map.insert(field.to_string(), value);
            Ok(())
        })
    }

    async fn hash_increment(&self, key: &str, field: &str, by: i64) -> Result<i64, CacheError> {
        self.with_hash(key, |map| {
            let current = match map.get(field) {
                Some(raw) => parse_int(key, field, raw)?,
                None => 0,
            };
            let next = current + by;
            map.insert(field.to_string(), next.to_string());
            Ok(next)
        })
    }

    async fn hash_delete(&self, key: &str, field: &str) -> Result<bool, CacheError> {
        if self.read_hash(key, |_| ())?.is_none() {
            return Ok(false);
        }
        self.with_hash(key, |map| Ok(map.remove(field).is_some()))
    }

    async fn hash_entries(&self, key: &str) -> Result<Vec<(String, String)>, CacheError> {
        Ok(self
            .read_hash(key, |map| {
                map.iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect::<Vec<_>>()
            })?
            .unwrap_or_default())
    }

    async fn purge_expired(&self) -> Result<usize, CacheError> {
        Ok(self.evict_expired())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_text_values_and_ttl() {
        let cache = MemoryCache::new();
        cache
            .set("a", "1".into(), Some(Duration::from_millis(20)))
            .await
            .unwrap();
        cache.set("b", "2".into(), None).await.unwrap();
        assert_eq!(cache.get("a").await.unwrap().as_deref(), Some("1"));

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(cache.get("a").await.unwrap().is_none());
        assert_eq!(cache.get("b").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_evict_expired_drops_only_stale_keys() {
        let cache = MemoryCache::new();
        cache
            .set("old", "x".into(), Some(Duration::from_millis(10)))
            .await
            .unwrap();
        cache.set("new", "y".into(), None).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.evict_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.purge_expired().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_counters() {
        let cache = MemoryCache::new();
        assert_eq!(cache.increment("views", 1).await.unwrap(), 1);
        assert_eq!(cache.increment("views", 2).await.unwrap(), 3);

        cache.set("name", "widget".into(), None).await.unwrap();
        assert!(matches!(
            cache.increment("name", 1).await,
            Err(CacheError::NotAnInteger { .. })
        ));
    }

    #[tokio::test]
    async fn test_hash_fields() {
        let cache = MemoryCache::new();
        assert_eq!(cache.hash_increment("cart", "2", 3).await.unwrap(), 3);
        assert_eq!(cache.hash_increment("cart", "2", 2).await.unwrap(), 5);
        cache.hash_set("cart", "1", "7".into()).await.unwrap();

        assert_eq!(
            cache.hash_entries("cart").await.unwrap(),
            vec![("1".into(), "7".into()), ("2".into(), "5".into())]
        );
        assert_eq!(cache.hash_get("cart", "1").await.unwrap().as_deref(), Some("7"));

        assert!(cache.hash_delete("cart", "1").await.unwrap());
        assert!(!cache.hash_delete("cart", "1").await.unwrap());
        assert!(cache.hash_delete("cart", "2").await.unwrap());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_type_mismatch() {
        let cache = MemoryCache::new();
        cache.set("k", "v".into(), None).await.unwrap();
        assert!(matches!(
            cache.hash_set("k", "f", "1".into()).await,
            Err(CacheError::WrongType(_))
        ));

        cache.hash_set("h", "f", "1".into()).await.unwrap();
        assert!(matches!(cache.get("h").await, Err(CacheError::WrongType(_))));
    }

    #[tokio::test]
    async fn test_expire_on_hash() {
        let cache = MemoryCache::new();
        assert!(!cache.expire("cart", Duration::from_secs(1)).await.unwrap());

        cache.hash_set("cart", "1", "1".into()).await.unwrap();
        assert!(cache.expire("cart", Duration::from_millis(10)).await.unwrap());
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(cache.hash_entries("cart").await.unwrap().is_empty());
    }
}
