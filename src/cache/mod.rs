//! # Key-Value Cache
//!
//! The shop keeps three kinds of data in a key-value store next to the actors:
//!
//! | key | shape | owner |
//! |---|---|---|
//! | `order:<id>` | JSON [`OrderView`], TTL-bounded | [`OrderCache`] |
//! | `cart<loginId>` | hash of product id to quantity | [`CartService`](crate::cart::CartService) |
//! | `product:view:<id>` | integer counter | [`Catalog`](crate::catalog::Catalog) |
//!
//! The store itself is the [`CacheStore`] trait, so a networked backend can replace
//! [`MemoryCache`] without touching the services.

pub mod memory;

pub use memory::MemoryCache;

use crate::model::{OrderId, OrderView, ProductId};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Wrong value type at key {0}")]
    WrongType(String),

    #[error("Value at {key}.{field} is not an integer")]
    NotAnInteger { key: String, field: String },

    #[error("Cache backend error: {0}")]
    Backend(String),

    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Pluggable key-value backend with string values, hashes and counters.
///
/// Expired keys behave exactly like missing keys.
#[async_trait]
pub trait CacheStore: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores a string value. `ttl = None` keeps it until deleted.
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), CacheError>;

    /// Returns whether a live key was removed.
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    /// Adds `by` to an integer value, starting from 0. Returns the new value.
    async fn increment(&self, key: &str, by: i64) -> Result<i64, CacheError>;

    /// Sets a time-to-live on an existing key. Returns `false` when the key is absent.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, CacheError>;

    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>, CacheError>;

    async fn hash_set(&self, key: &str, field: &str, value: String) -> Result<(), CacheError>;

    /// Adds `by` to an integer hash field, starting from 0. Returns the new value.
    async fn hash_increment(&self, key: &str, field: &str, by: i64) -> Result<i64, CacheError>;

    /// Removes one field; the key disappears with its last field.
    async fn hash_delete(&self, key: &str, field: &str) -> Result<bool, CacheError>;

    /// All fields of a hash, ordered by field name. Empty when the key is absent.
    async fn hash_entries(&self, key: &str) -> Result<Vec<(String, String)>, CacheError>;

    /// Drops every expired key and returns how many went. Backends that expire keys
    /// on their own keep the default.
    async fn purge_expired(&self) -> Result<usize, CacheError> {
        Ok(0)
    }
}

pub fn order_key(id: OrderId) -> String {
    format!("order:{}", id.0)
}

pub fn cart_key(login_id: &str) -> String {
    format!("cart{login_id}")
}

pub fn view_key(id: ProductId) -> String {
    format!("product:view:{}", id.0)
}

/// Read-through snapshot cache of single orders.
///
/// The order actor is the source of truth. Every failure here is logged and
/// swallowed: a lost write only costs one extra actor read later, and a corrupt
/// entry is reported as a miss so the caller overwrites it.
#[derive(Clone)]
pub struct OrderCache {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl OrderCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get(&self, id: OrderId) -> Option<OrderView> {
        let key = order_key(id);
        let raw = match self.store.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(%key, "Cache miss");
                return None;
            }
            Err(e) => {
                warn!(%key, error = %e, "Cache read failed");
                return None;
            }
        };
        match serde_json::from_str::<OrderView>(&raw) {
            Ok(view) => {
                debug!(%key, "Cache hit");
                Some(view)
            }
            Err(e) => {
                warn!(%key, error = %e, "Discarding corrupt cache entry");
                None
            }
        }
    }

    pub async fn put(&self, view: &OrderView) {
        let key = order_key(OrderId(view.id));
        let result = match serde_json::to_string(view) {
            Ok(json) => self.store.set(&key, json, Some(self.ttl)).await,
            Err(e) => Err(CacheError::from(e)),
        };
        if let Err(e) = result {
            warn!(%key, error = %e, "Cache write failed");
        }
    }

    pub async fn evict(&self, id: OrderId) {
        let key = order_key(id);
        if let Err(e) = self.store.delete(&key).await {
            warn!(%key, error = %e, "Cache eviction failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OrderStatus;
    use chrono::Utc;

    fn view(id: u32) -> OrderView {
        OrderView {
            id,
            order_number: format!("ORD-20240101-{id}"),
            customer_id: 1,
            login_id: "alice".into(),
            product_id: 2,
            quantity: 3,
            unit_price: 100,
            total_price: 300,
            status: OrderStatus::Pending,
            ordered_at: Utc::now(),
            shipping: None,
        }
    }

    #[test]
    fn test_key_namespaces() {
        assert_eq!(order_key(OrderId(7)), "order:7");
        assert_eq!(cart_key("alice"), "cartalice");
        assert_eq!(view_key(ProductId(3)), "product:view:3");
    }

    #[tokio::test]
    async fn test_put_get_evict() {
        let store = Arc::new(MemoryCache::new());
        let cache = OrderCache::new(store.clone(), Duration::from_secs(600));

        let original = view(7);
        cache.put(&original).await;
        assert_eq!(cache.get(OrderId(7)).await, Some(original));

        cache.evict(OrderId(7)).await;
        assert!(cache.get(OrderId(7)).await.is_none());
        assert!(store.get("order:7").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_a_miss() {
        let store = Arc::new(MemoryCache::new());
        store.set("order:1", "{not json".into(), None).await.unwrap();

        let cache = OrderCache::new(store, Duration::from_secs(600));
        assert!(cache.get(OrderId(1)).await.is_none());
    }

    #[tokio::test]
    async fn test_wrong_type_is_a_miss() {
        let store = Arc::new(MemoryCache::new());
        store.hash_set("order:1", "f", "1".into()).await.unwrap();

        let cache = OrderCache::new(store, Duration::from_secs(600));
        assert!(cache.get(OrderId(1)).await.is_none());
    }
}
