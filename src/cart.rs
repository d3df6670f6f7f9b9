//! # Cart
//!
//! Shopping carts live only in the key-value store: one hash per customer under
//! `cart<loginId>`, one field per product id holding the quantity. Every write refreshes
//! the cart's time-to-live.

use crate::cache::{cart_key, CacheStore};
use crate::clients::{CustomerClient, ProductClient};
use crate::model::{Product, ProductId};
use crate::workflow::ShopError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// One cart line joined with the product it refers to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: u32,
    pub name: String,
    pub price: u64,
    pub quantity: u32,
}

impl CartLine {
    fn new(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id.0,
            name: product.name.clone(),
            price: product.price,
            quantity,
        }
    }

    pub fn subtotal(&self) -> u64 {
        self.price.saturating_mul(u64::from(self.quantity))
    }
}

#[derive(Clone)]
pub struct CartService {
    store: Arc<dyn CacheStore>,
    products: ProductClient,
    customers: CustomerClient,
    ttl: Duration,
}

impl CartService {
    pub fn new(
        store: Arc<dyn CacheStore>,
        products: ProductClient,
        customers: CustomerClient,
        ttl: Duration,
    ) -> Self {
        Self {
            store,
            products,
            customers,
            ttl,
        }
    }

    /// Adds `quantity` of a product, accumulating onto an existing line.
    #[instrument(skip(self))]
    pub async fn add(&self, login_id: &str, product_id: u32, quantity: u32) -> Result<u32, ShopError> {
        self.validate(login_id, product_id, quantity).await?;
        let key = cart_key(login_id);
        let total = self
            .store
            .hash_increment(&key, &product_id.to_string(), i64::from(quantity))
            .await?;
        self.touch(&key).await;
        info!(total, "Added to cart");
        quantity_of(&key, total)
    }

    /// Overwrites the quantity of a line that is already in the cart.
    #[instrument(skip(self))]
    pub async fn set_quantity(
        &self,
        login_id: &str,
        product_id: u32,
        quantity: u32,
    ) -> Result<(), ShopError> {
        self.validate(login_id, product_id, quantity).await?;
        let key = cart_key(login_id);
        let field = product_id.to_string();
        if self.store.hash_get(&key, &field).await?.is_none() {
            return Err(ShopError::NotFound(format!("cart line {product_id}")));
        }
        self.store.hash_set(&key, &field, quantity.to_string()).await?;
        self.touch(&key).await;
        Ok(())
    }

    /// Takes `quantity` off a line. The line disappears when nothing is left.
    #[instrument(skip(self))]
    pub async fn remove(&self, login_id: &str, product_id: u32, quantity: u32) -> Result<(), ShopError> {
        let key = cart_key(login_id);
        let field = product_id.to_string();
        let Some(raw) = self.store.hash_get(&key, &field).await? else {
            return Err(ShopError::NotFound(format!("cart line {product_id}")));
        };
        let current = parse_quantity(&key, &raw)?;
        let left = i64::from(current) - i64::from(quantity);
        if left > 0 {
            self.store.hash_set(&key, &field, left.to_string()).await?;
        } else {
            self.store.hash_delete(&key, &field).await?;
            debug!("Cart line removed");
        }
        Ok(())
    }

    /// Every line of the cart, in product id order, with current names and prices.
    #[instrument(skip(self))]
    pub async fn items(&self, login_id: &str) -> Result<Vec<CartLine>, ShopError> {
        if login_id.trim().is_empty() {
            return Err(ShopError::BadRequest("login id is required".into()));
        }
        let key = cart_key(login_id);
        let entries = self.store.hash_entries(&key).await?;
        if entries.is_empty() {
            return Err(ShopError::NotFound(format!("cart of {login_id}")));
        }

        let mut lines = Vec::with_capacity(entries.len());
        for (field, raw) in entries {
            let product_id: u32 = field.parse().map_err(|_| {
                ShopError::InternalError(format!("malformed cart field {key}.{field}"))
            })?;
            let quantity = parse_quantity(&key, &raw)?;
            let product = self.products.load(ProductId(product_id)).await?;
            lines.push(CartLine::new(&product, quantity));
        }
        lines.sort_by_key(|line| line.product_id);
        Ok(lines)
    }

    #[instrument(skip(self))]
    pub async fn clear(&self, login_id: &str) -> Result<(), ShopError> {
        self.store.delete(&cart_key(login_id)).await?;
        Ok(())
    }

    async fn validate(&self, login_id: &str, product_id: u32, quantity: u32) -> Result<(), ShopError> {
        if login_id.trim().is_empty() {
            return Err(ShopError::BadRequest("login id is required".into()));
        }
        if product_id == 0 || quantity == 0 {
            return Err(ShopError::BadRequest(
                "product id and quantity must be positive".into(),
            ));
        }
        if self.customers.find_by_login_id(login_id).await?.is_none() {
            return Err(ShopError::CustomerNotFound(login_id.to_string()));
        }
        let product = self.products.load(ProductId(product_id)).await?;
        if product.stock < quantity {
            return Err(ShopError::InsufficientStock {
                requested: quantity,
                available: product.stock,
            });
        }
        Ok(())
    }

    async fn touch(&self, key: &str) {
        if let Err(e) = self.store.expire(key, self.ttl).await {
            warn!(%key, error = %e, "Could not refresh cart ttl");
        }
    }
}

fn parse_quantity(key: &str, raw: &str) -> Result<u32, ShopError> {
    raw.parse()
        .map_err(|_| ShopError::InternalError(format!("malformed cart quantity at {key}: {raw}")))
}

fn quantity_of(key: &str, total: i64) -> Result<u32, ShopError> {
    u32::try_from(total)
        .map_err(|_| ShopError::InternalError(format!("cart quantity out of range at {key}")))
}
