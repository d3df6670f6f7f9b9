//! # Catalog
//!
//! Product registration, keyword search and detail reads. Detail reads bump a view
//! counter in the key-value store; a counter failure never fails the read.

use crate::cache::{view_key, CacheStore};
use crate::clients::ProductClient;
use crate::framework::{ActorClient, Predicate};
use crate::model::{Product, ProductCreate, ProductId, ProductUpdate};
use crate::workflow::ShopError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Search criteria. Only `keyword` is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilter {
    pub keyword: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub min_price: Option<u64>,
    #[serde(default)]
    pub max_price: Option<u64>,
    #[serde(default)]
    pub in_stock_only: bool,
}

impl SearchFilter {
    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            ..Default::default()
        }
    }

    fn into_predicate(self) -> Result<Predicate<Product>, ShopError> {
        if self.keyword.trim().is_empty() {
            return Err(ShopError::BadRequest("search keyword is required".into()));
        }
        let keyword = self.keyword.to_lowercase();
        let category = self.category.filter(|c| !c.is_empty());
        let (min, max, in_stock_only) = (self.min_price, self.max_price, self.in_stock_only);

        Ok(Predicate::new(move |p: &Product| {
            let text_match = p.name.to_lowercase().contains(&keyword)
                || p.description.to_lowercase().contains(&keyword);
            text_match
                && category.as_ref().map_or(true, |c| &p.category == c)
                && min.map_or(true, |m| p.price >= m)
                && max.map_or(true, |m| p.price <= m)
                && (!in_stock_only || p.in_stock())
        }))
    }
}

/// Matching products plus the price range and stock flags of the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub products: Vec<Product>,
    pub min_price: u64,
    pub max_price: u64,
    /// Parallel to `products`.
    pub in_stock: Vec<bool>,
}

impl SearchResult {
    fn from_products(products: Vec<Product>) -> Self {
        let min_price = products.iter().map(|p| p.price).min().unwrap_or(0);
        let max_price = products.iter().map(|p| p.price).max().unwrap_or(0);
        let in_stock = products.iter().map(Product::in_stock).collect();
        Self {
            products,
            min_price,
            max_price,
            in_stock,
        }
    }
}

#[derive(Clone)]
pub struct Catalog {
    products: ProductClient,
    store: Arc<dyn CacheStore>,
}

impl Catalog {
    pub fn new(products: ProductClient, store: Arc<dyn CacheStore>) -> Self {
        Self { products, store }
    }

    #[instrument(skip(self, params), fields(name = %params.name))]
    pub async fn register(&self, params: ProductCreate) -> Result<ProductId, ShopError> {
        if params.name.trim().is_empty() {
            return Err(ShopError::BadRequest("product name is required".into()));
        }
        if params.price == 0 {
            return Err(ShopError::BadRequest("price must be positive".into()));
        }
        let id = self.products.create_product(params).await?;
        info!(%id, "Product registered");
        Ok(id)
    }

    #[instrument(skip(self))]
    pub async fn revise(&self, id: ProductId, update: ProductUpdate) -> Result<Product, ShopError> {
        Ok(self.products.update_product(id, update).await?)
    }

    #[instrument(skip(self))]
    pub async fn search(&self, filter: SearchFilter) -> Result<SearchResult, ShopError> {
        let products = self.products.find(filter.into_predicate()?).await?;
        Ok(SearchResult::from_products(products))
    }

    /// Loads one product and counts the view.
    #[instrument(skip(self))]
    pub async fn detail(&self, id: ProductId) -> Result<Product, ShopError> {
        let product = self.products.load(id).await?;
        let key = view_key(id);
        if let Err(e) = self.store.increment(&key, 1).await {
            warn!(%key, error = %e, "View count not recorded");
        }
        Ok(product)
    }

    /// Number of detail reads of a product so far. Unread products report 0.
    pub async fn view_count(&self, id: ProductId) -> Result<u64, ShopError> {
        let key = view_key(id);
        match self.store.get(&key).await? {
            None => Ok(0),
            Some(raw) => raw
                .parse()
                .map_err(|_| ShopError::InternalError(format!("malformed view counter at {key}"))),
        }
    }
}
