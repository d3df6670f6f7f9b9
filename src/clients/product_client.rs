//! # Product Client
//!
//! Domain API over the product actor: catalog writes and the stock ledger.

use crate::framework::{ActorClient, FrameworkError, ResourceClient};
use crate::model::{Product, ProductCreate, ProductId, ProductUpdate};
use crate::product_actor::{ProductAction, ProductActionResult, ProductError};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for interacting with the Product actor.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
}

impl ProductClient {
    pub fn new(inner: ResourceClient<Product>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<Product> for ProductClient {
    type Error = ProductError;

    fn inner(&self) -> &ResourceClient<Product> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(id) => ProductError::NotFound(id),
            other => other
                .downcast_entity::<ProductError>()
                .unwrap_or_else(|e| ProductError::ActorCommunicationError(e.to_string())),
        }
    }
}

fn unexpected(result: ProductActionResult) -> ProductError {
    ProductError::ActorCommunicationError(format!("unexpected action result: {result:?}"))
}

impl ProductClient {
    #[instrument(skip(self))]
    pub async fn create_product(&self, params: ProductCreate) -> Result<ProductId, ProductError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Product, ProductError> {
        debug!("Sending request");
        self.inner.update(id, update).await.map_err(Self::map_error)
    }

    /// Like `get`, but a missing product is an error.
    pub async fn load(&self, id: ProductId) -> Result<Product, ProductError> {
        self.get(id).await?.ok_or_else(|| ProductError::not_found(id))
    }

    /// Current stock level.
    #[instrument(skip(self))]
    pub async fn check_stock(&self, id: ProductId) -> Result<u32, ProductError> {
        debug!("Checking stock");
        match self.act(id, ProductAction::CheckStock).await? {
            ProductActionResult::CheckStock(level) => Ok(level),
            other => Err(unexpected(other)),
        }
    }

    /// Takes `quantity` units out of stock and returns the remaining level.
    #[instrument(skip(self))]
    pub async fn decrease_stock(&self, id: ProductId, quantity: u32) -> Result<u32, ProductError> {
        debug!("Decreasing stock");
        match self.act(id, ProductAction::DecreaseStock(quantity)).await? {
            ProductActionResult::DecreaseStock(level) => Ok(level),
            other => Err(unexpected(other)),
        }
    }

    /// Puts `quantity` units back into stock and returns the new level.
    #[instrument(skip(self))]
    pub async fn increase_stock(&self, id: ProductId, quantity: u32) -> Result<u32, ProductError> {
        debug!("Increasing stock");
        match self.act(id, ProductAction::IncreaseStock(quantity)).await? {
            ProductActionResult::IncreaseStock(level) => Ok(level),
            other => Err(unexpected(other)),
        }
    }

    async fn act(
        &self,
        id: ProductId,
        action: ProductAction,
    ) -> Result<ProductActionResult, ProductError> {
        self.inner
            .perform_action(id, action)
            .await
            .map_err(Self::map_error)
    }
}
