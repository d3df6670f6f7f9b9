//! # Order Client
//!
//! Domain API over the order actor. It knows nothing about stock: the order workflow
//! pairs these calls with the product client inside a unit of work.

use crate::framework::{ActorClient, FrameworkError, ResourceClient};
use crate::model::{Order, OrderCreate, OrderId, OrderSnapshot, OrderStatus, ShippingInfo};
use crate::order_actor::{OrderAction, OrderActionResult, OrderError};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for interacting with the Order actor.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

/// Outcome of a cancel request.
#[derive(Debug, Clone, PartialEq)]
pub struct Cancellation {
    /// `false` when the order was already cancelled.
    pub changed: bool,
    pub previous_status: OrderStatus,
    pub order: Order,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<Order> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<Order> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(id) => OrderError::NotFound(id),
            other => other
                .downcast_entity::<OrderError>()
                .unwrap_or_else(|e| OrderError::ActorCommunicationError(e.to_string())),
        }
    }
}

fn unexpected(result: OrderActionResult) -> OrderError {
    OrderError::ActorCommunicationError(format!("unexpected action result: {result:?}"))
}

impl OrderClient {
    #[instrument(skip(self))]
    pub async fn create_order(&self, params: OrderCreate) -> Result<OrderId, OrderError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    /// Like `get`, but a missing order is an error.
    pub async fn load(&self, id: OrderId) -> Result<Order, OrderError> {
        self.get(id).await?.ok_or_else(|| OrderError::not_found(id))
    }

    #[instrument(skip(self))]
    pub async fn update_shipping(
        &self,
        id: OrderId,
        shipping: ShippingInfo,
    ) -> Result<Order, OrderError> {
        debug!("Sending request");
        self.inner.update(id, shipping).await.map_err(Self::map_error)
    }

    /// Moves a pending order from quantity `from` to `to`. Fails with `Conflict` if the
    /// order no longer holds `from`. Returns the previous quantity and the order.
    #[instrument(skip(self))]
    pub async fn amend_quantity(
        &self,
        id: OrderId,
        from: u32,
        to: u32,
    ) -> Result<(u32, Order), OrderError> {
        match self.act(id, OrderAction::AmendQuantity { from, to }).await? {
            OrderActionResult::AmendQuantity { previous, order } => Ok((previous, order)),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn cancel(&self, id: OrderId) -> Result<Cancellation, OrderError> {
        match self.act(id, OrderAction::Cancel).await? {
            OrderActionResult::Cancel {
                changed,
                previous_status,
                order,
            } => Ok(Cancellation {
                changed,
                previous_status,
                order,
            }),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn ship(&self, id: OrderId) -> Result<Order, OrderError> {
        match self.act(id, OrderAction::Ship).await? {
            OrderActionResult::Ship(order) => Ok(order),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn complete(&self, id: OrderId) -> Result<Order, OrderError> {
        match self.act(id, OrderAction::Complete).await? {
            OrderActionResult::Complete(order) => Ok(order),
            other => Err(unexpected(other)),
        }
    }

    /// Puts `snapshot` back while the order is still at `expected`.
    #[instrument(skip(self))]
    pub async fn restore(
        &self,
        id: OrderId,
        expected: OrderSnapshot,
        snapshot: OrderSnapshot,
    ) -> Result<Order, OrderError> {
        match self.act(id, OrderAction::Restore { expected, snapshot }).await? {
            OrderActionResult::Restore(order) => Ok(order),
            other => Err(unexpected(other)),
        }
    }

    async fn act(&self, id: OrderId, action: OrderAction) -> Result<OrderActionResult, OrderError> {
        debug!(?action, "Sending action");
        self.inner
            .perform_action(id, action)
            .await
            .map_err(Self::map_error)
    }
}
