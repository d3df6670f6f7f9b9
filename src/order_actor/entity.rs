//! [`ActorEntity`] implementation for [`Order`].
//!
//! The order actor only guards the order's own state machine. Stock and customer checks
//! belong to the order workflow, which drives this actor together with the product actor.

use super::actions::{OrderAction, OrderActionResult};
use super::error::OrderError;
use crate::framework::ActorEntity;
use crate::model::{order::total_for, Order, OrderCreate, OrderId, OrderStatus, ShippingInfo};
use async_trait::async_trait;
use chrono::Utc;

#[async_trait]
impl ActorEntity for Order {
    type Id = OrderId;
    type Create = OrderCreate;
    /// Shipping details may be corrected until the order ships.
    type Update = ShippingInfo;
    type Action = OrderAction;
    type ActionResult = OrderActionResult;
    type Context = ();
    type Error = OrderError;

    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, OrderError> {
        if params.product_id.0 == 0 {
            return Err(OrderError::ValidationError("product id must be positive".into()));
        }
        if params.quantity == 0 {
            return Err(OrderError::ValidationError("quantity must be positive".into()));
        }
        let total_price = total_for(params.unit_price, params.quantity)?;
        let now = Utc::now();
        Ok(Self {
            order_number: format!("ORD-{}-{}", now.format("%Y%m%d"), id.0),
            id,
            customer_id: params.customer_id,
            login_id: params.login_id,
            product_id: params.product_id,
            quantity: params.quantity,
            unit_price: params.unit_price,
            total_price,
            status: OrderStatus::Pending,
            ordered_at: now,
            updated_at: now,
            shipping: params.shipping,
        })
    }

    async fn on_update(&mut self, shipping: ShippingInfo, _ctx: &()) -> Result<(), OrderError> {
        if self.status != OrderStatus::Pending {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                to: OrderStatus::Pending,
            });
        }
        self.shipping = Some(shipping);
        self.updated_at = Utc::now();
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: OrderAction,
        _ctx: &(),
    ) -> Result<OrderActionResult, OrderError> {
        match action {
            OrderAction::AmendQuantity { from, to } => {
                let previous = self.amend_quantity(from, to)?;
                Ok(OrderActionResult::AmendQuantity {
                    previous,
                    order: self.clone(),
                })
            }
            OrderAction::Cancel => {
                let previous_status = self.status;
                let changed = self.cancel()?;
                Ok(OrderActionResult::Cancel {
                    changed,
                    previous_status,
                    order: self.clone(),
                })
            }
            OrderAction::Ship => {
                self.ship()?;
                Ok(OrderActionResult::Ship(self.clone()))
            }
            OrderAction::Complete => {
                self.complete()?;
                Ok(OrderActionResult::Complete(self.clone()))
            }
            OrderAction::Restore { expected, snapshot } => {
                self.restore(expected, snapshot)?;
                Ok(OrderActionResult::Restore(self.clone()))
            }
        }
    }
}
