use super::{CustomerId, ProductId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for Orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderId(pub u32);

impl From<u32> for OrderId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "order_{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Shipping,
    Completed,
    Cancelled,
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Shipping => "SHIPPING",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

/// Delivery details captured with the order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShippingInfo {
    pub recipient: String,
    pub zip_code: String,
    pub address: String,
    pub phone: String,
    pub payment_method: String,
    #[serde(default)]
    pub remarks: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: OrderId,
    /// Human-facing number, `ORD-<yyyymmdd>-<id>`.
    pub order_number: String,
    pub customer_id: CustomerId,
    pub login_id: String,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: u64,
    pub total_price: u64,
    pub status: OrderStatus,
    pub ordered_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub shipping: Option<ShippingInfo>,
}

/// Rule broken by an order mutation, before it is lifted into an `OrderError`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderViolation {
    InvalidQuantity(u32),
    TotalOverflow { unit_price: u64, quantity: u32 },
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    /// The order no longer holds the quantity the caller based its change on.
    QuantityChanged { expected: u32, actual: u32 },
    /// The order moved on since the state a compensation was recorded against.
    Diverged {
        expected: OrderSnapshot,
        actual: OrderSnapshot,
    },
}

/// The fields a rollback puts back after a failed amendment or cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSnapshot {
    pub quantity: u32,
    pub total_price: u64,
    pub status: OrderStatus,
}

pub(crate) fn total_for(unit_price: u64, quantity: u32) -> Result<u64, OrderViolation> {
    unit_price
        .checked_mul(u64::from(quantity))
        .ok_or(OrderViolation::TotalOverflow {
            unit_price,
            quantity,
        })
}

impl Order {
    pub fn snapshot(&self) -> OrderSnapshot {
        OrderSnapshot {
            quantity: self.quantity,
            total_price: self.total_price,
            status: self.status,
        }
    }

    /// Replaces the quantity of a pending order and reprices it, provided the order
    /// still holds `expected`. Returns the previous quantity.
    pub fn amend_quantity(&mut self, expected: u32, quantity: u32) -> Result<u32, OrderViolation> {
        if quantity == 0 {
            return Err(OrderViolation::InvalidQuantity(quantity));
        }
        if self.status != OrderStatus::Pending {
            return Err(OrderViolation::InvalidTransition {
                from: self.status,
                to: OrderStatus::Pending,
            });
        }
        if self.quantity != expected {
            return Err(OrderViolation::QuantityChanged {
                expected,
                actual: self.quantity,
            });
        }
        let total = total_for(self.unit_price, quantity)?;
        let previous = self.quantity;
        if previous != quantity {
            self.quantity = quantity;
            self.total_price = total;
            self.touch();
        }
        Ok(previous)
    }

    /// Moves the order to CANCELLED. Returns `false` when it already was.
    pub fn cancel(&mut self) -> Result<bool, OrderViolation> {
        match self.status {
            OrderStatus::Cancelled => Ok(false),
            OrderStatus::Pending | OrderStatus::Shipping => {
                self.status = OrderStatus::Cancelled;
                self.touch();
                Ok(true)
            }
            OrderStatus::Completed => Err(OrderViolation::InvalidTransition {
                from: OrderStatus::Completed,
                to: OrderStatus::Cancelled,
            }),
        }
    }

    pub fn ship(&mut self) -> Result<(), OrderViolation> {
        self.advance(OrderStatus::Pending, OrderStatus::Shipping)
    }

    pub fn complete(&mut self) -> Result<(), OrderViolation> {
        self.advance(OrderStatus::Shipping, OrderStatus::Completed)
    }

    /// Puts back `snapshot`, but only while the order is still exactly at `expected`.
    pub fn restore(
        &mut self,
        expected: OrderSnapshot,
        snapshot: OrderSnapshot,
    ) -> Result<(), OrderViolation> {
        let actual = self.snapshot();
        if actual != expected {
            return Err(OrderViolation::Diverged { expected, actual });
        }
        self.quantity = snapshot.quantity;
        self.total_price = snapshot.total_price;
        self.status = snapshot.status;
        self.touch();
        Ok(())
    }

    fn advance(&mut self, from: OrderStatus, to: OrderStatus) -> Result<(), OrderViolation> {
        if self.status != from {
            return Err(OrderViolation::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// DTO for Order creation. Built by the order workflow once stock has been taken.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub customer_id: CustomerId,
    pub login_id: String,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: u64,
    pub shipping: Option<ShippingInfo>,
}

/// Public, serializable view of an order. This is what the cache stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderView {
    pub id: u32,
    pub order_number: String,
    pub customer_id: u32,
    pub login_id: String,
    pub product_id: u32,
    pub quantity: u32,
    pub unit_price: u64,
    pub total_price: u64,
    pub status: OrderStatus,
    pub ordered_at: DateTime<Utc>,
    pub shipping: Option<ShippingInfo>,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.0,
            order_number: order.order_number.clone(),
            customer_id: order.customer_id.0,
            login_id: order.login_id.clone(),
            product_id: order.product_id.0,
            quantity: order.quantity,
            unit_price: order.unit_price,
            total_price: order.total_price,
            status: order.status,
            ordered_at: order.ordered_at,
            shipping: order.shipping.clone(),
        }
    }
}
