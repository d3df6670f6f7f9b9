//! Error types for the Order actor.

use crate::model::{OrderId, OrderStatus, OrderViolation};
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    /// The requested order was not found.
    #[error("Order not found: {0}")]
    NotFound(String),

    /// The order data provided is invalid.
    #[error("Order validation error: {0}")]
    ValidationError(String),

    /// The order's current status does not allow the requested change.
    #[error("Order cannot move from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// The order changed underneath a conditional update.
    #[error("Order changed concurrently: {0}")]
    Conflict(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl OrderError {
    pub fn not_found(id: OrderId) -> Self {
        OrderError::NotFound(id.to_string())
    }
}

impl From<String> for OrderError {
    fn from(msg: String) -> Self {
        OrderError::ActorCommunicationError(msg)
    }
}

impl From<OrderViolation> for OrderError {
    fn from(v: OrderViolation) -> Self {
        match v {
            OrderViolation::InvalidQuantity(q) => {
                OrderError::ValidationError(format!("quantity must be positive, got {q}"))
            }
            OrderViolation::TotalOverflow {
                unit_price,
                quantity,
            } => OrderError::ValidationError(format!(
                "total of {quantity} x {unit_price} is out of range"
            )),
            OrderViolation::InvalidTransition { from, to } => {
                OrderError::InvalidTransition { from, to }
            }
            OrderViolation::QuantityChanged { expected, actual } => OrderError::Conflict(format!(
                "expected quantity {expected}, found {actual}"
            )),
            OrderViolation::Diverged { expected, actual } => OrderError::Conflict(format!(
                "expected {} x{}, found {} x{}",
                expected.status, expected.quantity, actual.status, actual.quantity
            )),
        }
    }
}
