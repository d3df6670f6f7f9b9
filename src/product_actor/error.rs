//! Error types for the Product actor.

use crate::model::{ProductId, StockViolation};
use thiserror::Error;

/// Errors that can occur during product operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    /// The requested product was not found.
    #[error("Product not found: {0}")]
    NotFound(String),

    /// The requested quantity exceeds the available stock.
    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: u32, available: u32 },

    /// The quantity is zero, or would push stock past its limit.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(u32),

    #[error("Invalid product: {0}")]
    InvalidProduct(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl ProductError {
    pub fn not_found(id: ProductId) -> Self {
        ProductError::NotFound(id.to_string())
    }
}

impl From<String> for ProductError {
    fn from(msg: String) -> Self {
        ProductError::ActorCommunicationError(msg)
    }
}

impl From<StockViolation> for ProductError {
    fn from(v: StockViolation) -> Self {
        match v {
            StockViolation::ZeroAmount => ProductError::InvalidQuantity(0),
            StockViolation::Insufficient {
                requested,
                available,
            } => ProductError::InsufficientStock {
                requested,
                available,
            },
            StockViolation::Overflow { amount, .. } => ProductError::InvalidQuantity(amount),
        }
    }
}
