//! The error surface of the shop services.
//!
//! Each kind has a stable code and an HTTP status so a transport layer can map
//! responses without inspecting messages.

use crate::cache::CacheError;
use crate::customer_actor::CustomerError;
use crate::order_actor::OrderError;
use crate::product_actor::ProductError;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ShopError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: u32, available: u32 },

    #[error("Customer account not found: {0}")]
    CustomerNotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Unsupported or expired token")]
    UnsupportedToken,

    #[error("Invalid order status: {0}")]
    InvalidStatus(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ShopError {
    pub fn code(&self) -> &'static str {
        match self {
            ShopError::BadRequest(_) => "BAD_REQUEST",
            ShopError::NotFound(_) => "NOT_EXIST_DATA",
            ShopError::InsufficientStock { .. } => "NOT_ENOUGH_STOCK",
            ShopError::CustomerNotFound(_) => "NOT_EXIST_CUSTOMER_ACCOUNT",
            ShopError::AlreadyExists(_) => "ALREADY_EXIST_DATA",
            ShopError::UnsupportedToken => "UNSUPPORTED_TOKEN",
            ShopError::InvalidStatus(_) => "INVALID_ORDER_STATUS",
            ShopError::InternalError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            ShopError::BadRequest(_) => 400,
            ShopError::NotFound(_) => 404,
            ShopError::InsufficientStock { .. } => 409,
            ShopError::CustomerNotFound(_) => 400,
            ShopError::AlreadyExists(_) => 409,
            ShopError::UnsupportedToken => 407,
            ShopError::InvalidStatus(_) => 409,
            ShopError::InternalError(_) => 500,
        }
    }

    fn internal(source: &str, msg: String) -> Self {
        error!(source, error = %msg, "Lower-layer failure");
        ShopError::InternalError(msg)
    }
}

impl From<ProductError> for ShopError {
    fn from(e: ProductError) -> Self {
        match e {
            ProductError::NotFound(id) => ShopError::NotFound(id),
            ProductError::InsufficientStock {
                requested,
                available,
            } => ShopError::InsufficientStock {
                requested,
                available,
            },
            ProductError::InvalidQuantity(q) => {
                ShopError::BadRequest(format!("invalid quantity: {q}"))
            }
            ProductError::InvalidProduct(msg) => ShopError::BadRequest(msg),
            ProductError::ActorCommunicationError(msg) => ShopError::internal("product", msg),
        }
    }
}

impl From<OrderError> for ShopError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::NotFound(id) => ShopError::NotFound(id),
            OrderError::ValidationError(msg) => ShopError::BadRequest(msg),
            e @ OrderError::InvalidTransition { .. } => ShopError::InvalidStatus(e.to_string()),
            e @ OrderError::Conflict(_) => ShopError::InvalidStatus(e.to_string()),
            OrderError::ActorCommunicationError(msg) => ShopError::internal("order", msg),
        }
    }
}

impl From<CustomerError> for ShopError {
    fn from(e: CustomerError) -> Self {
        match e {
            CustomerError::NotFound(id) | CustomerError::Inactive(id) => {
                ShopError::CustomerNotFound(id)
            }
            CustomerError::AlreadyExists(id) => ShopError::AlreadyExists(id),
            CustomerError::ValidationError(msg) => ShopError::BadRequest(msg),
            CustomerError::ActorCommunicationError(msg) => ShopError::internal("customer", msg),
        }
    }
}

impl From<CacheError> for ShopError {
    fn from(e: CacheError) -> Self {
        ShopError::internal("cache", e.to_string())
    }
}
