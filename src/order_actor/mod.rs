//! # Order Actor
//!
//! Stores orders and enforces their lifecycle:
//! PENDING → SHIPPING → COMPLETED, or PENDING/SHIPPING → CANCELLED.

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::clients::OrderClient;
use crate::framework::ResourceActor;
use crate::model::Order;

/// Creates a new Order actor and its client. The actor runs with `()` as context.
pub fn new(buffer_size: usize) -> (ResourceActor<Order>, OrderClient) {
    let (actor, client) = ResourceActor::new(buffer_size);
    (actor, OrderClient::new(client))
}
