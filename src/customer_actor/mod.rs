//! # Customer Actor
//!
//! The customer registry. Signup uniqueness (login id and email) is enforced by the
//! actor itself through [`ActorEntity::conflicts_with`](crate::framework::ActorEntity::conflicts_with),
//! so two concurrent signups with the same login id cannot both succeed.

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::clients::CustomerClient;
use crate::framework::ResourceActor;
use crate::model::Customer;

/// Creates a new Customer actor and its client. The actor runs with `()` as context.
pub fn new(buffer_size: usize) -> (ResourceActor<Customer>, CustomerClient) {
    let (actor, client) = ResourceActor::new(buffer_size);
    (actor, CustomerClient::new(client))
}
