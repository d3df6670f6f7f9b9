//! Domain data: the entities the actors own, their ids, and their DTOs.
//!
//! The rules that keep an entity valid (stock never negative, order status only
//! moving forward) live on the entity types themselves; the actor modules wrap them
//! in [`ActorEntity`](crate::framework::ActorEntity) implementations.

pub mod customer;
pub mod order;
pub mod product;

pub use customer::*;
pub use order::*;
pub use product::*;
