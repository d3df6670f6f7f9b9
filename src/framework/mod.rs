//! Generic actor runtime for the shop's durable entities.
//!
//! Every stored resource (products, customers, orders) lives in its own
//! [`ResourceActor`], which owns the entities and applies requests one at a time.
//! That sequential loop is what makes a read-check-write on one entity atomic:
//! two stock decrements for the same product can never interleave.
//!
//! # Main Components
//!
//! - [`ActorEntity`] - Trait that resource types implement to be managed by actors
//! - [`ResourceActor`] - Generic actor that owns a collection of entities
//! - [`ResourceClient`] - Typed, cloneable handle used to send requests
//! - [`ActorClient`] - Shared `get`/`delete`/`find` plumbing for domain clients
//! - [`Predicate`] - Filter shipped to the actor for `find` queries
//! - [`FrameworkError`] - Transport and lookup errors
//!
//! # Testing
//!
//! See [`mock`] for utilities to test clients without spawning full actors.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;

pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{Predicate, ResourceRequest, Response};
