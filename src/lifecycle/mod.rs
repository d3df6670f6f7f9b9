//! # System Lifecycle
//!
//! Starting, wiring and stopping the actors.
//!
//! The three actors (products, orders, customers) have no dependencies on each other:
//! every cross-actor step is driven by [`OrderWorkflow`](crate::workflow::OrderWorkflow)
//! from the outside, so each actor runs with `()` as its context. [`ShopSystem`] spawns
//! them, builds the services over their clients, and on shutdown drops every client
//! so the actors see their channels close and exit.
//!
//! ```rust,ignore
//! let system = ShopSystem::new(ShopConfig::default(), tokens);
//! let view = system.workflow.create_order(OrderRequest::new(1, 3), "token").await?;
//! system.shutdown().await?;
//! ```

pub mod shop_system;
pub mod tracing;

pub use self::tracing::setup_tracing;
pub use shop_system::ShopSystem;
