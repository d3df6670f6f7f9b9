//! # Shop Orders
//!
//! Order placement and stock bookkeeping for a small shop, built on resource-oriented
//! actors running on Tokio.
//!
//! ## Design
//!
//! Each entity type (products, orders, customers) lives in its own
//! [`ResourceActor`](framework::ResourceActor) task and processes requests one at a time.
//! A stock decrease is a single actor request, so checking and taking stock cannot
//! interleave with another order for the same product.
//!
//! Operations that touch more than one actor live in [`workflow::OrderWorkflow`]. Each one
//! runs inside a [`UnitOfWork`](workflow::UnitOfWork) that records an undo step after every
//! write and replays them in reverse if a later step fails.
//!
//! A key-value store ([`cache::CacheStore`]) sits next to the actors for order snapshots,
//! carts and product view counters. It is never the source of truth for orders or stock.
//!
//! ## Module Tour
//!
//! - [`framework`]: the generic actor, its client, and the `MockClient` test double.
//! - [`model`]: plain data types and their invariants ([`Product`](model::Product) stock
//!   arithmetic, the [`Order`](model::Order) status machine).
//! - [`product_actor`], [`order_actor`], [`customer_actor`]: `ActorEntity` implementations.
//! - [`clients`]: typed clients over each actor.
//! - [`workflow`]: the order workflow, signup/login, and [`ShopError`](workflow::ShopError).
//! - [`cart`], [`catalog`]: cart and product search services over the key-value store.
//! - [`auth`]: token verification and issuing.
//! - [`config`], [`lifecycle`]: settings, startup, shutdown and tracing.
//!
//! ## Running
//!
//! ```bash
//! RUST_LOG=info cargo run
//! cargo test
//! ```

pub mod auth;
pub mod cache;
pub mod cart;
pub mod catalog;
pub mod clients;
pub mod config;
pub mod customer_actor;
pub mod framework;
pub mod lifecycle;
pub mod model;
pub mod order_actor;
pub mod product_actor;
pub mod workflow;
