//! # Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered by
//! `RUST_LOG`. Module paths are hidden; actor log lines carry `entity_type` instead.
//!
//! ```bash
//! RUST_LOG=info cargo run     # one line per actor request and workflow outcome
//! RUST_LOG=debug cargo run    # adds payloads, cache hits/misses and compensations
//! ```
//!
//! A placed order at `info` reads roughly:
//!
//! ```text
//! INFO create_order{product_id=1 quantity=3}: Action ok entity_type="Product" id=product_1
//! INFO create_order{product_id=1 quantity=3}: Created entity_type="Order" id=order_1 size=1
//! INFO create_order{product_id=1 quantity=3}: Order placed order_id=order_1 total=300
//! ```
//!
//! A failed operation logs `Operation failed` with the error code, followed by
//! `Rolling back` and one line per compensation that could not be applied.

/// Installs the global subscriber. Call once, at program start.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
