//! Stock actions for the Product actor.
//!
//! Every stock movement is a single request, so the check and the write happen inside
//! one turn of the actor loop and cannot interleave with another order's movement.

/// Custom actions for Product entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductAction {
    /// Reads the current stock level.
    CheckStock,
    /// Takes units out of stock. Fails without change if fewer are available.
    DecreaseStock(u32),
    /// Puts units back into stock.
    IncreaseStock(u32),
}

/// Results from ProductActions - variants match 1:1 with ProductAction.
/// Each carries the stock level after the action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductActionResult {
    CheckStock(u32),
    DecreaseStock(u32),
    IncreaseStock(u32),
}
