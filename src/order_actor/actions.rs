//! Lifecycle actions for the Order actor.

use crate::model::{Order, OrderSnapshot, OrderStatus};

#[derive(Debug, Clone, PartialEq)]
pub enum OrderAction {
    /// Replace the quantity of a PENDING order that still holds `from`.
    AmendQuantity { from: u32, to: u32 },
    /// PENDING or SHIPPING to CANCELLED. A no-op on a cancelled order.
    Cancel,
    Ship,
    Complete,
    /// Compensation: put back `snapshot` if the order is still at `expected`.
    Restore {
        expected: OrderSnapshot,
        snapshot: OrderSnapshot,
    },
}

/// Results from OrderActions - variants match 1:1 with OrderAction.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderActionResult {
    AmendQuantity { previous: u32, order: Order },
    Cancel {
        changed: bool,
        previous_status: OrderStatus,
        order: Order,
    },
    Ship(Order),
    Complete(Order),
    Restore(Order),
}
