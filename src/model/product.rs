use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for Products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProductId(pub u32);

impl From<u32> for ProductId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "product_{}", self.0)
    }
}

/// A catalog item together with its stock level.
///
/// Stock is only ever changed through [`Product::decrease_stock`] and
/// [`Product::increase_stock`], which keep it non-negative and never partially apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category: String,
    /// Unit price in the smallest currency unit. Always positive.
    pub price: u64,
    pub stock: u32,
    pub shipping: String,
}

/// Failure of a stock movement, before it is lifted into a `ProductError`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockViolation {
    ZeroAmount,
    Insufficient { requested: u32, available: u32 },
    Overflow { amount: u32, stock: u32 },
}

impl Product {
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Takes `amount` units out of stock, returning what is left.
    pub fn decrease_stock(&mut self, amount: u32) -> Result<u32, StockViolation> {
        if amount == 0 {
            return Err(StockViolation::ZeroAmount);
        }
        if amount > self.stock {
            return Err(StockViolation::Insufficient {
                requested: amount,
                available: self.stock,
            });
        }
        self.stock -= amount;
        Ok(self.stock)
    }

    /// Puts `amount` units back into stock, returning the new level.
    pub fn increase_stock(&mut self, amount: u32) -> Result<u32, StockViolation> {
        if amount == 0 {
            return Err(StockViolation::ZeroAmount);
        }
        self.stock = self
            .stock
            .checked_add(amount)
            .ok_or(StockViolation::Overflow {
                amount,
                stock: self.stock,
            })?;
        Ok(self.stock)
    }
}

/// DTO for Product creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub price: u64,
    pub stock: u32,
    #[serde(default)]
    pub shipping: String,
}

/// DTO for catalog edits. Stock only moves through stock actions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<u64>,
}
