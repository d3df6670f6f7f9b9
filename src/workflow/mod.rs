//! Multi-actor workflows and the error surface they expose.

pub mod customers;
pub mod error;
pub mod orders;
pub mod unit_of_work;

pub use customers::{CustomerService, LoginOutcome};
pub use error::ShopError;
pub use orders::{OrderConditions, OrderRequest, OrderWorkflow};
pub use unit_of_work::{Compensation, UnitOfWork};
