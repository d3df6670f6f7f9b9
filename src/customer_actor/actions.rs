use crate::model::{Customer, CustomerStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerAction {
    /// Stamp the last-login time.
    RecordLogin,
    ChangeStatus(CustomerStatus),
}

/// Results from CustomerActions - variants match 1:1 with CustomerAction.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomerActionResult {
    RecordLogin(Customer),
    ChangeStatus(Customer),
}
