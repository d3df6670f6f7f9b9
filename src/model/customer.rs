use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for Customers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub u32);

impl From<u32> for CustomerId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "customer_{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerStatus {
    Active,
    Inactive,
    Suspended,
}

impl Display for CustomerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CustomerStatus::Active => "ACTIVE",
            CustomerStatus::Inactive => "INACTIVE",
            CustomerStatus::Suspended => "SUSPENDED",
        };
        f.write_str(s)
    }
}

/// A registered shop account.
///
/// `credential_digest` is produced outside this crate (password hashing is a
/// transport concern) and is stored verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: CustomerId,
    pub login_id: String,
    pub email: String,
    pub credential_digest: String,
    pub user_name: String,
    pub phone_number: String,
    pub address: Option<String>,
    pub status: CustomerStatus,
    pub signed_up_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub status_changed_at: Option<DateTime<Utc>>,
}

impl Customer {
    pub fn is_active(&self) -> bool {
        self.status == CustomerStatus::Active
    }
}

/// DTO for signup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerCreate {
    pub login_id: String,
    pub email: String,
    pub credential_digest: String,
    pub user_name: String,
    pub phone_number: String,
}

/// DTO for profile edits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerUpdate {
    pub user_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}
