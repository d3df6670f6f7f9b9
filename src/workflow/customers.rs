//! Account entry points: signup, login and logout.

use super::error::ShopError;
use crate::auth::TokenIssuer;
use crate::clients::CustomerClient;
use crate::model::{Customer, CustomerCreate, CustomerId};
use chrono::Duration;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// A successful login: the issued token and the account as it is after the login.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginOutcome {
    pub token: String,
    pub customer: Customer,
}

#[derive(Clone)]
pub struct CustomerService {
    customers: CustomerClient,
    issuer: Arc<dyn TokenIssuer>,
    token_ttl: Duration,
}

impl CustomerService {
    pub fn new(customers: CustomerClient, issuer: Arc<dyn TokenIssuer>, token_ttl: Duration) -> Self {
        Self {
            customers,
            issuer,
            token_ttl,
        }
    }

    #[instrument(skip(self, params), fields(login_id = %params.login_id))]
    pub async fn signup(&self, params: CustomerCreate) -> Result<CustomerId, ShopError> {
        let id = self.customers.signup(params).await?;
        info!(%id, "Customer signed up");
        Ok(id)
    }

    /// Logs an ACTIVE account in: checks the credential digest, stamps the login time
    /// and issues a token. Unknown, non-active and mismatched accounts are all
    /// `CustomerNotFound`.
    #[instrument(skip(self, credential_digest))]
    pub async fn login(
        &self,
        login_id: &str,
        credential_digest: &str,
    ) -> Result<LoginOutcome, ShopError> {
        let customer = self.customers.find_active(login_id).await?;
        if customer.credential_digest != credential_digest {
            warn!("Credential mismatch");
            return Err(ShopError::CustomerNotFound(login_id.to_string()));
        }
        let customer = self.customers.record_login(customer.id).await?;
        let token = self.issuer.issue(&customer.login_id, self.token_ttl);
        info!(id = %customer.id, "Customer logged in");
        Ok(LoginOutcome { token, customer })
    }

    /// Drops a token. Returns `false` if it was unknown or already revoked.
    #[instrument(skip(self, token))]
    pub fn logout(&self, token: &str) -> bool {
        self.issuer.revoke(token)
    }
}
