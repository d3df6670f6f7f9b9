use super::actions::{CustomerAction, CustomerActionResult};
use super::error::CustomerError;
use crate::framework::ActorEntity;
use crate::model::{Customer, CustomerCreate, CustomerId, CustomerStatus, CustomerUpdate};
use async_trait::async_trait;
use chrono::Utc;

#[async_trait]
impl ActorEntity for Customer {
    type Id = CustomerId;
    type Create = CustomerCreate;
    type Update = CustomerUpdate;
    type Action = CustomerAction;
    type ActionResult = CustomerActionResult;
    type Context = ();
    type Error = CustomerError;

    fn from_create_params(id: CustomerId, params: CustomerCreate) -> Result<Self, CustomerError> {
        if params.login_id.trim().is_empty() {
            return Err(CustomerError::ValidationError("login id must not be blank".into()));
        }
        if !params.email.contains('@') {
            return Err(CustomerError::ValidationError(format!(
                "invalid email: {}",
                params.email
            )));
        }
        Ok(Self {
            id,
            login_id: params.login_id,
            email: params.email,
            credential_digest: params.credential_digest,
            user_name: params.user_name,
            phone_number: params.phone_number,
            address: None,
            status: CustomerStatus::Active,
            signed_up_at: Utc::now(),
            last_login_at: None,
            status_changed_at: None,
        })
    }

    /// Login ids and emails are unique across all accounts; emails ignore case.
    fn conflicts_with(&self, other: &Self) -> bool {
        self.login_id == other.login_id || self.email.eq_ignore_ascii_case(&other.email)
    }

    async fn on_update(&mut self, update: CustomerUpdate, _ctx: &()) -> Result<(), CustomerError> {
        if let Some(user_name) = update.user_name {
            self.user_name = user_name;
        }
        if let Some(phone_number) = update.phone_number {
            self.phone_number = phone_number;
        }
        if let Some(address) = update.address {
            self.address = Some(address);
        }
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: CustomerAction,
        _ctx: &(),
    ) -> Result<CustomerActionResult, CustomerError> {
        match action {
            CustomerAction::RecordLogin => {
                self.last_login_at = Some(Utc::now());
                Ok(CustomerActionResult::RecordLogin(self.clone()))
            }
            CustomerAction::ChangeStatus(status) => {
                if self.status != status {
                    self.status = status;
                    self.status_changed_at = Some(Utc::now());
                }
                Ok(CustomerActionResult::ChangeStatus(self.clone()))
            }
        }
    }
}
