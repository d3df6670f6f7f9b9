//! # Customer Client

use crate::customer_actor::{CustomerAction, CustomerActionResult, CustomerError};
use crate::framework::{ActorClient, FrameworkError, Predicate, ResourceClient};
use crate::model::{Customer, CustomerCreate, CustomerId, CustomerStatus, CustomerUpdate};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

/// Client for interacting with the Customer actor.
#[derive(Clone)]
pub struct CustomerClient {
    inner: ResourceClient<Customer>,
}

impl CustomerClient {
    pub fn new(inner: ResourceClient<Customer>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<Customer> for CustomerClient {
    type Error = CustomerError;

    fn inner(&self) -> &ResourceClient<Customer> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(id) => CustomerError::NotFound(id),
            FrameworkError::Conflict(id) => CustomerError::AlreadyExists(id),
            other => other
                .downcast_entity::<CustomerError>()
                .unwrap_or_else(|e| CustomerError::ActorCommunicationError(e.to_string())),
        }
    }
}

impl CustomerClient {
    /// Registers a new ACTIVE account. Fails with `AlreadyExists` when the login id or
    /// email is taken.
    #[instrument(skip(self, params), fields(login_id = %params.login_id))]
    pub async fn signup(&self, params: CustomerCreate) -> Result<CustomerId, CustomerError> {
        let login_id = params.login_id.clone();
        let id = self.inner.create(params).await.map_err(|e| match e {
            FrameworkError::Conflict(_) => CustomerError::AlreadyExists(login_id),
            other => Self::map_error(other),
        })?;
        info!(%id, "Customer signed up");
        Ok(id)
    }

    #[instrument(skip(self))]
    pub async fn find_by_login_id(&self, login_id: &str) -> Result<Option<Customer>, CustomerError> {
        debug!("Looking up customer");
        let wanted = login_id.to_string();
        let mut found = self
            .find(Predicate::new(move |c: &Customer| c.login_id == wanted))
            .await?;
        Ok(found.pop())
    }

    /// The ACTIVE account for `login_id`. Missing and non-active accounts are errors.
    pub async fn find_active(&self, login_id: &str) -> Result<Customer, CustomerError> {
        let customer = self
            .find_by_login_id(login_id)
            .await?
            .ok_or_else(|| CustomerError::NotFound(login_id.to_string()))?;
        if !customer.is_active() {
            return Err(CustomerError::Inactive(login_id.to_string()));
        }
        Ok(customer)
    }

    #[instrument(skip(self))]
    pub async fn record_login(&self, id: CustomerId) -> Result<Customer, CustomerError> {
        match self.act(id, CustomerAction::RecordLogin).await? {
            CustomerActionResult::RecordLogin(c) => Ok(c),
            other => Err(CustomerError::ActorCommunicationError(format!(
                "unexpected action result: {other:?}"
            ))),
        }
    }

    #[instrument(skip(self))]
    pub async fn change_status(
        &self,
        id: CustomerId,
        status: CustomerStatus,
    ) -> Result<Customer, CustomerError> {
        match self.act(id, CustomerAction::ChangeStatus(status)).await? {
            CustomerActionResult::ChangeStatus(c) => Ok(c),
            other => Err(CustomerError::ActorCommunicationError(format!(
                "unexpected action result: {other:?}"
            ))),
        }
    }

    #[instrument(skip(self))]
    pub async fn update_profile(
        &self,
        id: CustomerId,
        update: CustomerUpdate,
    ) -> Result<Customer, CustomerError> {
        debug!("Sending request");
        self.inner.update(id, update).await.map_err(Self::map_error)
    }

    async fn act(
        &self,
        id: CustomerId,
        action: CustomerAction,
    ) -> Result<CustomerActionResult, CustomerError> {
        self.inner
            .perform_action(id, action)
            .await
            .map_err(Self::map_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer_actor;

    fn spawn() -> CustomerClient {
        let (actor, client) = customer_actor::new(8);
        tokio::spawn(actor.run(()));
        client
    }

    fn signup(login_id: &str, email: &str) -> CustomerCreate {
        CustomerCreate {
            login_id: login_id.into(),
            email: email.into(),
            credential_digest: "digest".into(),
            user_name: "Test".into(),
            phone_number: "010-0000-0000".into(),
        }
    }

    #[tokio::test]
    async fn test_signup_creates_active_customer() {
        let customers = spawn();
        let id = customers.signup(signup("alice", "a@shop.test")).await.unwrap();

        let alice = customers.find_active("alice").await.unwrap();
        assert_eq!(alice.id, id);
        assert_eq!(alice.status, CustomerStatus::Active);
        assert!(alice.last_login_at.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_login_or_email_is_rejected() {
        let customers = spawn();
        customers.signup(signup("alice", "a@shop.test")).await.unwrap();

        assert_eq!(
            customers.signup(signup("alice", "other@shop.test")).await,
            Err(CustomerError::AlreadyExists("alice".into()))
        );
        assert!(matches!(
            customers.signup(signup("bob", "A@Shop.test")).await,
            Err(CustomerError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn test_blank_email_is_invalid() {
        let customers = spawn();
        assert!(matches!(
            customers.signup(signup("carol", "")).await,
            Err(CustomerError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_suspended_customer_is_not_active() {
        let customers = spawn();
        let id = customers.signup(signup("dave", "d@shop.test")).await.unwrap();

        let dave = customers
            .change_status(id, CustomerStatus::Suspended)
            .await
            .unwrap();
        assert!(dave.status_changed_at.is_some());

        assert_eq!(
            customers.find_active("dave").await,
            Err(CustomerError::Inactive("dave".into()))
        );
        assert_eq!(
            customers.find_active("nobody").await,
            Err(CustomerError::NotFound("nobody".into()))
        );
    }

    #[tokio::test]
    async fn test_record_login_and_profile_update() {
        let customers = spawn();
        let id = customers.signup(signup("erin", "e@shop.test")).await.unwrap();

        let erin = customers.record_login(id).await.unwrap();
        assert!(erin.last_login_at.is_some());

        let erin = customers
            .update_profile(
                id,
                CustomerUpdate {
                    address: Some("55 Market St".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(erin.address.as_deref(), Some("55 Market St"));
        assert_eq!(erin.user_name, "Test");
    }
}
