//! # ActorClient Trait
//!
//! Shared plumbing for the domain clients: each wraps a [`ResourceClient`] and only has
//! to say how framework errors map onto its own error enum.

use super::{ActorEntity, FrameworkError, Predicate, ResourceClient};
use async_trait::async_trait;

/// Trait for resource-specific clients to inherit the standard reads and deletes.
///
/// Implementors provide `inner` and `map_error`; `get`, `find` and `delete` come for free.
#[async_trait]
pub trait ActorClient<T: ActorEntity>: Send + Sync {
    /// The resource-specific error type.
    type Error: From<String> + Send + Sync;

    /// Access the inner generic ResourceClient.
    fn inner(&self) -> &ResourceClient<T>;

    /// Map framework errors to the specific resource error type.
    fn map_error(e: FrameworkError) -> Self::Error;

    /// Fetch an entity by ID.
    #[tracing::instrument(skip(self))]
    async fn get(&self, id: T::Id) -> Result<Option<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().get(id).await.map_err(Self::map_error)
    }

    /// Fetch every entity the predicate accepts, in id order.
    #[tracing::instrument(skip(self, predicate))]
    async fn find(&self, predicate: Predicate<T>) -> Result<Vec<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().find(predicate).await.map_err(Self::map_error)
    }

    /// Delete an entity by ID.
    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: T::Id) -> Result<(), Self::Error> {
        tracing::debug!("Sending request");
        self.inner().delete(id).await.map_err(Self::map_error)
    }
}
