//! Gateway capability trait
//!
//! The authenticated remote CRUD surface the controller drives. Transport,
//! request signing, timeouts and any retry policy live behind this trait.

use async_trait::async_trait;

use crate::entity::{Locator, RemoteEntity};
use crate::error::ProviderResult;

/// Remote CRUD access to a Chef server.
///
/// Implementations must report a missing entity as
/// [`ProviderError::RemoteNotFound`](crate::error::ProviderError::RemoteNotFound)
/// and every other failure as a different variant; the controller relies on
/// that distinction to detect out-of-band deletes.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Fetch the entity at `locator`.
    async fn get<E: RemoteEntity>(&self, locator: &Locator) -> ProviderResult<E>;

    /// Create `entity` in the collection of `locator`.
    ///
    /// Returns the entity as the server stored it.
    async fn create<E: RemoteEntity>(&self, locator: &Locator, entity: &E) -> ProviderResult<E>;

    /// Replace the entity at `locator` with `entity`.
    ///
    /// Returns the entity as the server stored it.
    async fn update<E: RemoteEntity>(&self, locator: &Locator, entity: &E) -> ProviderResult<E>;

    /// Delete the entity at `locator`.
    async fn delete(&self, locator: &Locator) -> ProviderResult<()>;

    /// Delete the API client registered under `name`.
    async fn delete_auxiliary(&self, name: &str) -> ProviderResult<()>;
}
