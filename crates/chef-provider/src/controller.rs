//! Resource controller
//!
//! Drives one resource kind through its lifecycle against a [`Gateway`]:
//!
//! ```text
//! absent -> creating -> present -> (updating -> present)* -> deleting -> absent
//! ```
//!
//! The identity key of the [`DeclaredRecord`] is the state: `None` is absent,
//! `Some` is present. The host calls at most one operation at a time per
//! identity key, so the controller holds no locks and no per-instance state.

use tracing::{debug, info, instrument};

use crate::entity::RemoteEntity;
use crate::error::{ProviderError, ProviderResult};
use crate::gateway::Gateway;
use crate::record::DeclaredRecord;
use crate::resource::Resource;

/// Reconciles records of one resource kind.
#[derive(Debug, Clone, Default)]
pub struct Controller<R> {
    resource: R,
}

impl<R: Resource> Controller<R> {
    pub fn new(resource: R) -> Self {
        Self { resource }
    }

    pub fn resource(&self) -> &R {
        &self.resource
    }

    /// Validate a declared record and return the canonical form to store.
    pub fn normalize(&self, record: &DeclaredRecord) -> ProviderResult<DeclaredRecord> {
        let schema = self.resource.schema();
        let mut normalized = schema.prepare(record)?;
        schema.canonicalize(&mut normalized);
        Ok(normalized)
    }

    /// Fields whose change between `prior` and `next` forces replacement.
    pub fn replacement_fields(&self, prior: &DeclaredRecord, next: &DeclaredRecord) -> Vec<String> {
        self.resource.replacement_fields(prior, next)
    }

    /// Create the remote entity and refresh the record from the server.
    ///
    /// On any failure the identity key stays unset.
    #[instrument(skip_all, fields(resource = %self.resource.type_name()))]
    pub async fn create<G: Gateway>(
        &self,
        gateway: &G,
        record: &mut DeclaredRecord,
    ) -> ProviderResult<()> {
        if let Some(id) = record.id() {
            return Err(ProviderError::IdentityAlreadySet {
                resource: self.resource.type_name().to_string(),
                id: id.to_string(),
            });
        }

        let prepared = self.resource.schema().prepare(record)?;
        let entity = self.resource.to_remote(&prepared)?;
        let locator = self.resource.locate(entity.identity(), &prepared)?;

        debug!(locator = %locator, "Creating remote entity");
        let created = gateway.create(&locator, &entity).await?;

        record.set_id(created.identity());
        info!(id = %created.identity(), "Remote entity created");

        self.read(gateway, record).await
    }

    /// Replace the remote entity with the declared record and refresh.
    #[instrument(skip_all, fields(resource = %self.resource.type_name(), id = ?record.id()))]
    pub async fn update<G: Gateway>(
        &self,
        gateway: &G,
        record: &mut DeclaredRecord,
    ) -> ProviderResult<()> {
        let id = self.require_id(record)?;

        let prepared = self.resource.schema().prepare(record)?;
        let entity = self.resource.to_remote(&prepared)?;
        if entity.identity() != id {
            return Err(ProviderError::InvalidField {
                field: self.resource.identity_field().to_string(),
                message: format!(
                    "identity key cannot change from '{id}' to '{}' in place",
                    entity.identity()
                ),
            });
        }
        let locator = self.resource.locate(&id, &prepared)?;

        debug!(locator = %locator, "Updating remote entity");
        let updated = gateway.update(&locator, &entity).await?;

        record.set_id(updated.identity());
        info!(id = %updated.identity(), "Remote entity updated");

        self.read(gateway, record).await
    }

    /// Refresh the record from the server.
    ///
    /// A not-found answer means the entity was deleted out of band: the
    /// identity key is cleared and the read succeeds.
    #[instrument(skip_all, fields(resource = %self.resource.type_name(), id = ?record.id()))]
    pub async fn read<G: Gateway>(
        &self,
        gateway: &G,
        record: &mut DeclaredRecord,
    ) -> ProviderResult<()> {
        let id = self.require_id(record)?;
        let locator = self.resource.locate(&id, record)?;

        let entity: R::Entity = match gateway.get(&locator).await {
            Ok(entity) => entity,
            Err(e) if e.is_not_found() => {
                info!(locator = %locator, "Remote entity gone, marking absent");
                record.clear_id();
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let fresh = self.reconciled(&entity)?;
        record.overwrite_fields(fresh);
        Ok(())
    }

    /// Delete the remote entity and any same-named API client.
    ///
    /// A failed primary delete leaves the identity key set so the host can
    /// retry. A failed client delete is ignored.
    #[instrument(skip_all, fields(resource = %self.resource.type_name(), id = ?record.id()))]
    pub async fn delete<G: Gateway>(
        &self,
        gateway: &G,
        record: &mut DeclaredRecord,
    ) -> ProviderResult<()> {
        let id = self.require_id(record)?;
        let locator = self.resource.locate(&id, record)?;

        gateway.delete(&locator).await?;

        if self.resource.purges_auxiliary() {
            if let Err(e) = gateway.delete_auxiliary(&id).await {
                debug!(error = %e, client = %id, "Ignoring failed client delete");
            }
        }

        record.clear_id();
        info!(locator = %locator, "Remote entity deleted");
        Ok(())
    }

    /// Adopt an existing remote entity into a new record.
    #[instrument(skip(self, gateway), fields(resource = %self.resource.type_name()))]
    pub async fn import<G: Gateway>(&self, gateway: &G, id: &str) -> ProviderResult<DeclaredRecord> {
        let locator = self.resource.locate(id, &DeclaredRecord::new())?;
        let entity: R::Entity = gateway.get(&locator).await?;

        let mut record = self.reconciled(&entity)?;
        record.set_id(entity.identity());

        info!(locator = %locator, "Remote entity imported");
        Ok(record)
    }

    /// Declared fields for a fetched entity, in canonical form.
    fn reconciled(&self, entity: &R::Entity) -> ProviderResult<DeclaredRecord> {
        let mut fresh = self.resource.from_remote(entity)?;
        self.resource.schema().canonicalize(&mut fresh);
        Ok(fresh)
    }

    fn require_id(&self, record: &DeclaredRecord) -> ProviderResult<String> {
        record
            .id()
            .map(str::to_string)
            .ok_or_else(|| ProviderError::MissingIdentity {
                resource: self.resource.type_name().to_string(),
            })
    }
}
