//! Generic resource lifecycle.
//!
//! Every resource kind follows the same state machine per identifier:
//! `Absent → Present → Absent`. [`Orchestrator`] implements the operations
//! once; each kind plugs in its engine calls and record shaping through
//! [`ResourceKind`].
//!
//! # Rules
//!
//! - Create is idempotent: a registered id returns the stored object without
//!   calling the engine. Creates of the same id run one at a time, so racing
//!   callers all get the first stored object.
//! - The parent is resolved before any engine call.
//! - Delete removes the entry even when the engine answers `false`.
//! - List validates pagination before any engine call, and each shaped item
//!   prefers the registered object with the same natural key.

use async_trait::async_trait;
use spdk_bridge_core::{ResourceId, VolumeStats};

use crate::context::BridgeContext;
use crate::error::{ControlError, Result};
use crate::registry::Registry;
use crate::types::{DeleteRequest, ListRequest, ListResponse};

/// Per-kind capabilities plugged into the [`Orchestrator`].
#[async_trait]
pub trait ResourceKind: Send + Sync {
    /// Typed resource.
    type Resource: Clone + Send + Sync + 'static;
    /// Whatever create needs from the parent, resolved up front.
    type Parent: Send + Sync;
    /// Resolved list scope.
    type Scope: Send + Sync;
    /// Engine record returned by list queries.
    type Record: Send + Sync;

    /// Operation name suffix, e.g. `NvmeSubsystem`.
    const NAME: &'static str;

    /// Registry holding resources of this kind.
    fn registry<'a>(&self, ctx: &'a BridgeContext) -> &'a Registry<Self::Resource>;

    /// Identifier of a resource.
    fn id<'r>(&self, resource: &'r Self::Resource) -> &'r ResourceId;

    /// Resolve the parent of a resource about to be created. Must not call
    /// the engine.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::NotFound` if the parent is not registered.
    fn parent(&self, ctx: &BridgeContext, resource: &Self::Resource) -> Result<Self::Parent>;

    /// Create the resource on the engine and return the object to store.
    async fn create(
        &self,
        ctx: &BridgeContext,
        parent: Self::Parent,
        resource: Self::Resource,
    ) -> Result<Self::Resource>;

    /// Delete the resource on the engine. `Ok(false)` is the engine's
    /// ambiguous "not deleted" answer.
    async fn delete(&self, ctx: &BridgeContext, stored: &Self::Resource) -> Result<bool>;

    /// Resolve the list scope from the request's parent. Must not call the
    /// engine.
    fn scope(&self, ctx: &BridgeContext, parent: Option<&ResourceId>) -> Result<Self::Scope>;

    /// Scope a registered resource belongs to.
    fn scope_of(&self, ctx: &BridgeContext, stored: &Self::Resource) -> Result<Self::Scope>;

    /// Query the engine for every record in scope.
    async fn fetch(&self, ctx: &BridgeContext, scope: &Self::Scope) -> Result<Vec<Self::Record>>;

    /// Whether `record` describes `stored`, compared on the natural key.
    fn matches(&self, scope: &Self::Scope, stored: &Self::Resource, record: &Self::Record)
        -> bool;

    /// Build a typed resource from an engine record with no registered
    /// counterpart.
    fn shape(&self, scope: &Self::Scope, record: Self::Record) -> Self::Resource;

    /// Records describing a registered resource.
    async fn lookup(
        &self,
        ctx: &BridgeContext,
        stored: &Self::Resource,
    ) -> Result<Vec<Self::Record>> {
        let scope = self.scope_of(ctx, stored)?;
        let records = self.fetch(ctx, &scope).await?;
        Ok(records
            .into_iter()
            .filter(|r| self.matches(&scope, stored, r))
            .collect())
    }

    /// Message for a get that found `found` records instead of one.
    fn lookup_failure(&self, stored: &Self::Resource, found: usize) -> String;

    /// Refresh status fields of `stored` from its engine record.
    fn refresh(&self, stored: Self::Resource, record: Self::Record) -> Self::Resource;

    /// Read the resource's statistics from the engine.
    async fn stats(&self, ctx: &BridgeContext, stored: &Self::Resource) -> Result<VolumeStats>;
}

/// Lifecycle operations for one resource kind.
#[derive(Debug)]
pub struct Orchestrator<'a, K> {
    ctx: &'a BridgeContext,
    kind: K,
}

impl<'a, K: ResourceKind> Orchestrator<'a, K> {
    /// Bind `kind` to a context.
    #[must_use]
    pub const fn new(ctx: &'a BridgeContext, kind: K) -> Self {
        Self { ctx, kind }
    }

    fn registry(&self) -> &'a Registry<K::Resource> {
        self.kind.registry(self.ctx)
    }

    fn stored(&self, id: &ResourceId) -> Result<K::Resource> {
        self.registry()
            .get(id)
            .ok_or_else(|| ControlError::NotFound(id.to_string()))
    }

    /// Create a resource, or return the registered one with the same id.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::InvalidArgument` for a malformed id,
    /// `ControlError::NotFound` for a missing parent, and any engine failure.
    pub async fn create(&self, resource: K::Resource) -> Result<K::Resource> {
        let id = self.kind.id(&resource).clone();
        ResourceId::parse(id.as_str())
            .map_err(|e| ControlError::InvalidArgument(format!("{}: {e}", K::NAME)))?;

        if let Some(existing) = self.registry().get(&id) {
            tracing::info!(kind = K::NAME, id = %id, "Resource already exists");
            return Ok(existing);
        }

        let _guard = self.ctx.creates.acquire(K::NAME, &id).await;
        if let Some(existing) = self.registry().get(&id) {
            tracing::info!(kind = K::NAME, id = %id, "Resource created concurrently");
            return Ok(existing);
        }

        let parent = self.kind.parent(self.ctx, &resource)?;
        let created = self.kind.create(self.ctx, parent, resource).await?;
        let stored = self.registry().insert_if_absent(id.clone(), created);

        tracing::info!(kind = K::NAME, id = %id, "Created resource");
        Ok(stored)
    }

    /// Delete a resource.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::NotFound` if the resource does not exist and
    /// `allow_missing` is false, and any engine failure.
    pub async fn delete(&self, request: &DeleteRequest) -> Result<()> {
        let Some(stored) = self.registry().get(&request.name) else {
            if request.allow_missing {
                tracing::debug!(kind = K::NAME, id = %request.name, "Delete of missing resource allowed");
                return Ok(());
            }
            return Err(ControlError::NotFound(request.name.to_string()));
        };

        if !self.kind.delete(self.ctx, &stored).await? {
            tracing::warn!(kind = K::NAME, id = %request.name, "Engine did not confirm delete");
        }
        self.registry().remove(&request.name);

        tracing::info!(kind = K::NAME, id = %request.name, "Deleted resource");
        Ok(())
    }

    /// Update a resource. Not supported for any kind.
    ///
    /// # Errors
    ///
    /// Always returns `ControlError::Unimplemented`.
    pub fn update(&self, resource: &K::Resource) -> Result<K::Resource> {
        tracing::debug!(kind = K::NAME, id = %self.kind.id(resource), "Update requested");
        Err(ControlError::Unimplemented(format!("Update{}", K::NAME)))
    }

    /// List one page of resources.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::NegativePageSize` or
    /// `ControlError::PageTokenNotFound` before calling the engine, a scope
    /// error for a bad parent, and any engine failure.
    pub async fn list(&self, request: &ListRequest) -> Result<ListResponse<K::Resource>> {
        let page = self.ctx.cursors.extract(
            request.page_size,
            &request.page_token,
            self.ctx.config.default_page_size,
        )?;
        let scope = self.kind.scope(self.ctx, request.parent.as_ref())?;

        let records = self.kind.fetch(self.ctx, &scope).await?;
        let (records, next_page_token) = self.ctx.cursors.paginate(records, page);

        let registry = self.registry();
        let items = records
            .into_iter()
            .map(|record| {
                registry
                    .find(|stored| self.kind.matches(&scope, stored, &record))
                    .unwrap_or_else(|| self.kind.shape(&scope, record))
            })
            .collect();

        Ok(ListResponse {
            items,
            next_page_token,
        })
    }

    /// Get a resource, refreshed from the engine.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::NotFound` if not registered,
    /// `ControlError::InvalidArgument` unless exactly one engine record
    /// matches, and any engine failure.
    pub async fn get(&self, id: &ResourceId) -> Result<K::Resource> {
        let stored = self.stored(id)?;
        let records = self.kind.lookup(self.ctx, &stored).await?;
        let found = records.len();
        match <[K::Record; 1]>::try_from(records) {
            Ok([record]) => Ok(self.kind.refresh(stored, record)),
            Err(_) => {
                let msg = self.kind.lookup_failure(&stored, found);
                tracing::warn!(kind = K::NAME, id = %id, found, "{msg}");
                Err(ControlError::InvalidArgument(msg))
            }
        }
    }

    /// Read a resource's statistics.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::NotFound` if not registered, and any engine
    /// failure.
    pub async fn stats(&self, id: &ResourceId) -> Result<VolumeStats> {
        let stored = self.stored(id)?;
        self.kind.stats(self.ctx, &stored).await
    }
}
