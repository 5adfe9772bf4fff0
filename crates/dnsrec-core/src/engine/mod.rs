//! Reconciler: declared resources against stored state
//!
//! The reconciler is the caller the controller defers to. It owns the state
//! store, decides between create, update and replace, and applies the
//! not-found policy.
//!
//! ## Architecture
//!
//! ```text
//!   ResourceSpec ──▶ ┌────────────┐ ──▶ ┌──────────────────┐ ──▶ Transport
//!                    │ Reconciler │     │ RecordController │
//!                    └────────────┘     └──────────────────┘
//!                          │
//!                          ▼
//!                    ┌────────────┐
//!                    │ StateStore │
//!                    └────────────┘
//! ```
//!
//! ## Apply Flow
//!
//! 1. No stored state → create
//! 2. Refresh the stored record (drift detection)
//! 3. Domain, type or host changed → delete, then create
//! 4. Otherwise update (no PUT when nothing differs)
//! 5. Store what the API reported
//!
//! State is only written after a successful remote call. The one exception
//! is a write whose follow-up read failed: the identity is stored without an
//! observed record so the remote record is neither orphaned nor trusted.

use chrono::Utc;
use crate::config::{NotFoundPolicy, ReconcilerConfig};
use crate::controller::{Observed, RecordController, ResourceSpec, UpdateResult};
use crate::error::{Error, Result};
use crate::identity::RecordIdentity;
use crate::record::{Record, RecordDiff, RecordField};
use crate::traits::{ResourceState, StateStore};
use tracing::{debug, info, warn};

/// Outcome of [`Reconciler::apply`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyResult {
    /// No record was managed under the name; one was created
    Created { identity: RecordIdentity, record: Record },

    /// An immutable field changed; the old record was deleted and a new one
    /// created
    Replaced {
        previous: RecordIdentity,
        identity: RecordIdentity,
        record: Record,
        field: RecordField,
    },

    /// The record was updated in place
    Updated {
        identity: RecordIdentity,
        record: Record,
        changed: Vec<RecordField>,
    },

    /// Remote state already matched
    Unchanged { identity: RecordIdentity, record: Record },
}

impl ApplyResult {
    pub fn identity(&self) -> &RecordIdentity {
        match self {
            ApplyResult::Created { identity, .. }
            | ApplyResult::Replaced { identity, .. }
            | ApplyResult::Updated { identity, .. }
            | ApplyResult::Unchanged { identity, .. } => identity,
        }
    }
}

/// Outcome of a refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshResult {
    /// Record exists; state now holds what the API reported
    Present(Record),
    /// API reported 404 and the resource was dropped from state
    Gone,
}

/// Reconciles declared resources against the remote API
pub struct Reconciler {
    controller: RecordController,
    state_store: Box<dyn StateStore>,
    not_found: NotFoundPolicy,
}

impl Reconciler {
    pub fn new(
        controller: RecordController,
        state_store: Box<dyn StateStore>,
        config: ReconcilerConfig,
    ) -> Self {
        Self {
            controller,
            state_store,
            not_found: config.not_found,
        }
    }

    /// Make the remote record under `name` match `desired`.
    ///
    /// An invalid `desired` record fails before any state read or request,
    /// so a replacement never deletes the live record first.
    pub async fn apply(&self, name: &str, desired: &ResourceSpec) -> Result<ApplyResult> {
        desired.record.validate()?;

        let Some(state) = self.state_store.get(name).await? else {
            debug!("Resource {} has no state, creating", name);
            let Observed { identity, record } = self.create(name, desired).await?;
            return Ok(ApplyResult::Created { identity, record });
        };

        let identity = state.identity()?;
        let previous = match self.refresh_state(name, state.clone()).await? {
            RefreshResult::Present(record) => record,
            RefreshResult::Gone => {
                info!("Resource {} is gone remotely, creating it again", name);
                let Observed { identity, record } = self.create(name, desired).await?;
                return Ok(ApplyResult::Created { identity, record });
            }
        };

        if let Some(field) = replacement_field(&identity, &previous, desired) {
            info!("Resource {} must be replaced ({} changed)", name, field);
            self.controller.delete(&identity).await?;
            self.state_store.remove(name).await?;

            let Observed {
                identity: created,
                record,
            } = self.create(name, desired).await?;
            return Ok(ApplyResult::Replaced {
                previous: identity,
                identity: created,
                record,
                field,
            });
        }

        let mut state = state;
        let updated = match self.controller.update(&identity, &previous, desired).await {
            Ok(updated) => updated,
            Err(Error::RefreshAfterWrite { identity, source }) => {
                warn!(
                    "Resource {} was updated but could not be read back: {}",
                    name, source
                );
                state.record = None;
                state.last_updated = Some(Utc::now());
                self.state_store.put(name, &state).await?;
                return Err(Error::RefreshAfterWrite { identity, source });
            }
            Err(e) => return Err(e),
        };

        match updated {
            UpdateResult::Updated {
                record,
                changed,
                last_updated,
            } => {
                state.record = Some(record.clone());
                state.last_updated = Some(last_updated);
                self.state_store.put(name, &state).await?;
                info!("Resource {} updated ({:?})", name, changed);
                Ok(ApplyResult::Updated {
                    identity,
                    record,
                    changed,
                })
            }
            UpdateResult::Unchanged { record } => {
                state.record = Some(record.clone());
                self.state_store.put(name, &state).await?;
                debug!("Resource {} unchanged", name);
                Ok(ApplyResult::Unchanged { identity, record })
            }
        }
    }

    /// Read the remote record under `name` into state
    pub async fn refresh(&self, name: &str) -> Result<RefreshResult> {
        let state = self.managed_state(name).await?;
        self.refresh_state(name, state).await
    }

    /// Delete the remote record under `name` and forget it
    pub async fn destroy(&self, name: &str) -> Result<()> {
        let state = self.managed_state(name).await?;
        let identity = state.identity()?;

        self.controller.delete(&identity).await?;
        self.state_store.remove(name).await?;
        info!("Resource {} destroyed", name);
        Ok(())
    }

    /// Adopt an existing remote record under `name` and read it
    pub async fn import(&self, name: &str, composite: &str) -> Result<RefreshResult> {
        if self.state_store.get(name).await?.is_some() {
            return Err(Error::config(format!(
                "Resource {name} is already managed"
            )));
        }

        let identity = self.controller.import(composite)?;
        let state = ResourceState::unread(identity);
        self.state_store.put(name, &state).await?;

        self.refresh_state(name, state).await
    }

    /// Names of all managed resources
    pub async fn managed(&self) -> Result<Vec<String>> {
        self.state_store.list().await
    }

    /// Stored state of one resource
    pub async fn state(&self, name: &str) -> Result<Option<ResourceState>> {
        self.state_store.get(name).await
    }

    /// Persist any buffered state
    pub async fn flush(&self) -> Result<()> {
        self.state_store.flush().await
    }

    async fn managed_state(&self, name: &str) -> Result<ResourceState> {
        self.state_store
            .get(name)
            .await?
            .ok_or_else(|| Error::config(format!("Resource {name} is not managed")))
    }

    async fn create(&self, name: &str, desired: &ResourceSpec) -> Result<Observed> {
        match self.controller.create(desired).await {
            Ok(observed) => {
                let state = ResourceState {
                    record: Some(observed.record.clone()),
                    ..ResourceState::unread(observed.identity)
                };
                self.state_store.put(name, &state).await?;
                info!("Resource {} created as {}", name, observed.identity);
                Ok(observed)
            }
            Err(Error::RefreshAfterWrite { identity, source }) => {
                warn!(
                    "Resource {} was created as {} but could not be read back: {}",
                    name, identity, source
                );
                self.state_store
                    .put(name, &ResourceState::unread(identity))
                    .await?;
                Err(Error::RefreshAfterWrite { identity, source })
            }
            Err(e) => Err(e),
        }
    }

    async fn refresh_state(&self, name: &str, mut state: ResourceState) -> Result<RefreshResult> {
        let identity = state.identity()?;

        match self.controller.read(&identity).await {
            Ok(record) => {
                if state.record.as_ref().is_some_and(|stored| stored != &record) {
                    info!("Resource {} drifted from stored state", name);
                }
                state.record = Some(record.clone());
                self.state_store.put(name, &state).await?;
                Ok(RefreshResult::Present(record))
            }
            Err(e) if e.is_not_found() && self.not_found == NotFoundPolicy::Forget => {
                warn!("Resource {} ({}) no longer exists, dropping it from state", name, identity);
                self.state_store.remove(name).await?;
                Ok(RefreshResult::Gone)
            }
            Err(e) => Err(e),
        }
    }
}

/// First field whose change forces destroy-then-create
fn replacement_field(
    identity: &RecordIdentity,
    previous: &Record,
    desired: &ResourceSpec,
) -> Option<RecordField> {
    if identity.domain_id != desired.domain_id {
        return Some(RecordField::DomainId);
    }
    RecordDiff::between(previous, &desired.record).immutable_change()
}
