// # State Store Trait
//
// Persistent record of what the reconciler manages.
//
// ## Purpose
//
// For every declared resource name the store remembers:
// - the live handle of the remote record
// - the domain it belongs to
// - the record as last reported by the API (drift detection)
// - when it was last written
//
// ## Implementations
//
// - Memory: `MemoryStateStore`
// - File: `FileStateStore` (JSON with backup recovery)

use crate::error::Result;
use crate::identity::{self, DomainId, RecordIdentity};
use crate::record::Record;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored state of one managed record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceState {
    /// Live handle (canonical resource path)
    pub id: String,
    pub domain_id: DomainId,
    /// Observed record; `None` right after import or a failed refresh
    #[serde(default)]
    pub record: Option<Record>,
    /// Time of the last successful in-place update
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl ResourceState {
    /// State for an identity whose remote record has not been read yet
    pub fn unread(identity: RecordIdentity) -> Self {
        Self {
            id: identity.handle(),
            domain_id: identity.domain_id,
            record: None,
            last_updated: None,
        }
    }

    /// Identity addressed by this state
    pub fn identity(&self) -> Result<RecordIdentity> {
        let record_id = identity::decode_handle(&self.id)?;
        Ok(RecordIdentity::new(self.domain_id, record_id))
    }
}

/// Trait for state store implementations
///
/// All methods must be safe to call concurrently from multiple tasks.
/// Writes are expected to be durable once they return, `flush` persists
/// anything an implementation may have buffered.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Stored state for a resource name
    async fn get(&self, name: &str) -> Result<Option<ResourceState>>;

    /// Create or replace the state for a resource name
    async fn put(&self, name: &str, state: &ResourceState) -> Result<()>;

    /// Forget a resource name (no error if it was unknown)
    async fn remove(&self, name: &str) -> Result<()>;

    /// All resource names in the store
    async fn list(&self) -> Result<Vec<String>>;

    /// Persist any pending changes
    async fn flush(&self) -> Result<()>;
}
