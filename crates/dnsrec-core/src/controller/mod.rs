//! DNS record lifecycle controller
//!
//! Maps a declared record onto the remote API:
//!
//! ```text
//!            create              update               delete
//!  Absent ──────────▶ Present ──────────▶ Present ──────────▶ Absent
//!                        ▲
//!             import ────┘ (identity only, caller reads next)
//! ```
//!
//! Each verb accepts exactly one success status:
//!
//! | verb   | request                        | success |
//! |--------|--------------------------------|---------|
//! | create | `POST /domains/{d}/dns`        | 201     |
//! | read   | `GET /domains/{d}/dns/{r}`     | 2xx     |
//! | update | `PUT /domains/{d}/dns/{r}`     | 204     |
//! | delete | `DELETE /domains/{d}/dns/{r}`  | 204     |
//!
//! Anything else is an [`Error::UnexpectedStatus`]. The controller holds no
//! per-record state, does not lock and never retries; callers serialize
//! operations on the same identity.

use crate::endpoint;
use crate::error::{Error, Operation, Result};
use crate::identity::{self, DomainId, RecordId, RecordIdentity};
use crate::record::{Record, RecordDiff, RecordField};
use crate::traits::{ApiRequest, Transport};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Declared record together with the domain it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSpec {
    pub domain_id: DomainId,
    #[serde(flatten)]
    pub record: Record,
}

impl ResourceSpec {
    pub fn new(domain_id: DomainId, record: Record) -> Self {
        Self { domain_id, record }
    }
}

/// A record as it exists remotely
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observed {
    pub identity: RecordIdentity,
    pub record: Record,
}

/// Outcome of [`RecordController::update`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateResult {
    /// A PUT was sent and accepted
    Updated {
        /// Record as reported after the write
        record: Record,
        changed: Vec<RecordField>,
        last_updated: DateTime<Utc>,
    },
    /// Nothing differed; the record was only refreshed
    Unchanged { record: Record },
}

impl UpdateResult {
    pub fn record(&self) -> &Record {
        match self {
            UpdateResult::Updated { record, .. } | UpdateResult::Unchanged { record } => record,
        }
    }
}

#[derive(Deserialize)]
struct IdResponse {
    id: RecordId,
}

/// Lifecycle controller for DNS records on one API
pub struct RecordController {
    transport: Box<dyn Transport>,
}

impl std::fmt::Debug for RecordController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordController")
            .field("transport", &self.transport.transport_name())
            .finish()
    }
}

impl RecordController {
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Create the declared record and read it back.
    ///
    /// Nothing is sent if validation fails. If the POST succeeds but the
    /// follow-up read does not, the error is [`Error::RefreshAfterWrite`]
    /// carrying the identity of the record that now exists.
    pub async fn create(&self, desired: &ResourceSpec) -> Result<Observed> {
        let record = desired.record.validate()?;
        let path = endpoint::domain_records_path(desired.domain_id);

        info!(
            "Creating {} record {} on domain {}",
            record.record_type, record.host, desired.domain_id
        );

        let response = self
            .transport
            .execute(ApiRequest::post(path, record.to_wire()?))
            .await?;

        if response.status != 201 {
            return Err(Error::unexpected_status(
                Operation::Create,
                201,
                response.status,
                &response.body,
            ));
        }

        let created: IdResponse = serde_json::from_slice(&response.body)
            .map_err(|e| Error::decode("create response", e))?;
        let identity = RecordIdentity::new(desired.domain_id, created.id);
        info!("Created record {}", identity);

        let record = self.read_after_write(&identity).await?;
        Ok(Observed { identity, record })
    }

    /// Fetch the record as the API currently reports it.
    ///
    /// A 404 is returned as an error like any other status; see
    /// [`Error::is_not_found`].
    pub async fn read(&self, identity: &RecordIdentity) -> Result<Record> {
        let path = endpoint::domain_record_path(identity.domain_id, identity.record_id);
        debug!("Reading record {}", path);

        let response = self.transport.execute(ApiRequest::get(path)).await?;

        if !response.is_success() {
            return Err(Error::unexpected_status(
                Operation::Read,
                200,
                response.status,
                &response.body,
            ));
        }

        Record::from_wire(&response.body)
    }

    /// Bring the remote record in line with `desired`.
    ///
    /// `previous` is the last observed state. When nothing differs no PUT is
    /// sent and the record is only refreshed. A change to the domain, type or
    /// host is refused with [`Error::ImmutableFieldChanged`] before any
    /// request goes out.
    pub async fn update(
        &self,
        identity: &RecordIdentity,
        previous: &Record,
        desired: &ResourceSpec,
    ) -> Result<UpdateResult> {
        if desired.domain_id != identity.domain_id {
            return Err(Error::ImmutableFieldChanged {
                field: RecordField::DomainId,
            });
        }

        let diff = RecordDiff::between(previous, &desired.record);
        if let Some(field) = diff.immutable_change() {
            return Err(Error::ImmutableFieldChanged { field });
        }

        if diff.is_empty() {
            debug!("Record {} unchanged, refreshing only", identity);
            let record = self.read(identity).await?;
            return Ok(UpdateResult::Unchanged { record });
        }

        let record = desired.record.validate()?;
        let path = endpoint::domain_record_path(identity.domain_id, identity.record_id);

        info!("Updating record {} (changed: {:?})", identity, diff.changed());

        let response = self
            .transport
            .execute(ApiRequest::put(path, record.to_wire()?))
            .await?;

        if response.status != 204 {
            return Err(Error::unexpected_status(
                Operation::Update,
                204,
                response.status,
                &response.body,
            ));
        }

        let last_updated = Utc::now();
        let record = self.read_after_write(identity).await?;

        Ok(UpdateResult::Updated {
            record,
            changed: diff.changed().to_vec(),
            last_updated,
        })
    }

    /// Remove the remote record
    pub async fn delete(&self, identity: &RecordIdentity) -> Result<()> {
        let path = endpoint::domain_record_path(identity.domain_id, identity.record_id);
        info!("Deleting record {}", identity);

        let response = self.transport.execute(ApiRequest::delete(path)).await?;

        if response.status != 204 {
            return Err(Error::unexpected_status(
                Operation::Delete,
                204,
                response.status,
                &response.body,
            ));
        }

        Ok(())
    }

    /// Turn caller-supplied `{domainId}/{recordId}` text into an identity.
    ///
    /// No request is sent; the caller reads the record next.
    pub fn import(&self, composite: &str) -> Result<RecordIdentity> {
        let identity = identity::decode_composite(composite)?;
        info!("Importing record {}", identity);
        Ok(identity)
    }

    async fn read_after_write(&self, identity: &RecordIdentity) -> Result<Record> {
        self.read(identity)
            .await
            .map_err(|source| Error::RefreshAfterWrite {
                identity: *identity,
                source: Box::new(source),
            })
    }
}
