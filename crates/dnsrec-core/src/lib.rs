// # dnsrec-core
//
// Core library for managing DNS records on a domain-hosting API.
//
// ## Architecture Overview
//
// - **Record**: the declared record, its validation and wire form
// - **RecordIdentity**: handle and composite text forms of a record's ids
// - **endpoint**: resource paths relative to the API base
// - **RecordController**: create / read / update / delete / import
// - **Transport**: trait the controller sends requests through
// - **StateStore**: trait for persisting what is managed
// - **Reconciler**: drives the controller from declared resources and state
//
// ## Design Principles
//
// 1. **Separation of Concerns**: HTTP lives behind `Transport`, persistence
//    behind `StateStore`
// 2. **Validate before sending**: invalid records never reach the wire
// 3. **Exact statuses**: each verb accepts one success status
// 4. **Library-First**: the CLI is a thin shell over this crate

pub mod config;
pub mod controller;
pub mod endpoint;
pub mod engine;
pub mod error;
pub mod identity;
pub mod record;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use config::{
    Manifest, NotFoundPolicy, ProviderConfig, ReconcilerConfig, ResourceConfig, StateStoreConfig,
};
pub use controller::{Observed, RecordController, ResourceSpec, UpdateResult};
pub use engine::{ApplyResult, Reconciler, RefreshResult};
pub use error::{Error, Operation, Result, ValidationError};
pub use identity::{DomainId, RecordId, RecordIdentity};
pub use record::{Record, RecordDiff, RecordField, RecordType, ValidatedRecord};
pub use state::{FileStateStore, MemoryStateStore};
pub use traits::{ApiRequest, ApiResponse, Method, ResourceState, StateStore, Transport};
