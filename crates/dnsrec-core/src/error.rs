//! Error types for the DNS record controller
//!
//! Every failure is terminal for the operation that produced it. Nothing in
//! this crate retries or swallows an error; callers decide what to do next.

use crate::identity::RecordIdentity;
use crate::record::{RecordField, RecordType};
use std::fmt;
use thiserror::Error;

/// Result type alias for controller operations
pub type Result<T> = std::result::Result<T, Error>;

/// Remote operation that produced an unexpected status code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
        })
    }
}

/// Local validation failure; never sent over the wire
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A field required by the record type is absent
    #[error("{field} is required for {record_type} record")]
    MissingRequiredField {
        field: RecordField,
        record_type: RecordType,
    },
}

/// Core error type for the DNS record controller
#[derive(Error, Debug)]
pub enum Error {
    /// Declared record failed type-dependent validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Attempted in-place change of a field that forces replacement
    #[error("{field} cannot be changed in place, the record must be replaced")]
    ImmutableFieldChanged { field: RecordField },

    /// Malformed identity text (import input or live handle)
    #[error("invalid record identity {input:?}: {reason}")]
    Parse { input: String, reason: String },

    /// Malformed response body
    #[error("unable to decode {context}: {reason}")]
    Decode { context: String, reason: String },

    /// Response code outside the single expected success code
    #[error("unexpected status code from {operation} operation: expected {expected}, got {got}. Response: {body}")]
    UnexpectedStatus {
        operation: Operation,
        expected: u16,
        got: u16,
        body: String,
    },

    /// The remote write succeeded but the follow-up read did not.
    ///
    /// `identity` addresses the record that now exists remotely.
    #[error("record {identity} was written but refreshing it failed: {source}")]
    RefreshAfterWrite {
        identity: RecordIdentity,
        #[source]
        source: Box<Error>,
    },

    /// HTTP exchange failed before a status code was received
    #[error("Transport error: {0}")]
    Transport(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// State store-related errors
    #[error("State store error: {0}")]
    StateStore(String),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an identity parse error
    pub fn parse(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create a response decode error
    pub fn decode(context: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::Decode {
            context: context.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an unexpected status error, keeping the raw body for diagnosis
    pub fn unexpected_status(operation: Operation, expected: u16, got: u16, body: &[u8]) -> Self {
        Self::UnexpectedStatus {
            operation,
            expected,
            got,
            body: String::from_utf8_lossy(body).into_owned(),
        }
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a state store error
    pub fn state_store(msg: impl Into<String>) -> Self {
        Self::StateStore(msg.into())
    }

    /// Status code carried by this error, looking through `RefreshAfterWrite`
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { got, .. } => Some(*got),
            Self::RefreshAfterWrite { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Whether the remote API reported the record as gone
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
