//! Record identity and its two text encodings
//!
//! - live handle: the canonical resource path, e.g. `/domains/42/dns/100`
//! - composite: `42/100`, accepted only as import input
//!
//! Import text comes straight from a user and is checked strictly. The live
//! handle was produced by this crate from a create response, so only its
//! trailing record id is parsed.

use crate::endpoint;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

macro_rules! positive_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(NonZeroU64);

        impl $name {
            /// `None` for zero
            pub const fn new(id: u64) -> Option<Self> {
                match NonZeroU64::new(id) {
                    Some(id) => Some(Self(id)),
                    None => None,
                }
            }

            pub const fn get(self) -> u64 {
                self.0.get()
            }
        }

        impl From<NonZeroU64> for $name {
            fn from(id: NonZeroU64) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                parse_positive(s).map(Self)
            }
        }
    };
}

positive_id!(
    /// Domain identifier assigned by the API
    DomainId
);
positive_id!(
    /// DNS record identifier assigned by the API
    RecordId
);

fn parse_positive(segment: &str) -> Result<NonZeroU64> {
    segment
        .parse::<NonZeroU64>()
        .map_err(|_| Error::parse(segment, "expected a positive integer"))
}

/// Address of one record on the remote system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordIdentity {
    pub domain_id: DomainId,
    pub record_id: RecordId,
}

impl RecordIdentity {
    pub fn new(domain_id: DomainId, record_id: RecordId) -> Self {
        Self {
            domain_id,
            record_id,
        }
    }

    /// Canonical resource path used as the live handle
    pub fn handle(&self) -> String {
        encode_handle(self.domain_id, self.record_id)
    }

    /// `{domainId}/{recordId}` form
    pub fn composite(&self) -> String {
        encode_composite(self.domain_id, self.record_id)
    }
}

impl fmt::Display for RecordIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.handle())
    }
}

/// Canonical resource path of a record
pub fn encode_handle(domain_id: DomainId, record_id: RecordId) -> String {
    endpoint::domain_record_path(domain_id, record_id)
}

pub fn encode_composite(domain_id: DomainId, record_id: RecordId) -> String {
    format!("{domain_id}/{record_id}")
}

/// Parse caller-supplied import text of the form `{domainId}/{recordId}`.
///
/// Splits on the first `/`; both sides must be positive integers.
pub fn decode_composite(text: &str) -> Result<RecordIdentity> {
    let (domain, record) = text
        .split_once('/')
        .ok_or_else(|| Error::parse(text, "expected {domainId}/{recordId}"))?;

    let domain_id = parse_positive(domain)
        .map_err(|_| Error::parse(text, "domain id must be a positive integer"))?;
    let record_id = parse_positive(record)
        .map_err(|_| Error::parse(text, "record id must be a positive integer"))?;

    Ok(RecordIdentity::new(domain_id.into(), record_id.into()))
}

/// Extract the record id from the trailing segment of a live handle
pub fn decode_handle(text: &str) -> Result<RecordId> {
    let trailing = text.rsplit('/').next().unwrap_or(text);
    parse_positive(trailing)
        .map(RecordId::from)
        .map_err(|_| Error::parse(text, "handle must end in a positive record id"))
}
