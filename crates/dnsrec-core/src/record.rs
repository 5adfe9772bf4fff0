//! DNS record model
//!
//! A [`Record`] is the desired or observed state of one DNS entry. Which
//! optional fields matter depends on the record type:
//!
//! | type | required beyond type/host/data/ttl |
//! |------|------------------------------------|
//! | MX   | priority                           |
//! | SRV  | priority, weight, port             |
//! | other| none                               |
//!
//! Fields a type does not use are tolerated on input but never sent to the
//! API and never compared when looking for drift.

use crate::error::{Error, Result, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// DNS record kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    A,
    Aaaa,
    Cname,
    Aname,
    Tlsa,
    Mx,
    Srv,
    Ds,
    Caa,
    Ns,
    Txt,
}

impl RecordType {
    pub const ALL: [RecordType; 11] = [
        RecordType::A,
        RecordType::Aaaa,
        RecordType::Cname,
        RecordType::Aname,
        RecordType::Tlsa,
        RecordType::Mx,
        RecordType::Srv,
        RecordType::Ds,
        RecordType::Caa,
        RecordType::Ns,
        RecordType::Txt,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
            RecordType::Aname => "ANAME",
            RecordType::Tlsa => "TLSA",
            RecordType::Mx => "MX",
            RecordType::Srv => "SRV",
            RecordType::Ds => "DS",
            RecordType::Caa => "CAA",
            RecordType::Ns => "NS",
            RecordType::Txt => "TXT",
        }
    }

    /// Type-specific fields this kind requires, in validation order
    pub fn required_fields(self) -> &'static [RecordField] {
        match self {
            RecordType::Mx => &[RecordField::Priority],
            RecordType::Srv => &[RecordField::Priority, RecordField::Weight, RecordField::Port],
            _ => &[],
        }
    }

    fn uses(self, field: RecordField) -> bool {
        self.required_fields().contains(&field)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named attribute of a declared record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    DomainId,
    Type,
    Host,
    Data,
    Ttl,
    Priority,
    Weight,
    Port,
}

impl RecordField {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordField::DomainId => "domain_id",
            RecordField::Type => "type",
            RecordField::Host => "host",
            RecordField::Data => "data",
            RecordField::Ttl => "ttl",
            RecordField::Priority => "priority",
            RecordField::Weight => "weight",
            RecordField::Port => "port",
        }
    }

    /// Changing this field requires destroy-then-create
    pub fn is_immutable(self) -> bool {
        matches!(
            self,
            RecordField::DomainId | RecordField::Type | RecordField::Host
        )
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Desired or observed state of one DNS entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub host: String,
    pub data: String,
    pub ttl: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u32>,
}

/// Body of a create/update request
#[derive(Serialize)]
struct WireRecord<'a> {
    host: &'a str,
    #[serde(rename = "type")]
    record_type: RecordType,
    data: &'a str,
    ttl: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    weight: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    port: Option<u32>,
}

impl Record {
    pub fn new(
        record_type: RecordType,
        host: impl Into<String>,
        data: impl Into<String>,
        ttl: u32,
    ) -> Self {
        Self {
            record_type,
            host: host.into(),
            data: data.into(),
            ttl,
            priority: None,
            weight: None,
            port: None,
        }
    }

    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_port(mut self, port: u32) -> Self {
        self.port = Some(port);
        self
    }

    fn has(&self, field: RecordField) -> bool {
        match field {
            // An empty priority string counts as unset
            RecordField::Priority => self.priority.as_deref().is_some_and(|p| !p.is_empty()),
            RecordField::Weight => self.weight.is_some(),
            RecordField::Port => self.port.is_some(),
            _ => true,
        }
    }

    /// Check the type-dependent required fields.
    ///
    /// Extra fields never cause a failure.
    pub fn validate(&self) -> std::result::Result<ValidatedRecord, ValidationError> {
        if let Some(field) = self
            .record_type
            .required_fields()
            .iter()
            .copied()
            .find(|field| !self.has(*field))
        {
            return Err(ValidationError::MissingRequiredField {
                field,
                record_type: self.record_type,
            });
        }
        Ok(ValidatedRecord(self.clone()))
    }

    /// Copy of this record without the fields its type does not use
    pub fn normalized(&self) -> Record {
        let t = self.record_type;
        Record {
            priority: self.priority.clone().filter(|_| t.uses(RecordField::Priority)),
            weight: self.weight.filter(|_| t.uses(RecordField::Weight)),
            port: self.port.filter(|_| t.uses(RecordField::Port)),
            ..self.clone()
        }
    }

    /// Serialize the base fields plus the fields relevant to the type
    pub fn to_wire(&self) -> Result<Vec<u8>> {
        let t = self.record_type;
        let wire = WireRecord {
            host: &self.host,
            record_type: t,
            data: &self.data,
            ttl: self.ttl,
            priority: self.priority.as_deref().filter(|_| t.uses(RecordField::Priority)),
            weight: self.weight.filter(|_| t.uses(RecordField::Weight)),
            port: self.port.filter(|_| t.uses(RecordField::Port)),
        };
        Ok(serde_json::to_vec(&wire)?)
    }

    /// Decode a record reported by the API.
    ///
    /// Unknown keys are ignored, absent type-specific fields stay unset and
    /// fields the decoded type does not use are dropped.
    pub fn from_wire(bytes: &[u8]) -> Result<Record> {
        let record: Record =
            serde_json::from_slice(bytes).map_err(|e| Error::decode("DNS record", e))?;
        Ok(record.normalized())
    }
}

/// A record that passed [`Record::validate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRecord(Record);

impl ValidatedRecord {
    pub fn into_inner(self) -> Record {
        self.0
    }
}

impl Deref for ValidatedRecord {
    type Target = Record;

    fn deref(&self) -> &Record {
        &self.0
    }
}

/// Fields that differ between a previous and a desired record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordDiff {
    changed: Vec<RecordField>,
}

impl RecordDiff {
    /// Compare over `{type, data, priority, weight, host, ttl, port}`.
    ///
    /// Both sides are normalized first, so a field the type ignores never
    /// shows up as a change.
    pub fn between(previous: &Record, desired: &Record) -> Self {
        let (p, d) = (previous.normalized(), desired.normalized());
        let checks = [
            (RecordField::Type, p.record_type != d.record_type),
            (RecordField::Data, p.data != d.data),
            (RecordField::Priority, p.priority != d.priority),
            (RecordField::Weight, p.weight != d.weight),
            (RecordField::Host, p.host != d.host),
            (RecordField::Ttl, p.ttl != d.ttl),
            (RecordField::Port, p.port != d.port),
        ];
        Self {
            changed: checks
                .into_iter()
                .filter_map(|(field, differs)| differs.then_some(field))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }

    pub fn changed(&self) -> &[RecordField] {
        &self.changed
    }

    /// First changed field that cannot be updated in place
    pub fn immutable_change(&self) -> Option<RecordField> {
        self.changed.iter().copied().find(|f| f.is_immutable())
    }
}
