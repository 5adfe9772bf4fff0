//! Resource paths on the domain-hosting API
//!
//! Every other module builds paths through these functions. Paths are
//! relative to the API base URL, which the transport prepends.

use crate::identity::{DomainId, RecordId};

/// Collection of domains
pub fn domains_path() -> String {
    "/domains".to_string()
}

/// Collection of DNS records on one domain
pub fn domain_records_path(domain_id: DomainId) -> String {
    format!("{}/{}/dns", domains_path(), domain_id)
}

/// One DNS record
pub fn domain_record_path(domain_id: DomainId, record_id: RecordId) -> String {
    format!("{}/{}", domain_records_path(domain_id), record_id)
}
