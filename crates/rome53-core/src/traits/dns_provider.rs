// # DNS Provider Traits
//
// Defines the two narrow interfaces the workflow needs from a hosted DNS
// provider: read the account's zones and records, and change one record.
//
// ## Implementations
//
// - AWS Route 53: `rome53-route53` crate
//
// ## Usage
//
// ```rust,ignore
// use rome53_core::{ZoneLister, RecordUpdater};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* ZoneLister + RecordUpdater implementation */;
//
//     for zone in provider.list_zones().await? {
//         for record in provider.list_records(&zone).await? {
//             println!("{} {} {:?}", record.name, record.record_type, record.values);
//         }
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::fmt;
use std::net::Ipv4Addr;

/// A hosted zone in the provider account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedZone {
    /// Provider-specific zone identifier
    pub id: String,
    /// The zone apex, fully qualified (e.g., "example.com.")
    pub name: String,
}

impl HostedZone {
    /// Create a new hosted zone handle
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// DNS record type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordType {
    /// A record (IPv4)
    A,
    /// AAAA record (IPv6)
    Aaaa,
    /// CNAME record
    Cname,
    /// Any other type, as named by the provider
    Other(String),
}

impl RecordType {
    /// The wire name of this type (e.g., "A")
    pub fn as_str(&self) -> &str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
            RecordType::Other(name) => name,
        }
    }
}

impl From<&str> for RecordType {
    fn from(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "A" => RecordType::A,
            "AAAA" => RecordType::Aaaa,
            "CNAME" => RecordType::Cname,
            other => RecordType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record set as stored by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSet {
    /// Fully-qualified record name, as the provider stores it
    pub name: String,
    /// Record type
    pub record_type: RecordType,
    /// Time-to-live, when the record has one (alias records do not)
    pub ttl: Option<i64>,
    /// Raw record values
    pub values: Vec<String>,
}

impl RecordSet {
    /// Create a new record set
    pub fn new(
        name: impl Into<String>,
        record_type: RecordType,
        ttl: Option<i64>,
        values: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            record_type,
            ttl,
            values,
        }
    }
}

/// Propagation state of a submitted change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeStatus {
    /// Not yet applied to every authoritative server
    Pending,
    /// Applied everywhere
    InSync,
}

impl ChangeStatus {
    /// Whether the change is still propagating
    pub fn is_pending(self) -> bool {
        matches!(self, ChangeStatus::Pending)
    }
}

/// Handle to a change submitted to the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeHandle {
    /// Provider-specific change identifier
    pub id: String,
    /// Status reported when the change was submitted
    pub status: ChangeStatus,
}

/// Trait for enumerating an account's zones and records
///
/// # Trust Level: Untrusted
///
/// ## Allowed Capabilities
/// - ✅ Perform API calls to the provider's endpoints only
/// - ✅ Follow the provider's pagination until a listing is complete
///
/// ## Forbidden Capabilities
/// - ❌ Filter or interpret records (owned by the workflow)
/// - ❌ Retry or back off
/// - ❌ Cache results between calls
#[async_trait]
pub trait ZoneLister: Send + Sync {
    /// List every hosted zone in the account
    async fn list_zones(&self) -> Result<Vec<HostedZone>, crate::Error>;

    /// List every record set in a zone
    async fn list_records(&self, zone: &HostedZone) -> Result<Vec<RecordSet>, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Trait for changing a single A record and tracking the change
///
/// # Trust Level: Untrusted
///
/// ## Forbidden Capabilities
/// - ❌ Deciding whether an update is needed (owned by the workflow)
/// - ❌ Waiting for propagation (owned by the workflow)
/// - ❌ Touching any record other than the one passed in
#[async_trait]
pub trait RecordUpdater: Send + Sync {
    /// Replace the single value of `current` with `new_ip`
    ///
    /// The record keeps its name and TTL. Exactly one change is submitted.
    ///
    /// # Returns
    ///
    /// - `Ok(ChangeHandle)`: The change was accepted
    /// - `Err(Error)`: The provider rejected the change
    async fn update_a(
        &self,
        zone: &HostedZone,
        current: &RecordSet,
        new_ip: Ipv4Addr,
    ) -> Result<ChangeHandle, crate::Error>;

    /// Fetch the current propagation status of a submitted change
    async fn change_status(&self, change: &ChangeHandle) -> Result<ChangeStatus, crate::Error>;
}
