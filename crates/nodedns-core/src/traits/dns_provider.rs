// # DNS Provider Trait
//
// Defines the interface the reconciler uses to read and mutate a DNS zone.
//
// ## Implementations
//
// - Cloudflare: `nodedns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use nodedns_core::DnsProvider;
//
// let zone_id = provider.zone_id("example.com").await?;
// for record in provider.list_records(&zone_id).await? {
//     println!("{} -> {}", record.name, record.content);
// }
// ```

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// An address record as listed by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    /// Provider-specific record identifier
    pub id: String,
    /// Fully-qualified record name
    pub name: String,
    /// Record content (an IPv4 address for A records)
    pub content: String,
}

impl DnsRecord {
    /// Create a record value
    pub fn new(id: impl Into<String>, name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            content: content.into(),
        }
    }
}

/// An address record to be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    /// Fully-qualified record name
    pub name: String,
    /// Address the record points at
    pub address: Ipv4Addr,
    /// Whether the provider should proxy traffic (always false for node records)
    pub proxied: bool,
}

impl NewRecord {
    /// An unproxied A record
    pub fn a(name: impl Into<String>, address: Ipv4Addr) -> Self {
        Self {
            name: name.into(),
            address,
            proxied: false,
        }
    }

    /// The DNS record type
    pub fn record_type(&self) -> &'static str {
        "A"
    }
}

/// Trait for DNS provider implementations
///
/// Implementations perform exactly one logical operation per call and return
/// an error on any failure. They do not retry, back off, or cache: the
/// reconciler treats every error as fatal for the run and the next scheduled
/// run starts from scratch.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Resolve a zone name (e.g. "example.com") to the provider's zone ID
    ///
    /// Returns `Error::NotFound` if the zone does not exist.
    async fn zone_id(&self, zone_name: &str) -> Result<String, crate::Error>;

    /// List every address record in a zone, in provider order
    async fn list_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>, crate::Error>;

    /// Create an address record and return it as stored by the provider
    async fn create_record(
        &self,
        zone_id: &str,
        record: &NewRecord,
    ) -> Result<DnsRecord, crate::Error>;

    /// Delete a record by ID
    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
