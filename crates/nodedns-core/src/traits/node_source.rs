// # Node Source Trait
//
// Defines the interface for reading cluster nodes and writing node labels.
//
// ## Implementations
//
// - Kubernetes: `nodedns-source-kube` crate

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Kind of node address to publish
///
/// Only address kinds that carry an IPv4 address are supported; the
/// Kubernetes `Hostname` entry is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressType {
    /// Externally routable address
    #[default]
    External,
    /// Cluster-internal address
    Internal,
}

impl AddressType {
    /// The address type as written in Kubernetes node status
    pub fn as_kubernetes(&self) -> &'static str {
        match self {
            AddressType::External => "ExternalIP",
            AddressType::Internal => "InternalIP",
        }
    }
}

impl FromStr for AddressType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "external" | "externalip" => Ok(AddressType::External),
            "internal" | "internalip" => Ok(AddressType::Internal),
            "hostname" => Err(crate::Error::config(
                "Address type 'hostname' does not carry an IPv4 address. Valid: external, internal",
            )),
            other => Err(crate::Error::config(format!(
                "Unknown address type '{}'. Valid: external, internal",
                other
            ))),
        }
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_kubernetes())
    }
}

/// One address of one node, as listed by the cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeAddress {
    /// Node name
    pub node_name: String,
    /// Raw address string (not yet validated)
    pub address: String,
}

impl NodeAddress {
    /// Create an address entry
    pub fn new(node_name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
            address: address.into(),
        }
    }
}

/// Snapshot of a node's metadata, fetched just before a label update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterNode {
    /// Node name
    pub name: String,
    /// Current labels
    pub labels: BTreeMap<String, String>,
    /// Version of the object the labels were read from
    pub resource_version: Option<String>,
}

impl ClusterNode {
    /// Current value of a label
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }
}

/// Trait for cluster node sources
///
/// Like DNS providers, node sources make single-shot calls and surface every
/// failure as `Error::Cluster`.
#[async_trait]
pub trait NodeSource: Send + Sync {
    /// List node addresses of the given type
    ///
    /// # Parameters
    ///
    /// - `label_selector`: Optional label selector expression (e.g. "role=edge")
    /// - `address_type`: Only addresses of this type are returned
    ///
    /// A node with several matching addresses yields several entries.
    async fn list_addresses(
        &self,
        label_selector: Option<&str>,
        address_type: AddressType,
    ) -> Result<Vec<NodeAddress>, crate::Error>;

    /// Fetch a node's current metadata by name
    async fn get_node(&self, name: &str) -> Result<ClusterNode, crate::Error>;

    /// Write `node.labels` back to the cluster
    ///
    /// `node` must be a value previously returned by [`NodeSource::get_node`]
    /// with its labels modified.
    async fn update_labels(&self, node: &ClusterNode) -> Result<(), crate::Error>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}
