//! Core traits for the node DNS syncer
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`DnsProvider`]: Read and mutate the address records of a DNS zone
//! - [`NodeSource`]: List cluster node addresses and update node labels

pub mod dns_provider;
pub mod node_source;

pub use dns_provider::{DnsProvider, DnsRecord, NewRecord};
pub use node_source::{AddressType, ClusterNode, NodeAddress, NodeSource};
