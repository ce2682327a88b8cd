//! Desired-state model: one entry per (cluster node, address) pair

use crate::encoder;
use crate::error::Result;
use crate::traits::NodeAddress;
use std::net::Ipv4Addr;

/// A cluster node address that should be published in DNS
///
/// Built once per run from the node listing. The subdomain is derived from
/// the address and never changes for the lifetime of the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    name: String,
    address: Ipv4Addr,
    subdomain: String,
}

impl Node {
    /// Create a node, deriving its subdomain from `address` and `prefix`
    ///
    /// Fails with `InvalidAddress` if `address` is not IPv4.
    pub fn new(name: impl Into<String>, address: &str, prefix: &str) -> Result<Self> {
        let address = encoder::parse_ipv4(address)?;
        Ok(Self {
            name: name.into(),
            subdomain: format!("{}{}", prefix, encoder::encode_ipv4(address)),
            address,
        })
    }

    /// Create a node from a listed cluster address
    pub fn from_address(entry: &NodeAddress, prefix: &str) -> Result<Self> {
        Self::new(entry.node_name.clone(), &entry.address, prefix)
    }

    /// Cluster-unique node name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The node's address
    pub fn address(&self) -> Ipv4Addr {
        self.address
    }

    /// The derived subdomain label (prefix included)
    pub fn subdomain(&self) -> &str {
        &self.subdomain
    }

    /// True if a record's content points at this node
    pub fn matches_content(&self, content: &str) -> bool {
        content.trim().parse::<Ipv4Addr>().is_ok_and(|ip| ip == self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_derives_subdomain() {
        let node = Node::new("worker-1", "10.0.0.1", "node-").unwrap();
        assert_eq!(node.name(), "worker-1");
        assert_eq!(node.address(), Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(node.subdomain(), "node-0a000001");
    }

    #[test]
    fn test_node_rejects_ipv6() {
        assert!(Node::new("worker-1", "fe80::1", "node-").is_err());
    }

    #[test]
    fn test_matches_content() {
        let node = Node::new("worker-1", "10.0.0.1", "node-").unwrap();
        assert!(node.matches_content("10.0.0.1"));
        assert!(!node.matches_content("10.0.0.10"));
        assert!(!node.matches_content("not-an-ip"));
    }

    #[test]
    fn test_from_address() {
        let entry = NodeAddress::new("worker-2", "192.168.1.10");
        let node = Node::from_address(&entry, "k8s-").unwrap();
        assert_eq!(node.subdomain(), "k8s-c0a8010a");
    }
}
