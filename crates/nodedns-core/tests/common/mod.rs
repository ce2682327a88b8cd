//! Test doubles and common utilities for reconciler contract tests
//!
//! The mocks keep their state behind an `Arc`, so a test can hand a clone to
//! the reconciler and keep another to inspect what happened.

#![allow(dead_code)]

use nodedns_core::error::{Error, Result};
use nodedns_core::traits::{
    AddressType, ClusterNode, DnsProvider, DnsRecord, NewRecord, NodeAddress, NodeSource,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

pub use nodedns_core::config::{ProviderConfig, SyncConfig};

/// A call made against [`MockDnsProvider`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    ZoneId(String),
    List(String),
    Create { zone_id: String, name: String, content: String },
    Delete { zone_id: String, record_id: String },
}

#[derive(Default)]
struct ProviderState {
    zones: HashMap<String, String>,
    records: HashMap<String, Vec<DnsRecord>>,
    calls: Vec<ProviderCall>,
    next_id: usize,
    fail_on: Option<&'static str>,
}

/// In-memory DNS provider that records every call
#[derive(Clone, Default)]
pub struct MockDnsProvider {
    state: Arc<Mutex<ProviderState>>,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a zone
    pub fn with_zone(self, name: &str, id: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.zones.insert(name.to_string(), id.to_string());
            state.records.entry(id.to_string()).or_default();
        }
        self
    }

    /// Add an existing record to a zone
    pub fn with_record(self, zone_id: &str, id: &str, name: &str, content: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .records
            .entry(zone_id.to_string())
            .or_default()
            .push(DnsRecord::new(id, name, content));
        self
    }

    /// Make one operation ("zone_id", "list", "create", "delete") fail
    pub fn failing_on(self, operation: &'static str) -> Self {
        self.state.lock().unwrap().fail_on = Some(operation);
        self
    }

    /// All calls so far, in order
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Only the mutating calls
    pub fn mutations(&self) -> Vec<ProviderCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, ProviderCall::Create { .. } | ProviderCall::Delete { .. }))
            .collect()
    }

    /// Current records of a zone
    pub fn records(&self, zone_id: &str) -> Vec<DnsRecord> {
        self.state
            .lock()
            .unwrap()
            .records
            .get(zone_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Current record names of a zone, sorted
    pub fn record_names(&self, zone_id: &str) -> Vec<String> {
        let mut names: Vec<String> = self.records(zone_id).into_iter().map(|r| r.name).collect();
        names.sort();
        names
    }

    fn check(&self, operation: &'static str) -> Result<()> {
        if self.state.lock().unwrap().fail_on == Some(operation) {
            return Err(Error::provider("mock", format!("{} failed", operation)));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn zone_id(&self, zone_name: &str) -> Result<String> {
        self.state
            .lock()
            .unwrap()
            .calls
            .push(ProviderCall::ZoneId(zone_name.to_string()));
        self.check("zone_id")?;
        self.state
            .lock()
            .unwrap()
            .zones
            .get(zone_name)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("Zone not found: {}", zone_name)))
    }

    async fn list_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>> {
        self.state
            .lock()
            .unwrap()
            .calls
            .push(ProviderCall::List(zone_id.to_string()));
        self.check("list")?;
        Ok(self.records(zone_id))
    }

    async fn create_record(&self, zone_id: &str, record: &NewRecord) -> Result<DnsRecord> {
        self.state.lock().unwrap().calls.push(ProviderCall::Create {
            zone_id: zone_id.to_string(),
            name: record.name.clone(),
            content: record.address.to_string(),
        });
        self.check("create")?;

        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let created = DnsRecord::new(
            format!("created-{}", state.next_id),
            record.name.clone(),
            record.address.to_string(),
        );
        state
            .records
            .entry(zone_id.to_string())
            .or_default()
            .push(created.clone());
        Ok(created)
    }

    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<()> {
        self.state.lock().unwrap().calls.push(ProviderCall::Delete {
            zone_id: zone_id.to_string(),
            record_id: record_id.to_string(),
        });
        self.check("delete")?;

        let mut state = self.state.lock().unwrap();
        let records = state.records.entry(zone_id.to_string()).or_default();
        let before = records.len();
        records.retain(|r| r.id != record_id);
        if records.len() == before {
            return Err(Error::not_found(format!("Record not found: {}", record_id)));
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

#[derive(Default)]
struct SourceState {
    // (node name, address type, address)
    addresses: Vec<(String, String, String)>,
    nodes: HashMap<String, ClusterNode>,
    selectors: Vec<Option<String>>,
    get_calls: Vec<String>,
    update_calls: Vec<String>,
    fail_on: Option<&'static str>,
}

/// In-memory cluster that records every call
#[derive(Clone, Default)]
pub struct MockNodeSource {
    state: Arc<Mutex<SourceState>>,
}

impl MockNodeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node with one external address
    pub fn with_node(self, name: &str, external_ip: &str) -> Self {
        self.with_address(name, "ExternalIP", external_ip)
    }

    /// Add an address of any type to a node (creating the node if needed)
    pub fn with_address(self, name: &str, address_type: &str, address: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state
                .addresses
                .push((name.to_string(), address_type.to_string(), address.to_string()));
            state.nodes.entry(name.to_string()).or_insert_with(|| ClusterNode {
                name: name.to_string(),
                labels: BTreeMap::new(),
                resource_version: Some("1".to_string()),
            });
        }
        self
    }

    /// Set a label on an existing node
    pub fn with_label(self, name: &str, key: &str, value: &str) -> Self {
        if let Some(node) = self.state.lock().unwrap().nodes.get_mut(name) {
            node.labels.insert(key.to_string(), value.to_string());
        }
        self
    }

    /// Make one operation ("list", "get", "update") fail
    pub fn failing_on(self, operation: &'static str) -> Self {
        self.state.lock().unwrap().fail_on = Some(operation);
        self
    }

    pub fn label(&self, node: &str, key: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .nodes
            .get(node)
            .and_then(|n| n.labels.get(key).cloned())
    }

    pub fn selectors(&self) -> Vec<Option<String>> {
        self.state.lock().unwrap().selectors.clone()
    }

    pub fn get_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().get_calls.clone()
    }

    pub fn update_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().update_calls.clone()
    }

    fn check(&self, operation: &'static str) -> Result<()> {
        if self.state.lock().unwrap().fail_on == Some(operation) {
            return Err(Error::cluster(format!("{} failed", operation)));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl NodeSource for MockNodeSource {
    async fn list_addresses(
        &self,
        label_selector: Option<&str>,
        address_type: AddressType,
    ) -> Result<Vec<NodeAddress>> {
        self.state
            .lock()
            .unwrap()
            .selectors
            .push(label_selector.map(str::to_string));
        self.check("list")?;

        Ok(self
            .state
            .lock()
            .unwrap()
            .addresses
            .iter()
            .filter(|(_, kind, _)| kind == address_type.as_kubernetes())
            .map(|(name, _, addr)| NodeAddress::new(name.clone(), addr.clone()))
            .collect())
    }

    async fn get_node(&self, name: &str) -> Result<ClusterNode> {
        self.state.lock().unwrap().get_calls.push(name.to_string());
        self.check("get")?;
        self.state
            .lock()
            .unwrap()
            .nodes
            .get(name)
            .cloned()
            .ok_or_else(|| Error::cluster(format!("node {} not found", name)))
    }

    async fn update_labels(&self, node: &ClusterNode) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .update_calls
            .push(node.name.clone());
        self.check("update")?;
        self.state
            .lock()
            .unwrap()
            .nodes
            .insert(node.name.clone(), node.clone());
        Ok(())
    }

    fn source_name(&self) -> &'static str {
        "mock"
    }
}

/// Helper to create a minimal SyncConfig for testing
pub fn minimal_config(prefix: &str, suffixes: &str, zone: &str) -> SyncConfig {
    SyncConfig::new(prefix, suffixes, ProviderConfig::cloudflare_token("test-token")).with_zone(zone)
}
