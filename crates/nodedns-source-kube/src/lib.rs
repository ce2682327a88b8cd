// # Kubernetes Node Source
//
// `NodeSource` implementation backed by the Kubernetes API.
//
// - Lists `Node` objects (optionally filtered by a label selector) and
//   publishes each status address of the requested type
// - Reads and merge-patches node labels for subdomain write-back
//
// Every API error is returned as `Error::Cluster`; nothing is retried.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Node;
use kube::api::{Api, ListParams, Patch, PatchParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config, ResourceExt};
use nodedns_core::traits::{AddressType, ClusterNode, NodeAddress, NodeSource};
use nodedns_core::{Error, Result};
use std::path::Path;

/// Field manager recorded on label patches
const FIELD_MANAGER: &str = "node-dns-syncer";

/// Cluster nodes read through the Kubernetes API
#[derive(Clone)]
pub struct KubeNodeSource {
    client: Client,
}

impl KubeNodeSource {
    /// Wrap an existing client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connect to the cluster
    ///
    /// Uses `kubeconfig` when the file exists, otherwise the in-cluster
    /// service account configuration.
    pub async fn connect(kubeconfig: Option<&Path>) -> Result<Self> {
        let config = match kubeconfig.filter(|p| p.exists()) {
            Some(path) => {
                tracing::debug!("Using kubeconfig {}", path.display());
                let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                    Error::cluster(format!("Failed to read kubeconfig {}: {}", path.display(), e))
                })?;
                Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                    .await
                    .map_err(|e| Error::cluster(format!("Invalid kubeconfig: {}", e)))?
            }
            None => {
                tracing::debug!("Using in-cluster configuration");
                Config::incluster()
                    .map_err(|e| Error::cluster(format!("In-cluster configuration unavailable: {}", e)))?
            }
        };

        let client = Client::try_from(config)
            .map_err(|e| Error::cluster(format!("Failed to create Kubernetes client: {}", e)))?;

        Ok(Self::new(client))
    }

    fn nodes(&self) -> Api<Node> {
        Api::all(self.client.clone())
    }
}

/// Addresses of `node` matching `address_type`, in status order
pub fn node_addresses(node: &Node, address_type: AddressType) -> Vec<NodeAddress> {
    let wanted = address_type.as_kubernetes();
    let name = node.name_any();

    node.status
        .as_ref()
        .and_then(|status| status.addresses.as_ref())
        .map(|addresses| {
            addresses
                .iter()
                .filter(|a| a.type_ == wanted)
                .map(|a| NodeAddress::new(name.clone(), a.address.clone()))
                .collect()
        })
        .unwrap_or_default()
}

/// Label view of a node object
pub fn cluster_node(node: &Node) -> ClusterNode {
    ClusterNode {
        name: node.name_any(),
        labels: node.labels().clone(),
        resource_version: node.resource_version(),
    }
}

/// Merge patch replacing the labels of `node`
///
/// Carries the resource version so a concurrent change makes the patch fail
/// instead of being overwritten.
pub fn label_patch(node: &ClusterNode) -> serde_json::Value {
    let mut metadata = serde_json::json!({ "labels": node.labels });
    if let Some(version) = &node.resource_version {
        metadata["resourceVersion"] = serde_json::Value::String(version.clone());
    }
    serde_json::json!({ "metadata": metadata })
}

#[async_trait]
impl NodeSource for KubeNodeSource {
    async fn list_addresses(
        &self,
        label_selector: Option<&str>,
        address_type: AddressType,
    ) -> Result<Vec<NodeAddress>> {
        let mut params = ListParams::default();
        if let Some(selector) = label_selector {
            params = params.labels(selector);
        }

        let nodes = self
            .nodes()
            .list(&params)
            .await
            .map_err(|e| Error::cluster(format!("Failed to list nodes: {}", e)))?;

        tracing::debug!("Listed {} node(s)", nodes.items.len());

        Ok(nodes
            .items
            .iter()
            .flat_map(|node| node_addresses(node, address_type))
            .collect())
    }

    async fn get_node(&self, name: &str) -> Result<ClusterNode> {
        let node = self
            .nodes()
            .get(name)
            .await
            .map_err(|e| Error::cluster(format!("Failed to get node {}: {}", name, e)))?;
        Ok(cluster_node(&node))
    }

    async fn update_labels(&self, node: &ClusterNode) -> Result<()> {
        let patch = label_patch(node);
        self.nodes()
            .patch(&node.name, &PatchParams::apply(FIELD_MANAGER), &Patch::Merge(&patch))
            .await
            .map_err(|e| Error::cluster(format!("Failed to update node {}: {}", node.name, e)))?;
        Ok(())
    }

    fn source_name(&self) -> &'static str {
        "kubernetes"
    }
}
