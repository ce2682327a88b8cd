// # Label Synchronizer
//
// Writes each node's subdomain into a configurable node label so workloads
// can discover the DNS name of the node they run on.
//
// ## Guarantees
//
// - At most one label update per node per run: once a node's label has been
//   written it is remembered in `SyncedNodes` and later calls return
//   immediately. A node whose label was already correct is not remembered
//   and is fetched again on the next call.
// - No label key configured means every call is a no-op.
// - Any cluster error is returned to the caller; there is no retry.

use crate::error::Result;
use crate::node::Node;
use crate::traits::NodeSource;
use std::collections::HashSet;
use tracing::{debug, info};

/// Names of nodes whose label has already been synchronized in this run
#[derive(Debug, Clone, Default)]
pub struct SyncedNodes {
    names: HashSet<String>,
}

impl SyncedNodes {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the node was synchronized in this run
    pub fn contains(&self, node_name: &str) -> bool {
        self.names.contains(node_name)
    }

    /// Record a node as synchronized
    pub fn insert(&mut self, node_name: impl Into<String>) {
        self.names.insert(node_name.into());
    }

    /// Number of synchronized nodes
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True if no node has been synchronized yet
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// What a call to [`LabelSynchronizer::sync`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelOutcome {
    /// No label key configured
    Disabled,
    /// Node was already handled earlier in this run
    AlreadySynced,
    /// Label already had the right value
    Unchanged,
    /// Label was written
    Updated,
}

/// Keeps node labels in line with their assigned subdomains
#[derive(Debug)]
pub struct LabelSynchronizer {
    label_name: Option<String>,
    synced: SyncedNodes,
}

impl LabelSynchronizer {
    /// Create a synchronizer
    ///
    /// # Parameters
    ///
    /// - `label_name`: Label key to write; `None` or empty disables syncing
    /// - `synced`: Run-scoped record of nodes already handled
    pub fn new(label_name: Option<String>, synced: SyncedNodes) -> Self {
        Self {
            label_name: label_name.filter(|l| !l.is_empty()),
            synced,
        }
    }

    /// The configured label key
    pub fn label_name(&self) -> Option<&str> {
        self.label_name.as_deref()
    }

    /// Nodes handled so far
    pub fn synced(&self) -> &SyncedNodes {
        &self.synced
    }

    /// Ensure `node`'s label holds its subdomain
    pub async fn sync(&mut self, source: &dyn NodeSource, node: &Node) -> Result<LabelOutcome> {
        let Some(label_name) = self.label_name.as_deref() else {
            return Ok(LabelOutcome::Disabled);
        };

        if self.synced.contains(node.name()) {
            return Ok(LabelOutcome::AlreadySynced);
        }

        let mut cluster_node = source.get_node(node.name()).await?;

        if cluster_node.label(label_name) == Some(node.subdomain()) {
            debug!(
                "Label \"{}\" of node \"{}\" already set to \"{}\"",
                label_name,
                node.name(),
                node.subdomain()
            );
            return Ok(LabelOutcome::Unchanged);
        }

        info!(
            "Set label \"{}\" with value \"{}\" for node \"{}\"",
            label_name,
            node.subdomain(),
            node.name()
        );
        cluster_node
            .labels
            .insert(label_name.to_string(), node.subdomain().to_string());
        source.update_labels(&cluster_node).await?;

        self.synced.insert(node.name());
        Ok(LabelOutcome::Updated)
    }
}
