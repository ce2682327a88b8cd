//! Zone reconciler
//!
//! The Reconciler is responsible for:
//! - Listing the desired nodes once per run
//! - Snapshotting each configured zone's address records
//! - Computing a [`ReconciliationPlan`] per zone
//! - Executing deletions, then creations, against the DNS provider
//! - Keeping node labels in sync with their subdomains
//!
//! ## Flow
//!
//! ```text
//! ┌─────────────┐   nodes    ┌──────────────┐   plan    ┌─────────────┐
//! │ NodeSource  │──────────▶│  Reconciler  │─────────▶│ DnsProvider │
//! └─────────────┘            └──────────────┘           └─────────────┘
//!        ▲                           │
//!        └──── label updates ────────┘
//! ```
//!
//! Zones are processed one after another and every call is awaited before
//! the next one starts. The first error ends the run; operations already
//! applied stay applied and the next run recomputes from scratch.

use crate::config::SyncConfig;
use crate::error::Result;
use crate::labels::{LabelOutcome, LabelSynchronizer, SyncedNodes};
use crate::node::Node;
use crate::plan::{DesiredState, ReconciliationPlan};
use crate::traits::{DnsProvider, NewRecord, NodeSource};
use tracing::{debug, info, warn};

/// What one zone pass did (or, in dry-run, would have done)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneReport {
    /// Zone name as configured
    pub zone: String,
    /// Provider zone ID
    pub zone_id: String,
    /// Whether mutations were skipped
    pub dry_run: bool,
    /// Names of deleted records, in execution order
    pub deleted: Vec<String>,
    /// Names of created records, in execution order
    pub created: Vec<String>,
    /// Desired names that already existed
    pub existing: Vec<String>,
    /// Number of node labels written
    pub labels_updated: usize,
}

impl ZoneReport {
    /// True if the zone needed no changes
    pub fn is_converged(&self) -> bool {
        self.deleted.is_empty() && self.created.is_empty()
    }
}

/// Result of a full run across all zones
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Number of node addresses considered
    pub nodes: usize,
    /// Per-zone results, in configured order
    pub zones: Vec<ZoneReport>,
}

/// Reconciles DNS zones against cluster nodes
///
/// ## Lifecycle
///
/// 1. Create with [`Reconciler::new()`]
/// 2. Call [`Reconciler::run()`] once
/// 3. Drop
///
/// The label synchronizer's state lives as long as the reconciler, so a node
/// labelled while processing the first zone is not fetched again for later
/// zones.
pub struct Reconciler {
    /// DNS provider for reading and mutating zones
    provider: Box<dyn DnsProvider>,

    /// Cluster node source
    source: Box<dyn NodeSource>,

    /// Run settings
    config: SyncConfig,

    /// Node label write-back
    labels: LabelSynchronizer,
}

impl Reconciler {
    /// Create a new reconciler
    ///
    /// # Parameters
    ///
    /// - `provider`: DNS provider implementation
    /// - `source`: Cluster node source implementation
    /// - `config`: Validated before use
    pub fn new(
        provider: Box<dyn DnsProvider>,
        source: Box<dyn NodeSource>,
        config: SyncConfig,
    ) -> Result<Self> {
        config.validate()?;

        let labels = LabelSynchronizer::new(config.nodes.label_name.clone(), SyncedNodes::new());

        Ok(Self {
            provider,
            source,
            config,
            labels,
        })
    }

    /// The label synchronizer (and its per-run state)
    pub fn labels(&self) -> &LabelSynchronizer {
        &self.labels
    }

    /// Reconcile every configured zone
    ///
    /// # Returns
    ///
    /// - `Ok(RunReport)`: All zones processed
    /// - `Err(Error)`: The first failure; later zones were not touched
    pub async fn run(&mut self) -> Result<RunReport> {
        if self.config.dry_run {
            warn!("Running in DRY-RUN mode - no DNS records or node labels will be changed");
        }

        let nodes = self.collect_nodes().await?;
        info!(
            "Got {} node address(es): {:?}",
            nodes.len(),
            nodes.iter().map(|n| n.address().to_string()).collect::<Vec<_>>()
        );

        let zones = self.config.zones.clone();
        let mut report = RunReport {
            nodes: nodes.len(),
            zones: Vec::with_capacity(zones.len()),
        };

        for zone in &zones {
            info!("Processing zone {}", zone);
            report.zones.push(self.reconcile_zone(zone, &nodes).await?);
        }

        Ok(report)
    }

    /// List node addresses and derive each node's subdomain
    pub async fn collect_nodes(&self) -> Result<Vec<Node>> {
        let selector = self
            .config
            .nodes
            .label_selector
            .as_deref()
            .filter(|s| !s.is_empty());
        let address_type = self.config.nodes.address_type;

        debug!(
            "Listing nodes from {} (selector: {:?}, address type: {})",
            self.source.source_name(),
            selector,
            address_type
        );

        let addresses = self.source.list_addresses(selector, address_type).await?;

        addresses
            .iter()
            .map(|a| Node::from_address(a, &self.config.domain_name_prefix))
            .collect()
    }

    /// Reconcile one zone against the given nodes
    ///
    /// # Parameters
    ///
    /// - `zone_name`: Zone to resolve and reconcile
    /// - `nodes`: Desired nodes (from [`Reconciler::collect_nodes`])
    pub async fn reconcile_zone(&mut self, zone_name: &str, nodes: &[Node]) -> Result<ZoneReport> {
        let dry_run = self.config.dry_run;

        let zone_id = self.provider.zone_id(zone_name).await?;
        debug!("Zone {} has ID {}", zone_name, zone_id);

        let records = self.provider.list_records(&zone_id).await?;
        debug!("Zone {} has {} address record(s)", zone_name, records.len());

        let plan = ReconciliationPlan::compute(
            nodes,
            &records,
            &self.config.domain_name_prefix,
            &self.config.domain_name_suffixes,
            zone_name,
        );

        let mut report = ZoneReport {
            zone: zone_name.to_string(),
            zone_id: zone_id.clone(),
            dry_run,
            ..Default::default()
        };

        for record in &plan.to_delete {
            info!("Remove record \"{}\"", record.name);
            if !dry_run {
                self.provider.delete_record(&zone_id, &record.id).await?;
            }
            report.deleted.push(record.name.clone());
        }

        for desired in &plan.desired {
            match desired.state {
                DesiredState::Satisfied(_) => {
                    info!(
                        "Record \"{}\" with ip {} already exists",
                        desired.name,
                        desired.node.address()
                    );
                    report.existing.push(desired.name.clone());
                }
                DesiredState::Missing => {
                    info!(
                        "Add record \"{}\" with ip {}",
                        desired.name,
                        desired.node.address()
                    );
                    if !dry_run {
                        let new_record = NewRecord::a(desired.name.clone(), desired.node.address());
                        self.provider.create_record(&zone_id, &new_record).await?;
                    }
                    report.created.push(desired.name.clone());
                }
            }

            // Label sync follows a confirmed record, which dry-run never has.
            if !dry_run
                && self.labels.sync(self.source.as_ref(), desired.node).await?
                    == LabelOutcome::Updated
            {
                report.labels_updated += 1;
            }
        }

        info!(
            "Zone {} done: {} deleted, {} created, {} already present{}",
            zone_name,
            report.deleted.len(),
            report.created.len(),
            report.existing.len(),
            if dry_run { " (dry-run)" } else { "" }
        );

        Ok(report)
    }
}
