//! Record differ
//!
//! Computes, for one zone, which existing records are stale and which desired
//! record names are missing. The computation is pure: it works on a snapshot
//! of the zone taken before any mutation, and the reconciler executes the
//! result afterwards.
//!
//! ## Rules
//!
//! 1. A record is **stale** if its name starts with the configured prefix and
//!    its content is not the address of any desired node. Records without the
//!    prefix belong to someone else and are never touched.
//! 2. Every node expects one record per suffix:
//!    `subdomain + suffix + zone_name`.
//! 3. A desired name is **satisfied** if the snapshot has a record with that
//!    exact name whose name is not scheduled for deletion. Otherwise it is
//!    **missing** and will be created.

use crate::node::Node;
use crate::traits::DnsRecord;
use std::collections::HashSet;

/// Whether a desired record name already exists
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DesiredState<'a> {
    /// A surviving record with this name exists
    Satisfied(&'a DnsRecord),
    /// No surviving record; the name must be created
    Missing,
}

/// One desired record name and the node it points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredRecord<'a> {
    /// Fully-qualified record name
    pub name: String,
    /// Node the record points at
    pub node: &'a Node,
    /// Existence in the snapshot
    pub state: DesiredState<'a>,
}

impl DesiredRecord<'_> {
    /// True if the record must be created
    pub fn is_missing(&self) -> bool {
        matches!(self.state, DesiredState::Missing)
    }
}

/// The operations needed to converge one zone
///
/// `desired` keeps node-then-suffix order with satisfied and missing names
/// interleaved, so executing it in order reproduces the enumeration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationPlan<'a> {
    /// Stale records, in snapshot order
    pub to_delete: Vec<&'a DnsRecord>,
    /// Every desired name, in node-then-suffix order
    pub desired: Vec<DesiredRecord<'a>>,
}

impl<'a> ReconciliationPlan<'a> {
    /// Diff the desired nodes against a zone snapshot
    ///
    /// # Parameters
    ///
    /// - `nodes`: Desired nodes, each with its derived subdomain
    /// - `records`: Snapshot of the zone's address records
    /// - `prefix`: Name prefix that marks records as managed
    /// - `suffixes`: Already-trimmed name suffixes (may contain "")
    /// - `zone_name`: Appended verbatim after the suffix
    pub fn compute(
        nodes: &'a [Node],
        records: &'a [DnsRecord],
        prefix: &str,
        suffixes: &[String],
        zone_name: &str,
    ) -> Self {
        let to_delete: Vec<&DnsRecord> = records
            .iter()
            .filter(|r| r.name.starts_with(prefix))
            .filter(|r| !nodes.iter().any(|n| n.matches_content(&r.content)))
            .collect();

        // Exclusion is by name: a name being deleted never counts as present,
        // even if another record shares it.
        let deleted: HashSet<&str> = to_delete.iter().map(|r| r.name.as_str()).collect();

        let mut desired = Vec::with_capacity(nodes.len() * suffixes.len());
        for node in nodes {
            for suffix in suffixes {
                let name = format!("{}{}{}", node.subdomain(), suffix, zone_name);
                let state = records
                    .iter()
                    .find(|r| r.name == name && !deleted.contains(r.name.as_str()))
                    .map_or(DesiredState::Missing, DesiredState::Satisfied);
                desired.push(DesiredRecord { name, node, state });
            }
        }

        Self { to_delete, desired }
    }

    /// Desired names that must be created, in node-then-suffix order
    pub fn to_create(&self) -> impl Iterator<Item = &DesiredRecord<'a>> {
        self.desired.iter().filter(|d| d.is_missing())
    }

    /// Desired names that already exist
    pub fn satisfied(&self) -> impl Iterator<Item = &DesiredRecord<'a>> {
        self.desired.iter().filter(|d| !d.is_missing())
    }

    /// True if nothing needs to be deleted or created
    pub fn is_noop(&self) -> bool {
        self.to_delete.is_empty() && self.to_create().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_suffixes;

    fn node(name: &str, addr: &str) -> Node {
        Node::new(name, addr, "node-").unwrap()
    }

    fn record(id: &str, name: &str, content: &str) -> DnsRecord {
        DnsRecord::new(id, name, content)
    }

    fn names<'p, 'a: 'p>(it: impl Iterator<Item = &'p DesiredRecord<'a>>) -> Vec<String> {
        it.map(|d| d.name.clone()).collect()
    }

    #[test]
    fn test_missing_record_is_created() {
        let nodes = vec![node("w1", "10.0.0.1")];
        let suffixes = parse_suffixes(".example.com");
        let plan = ReconciliationPlan::compute(&nodes, &[], "node-", &suffixes, "");

        assert!(plan.to_delete.is_empty());
        let create: Vec<_> = plan.to_create().collect();
        assert_eq!(create.len(), 1);
        assert_eq!(create[0].name, "node-0a000001.example.com");
        assert_eq!(create[0].node.address().to_string(), "10.0.0.1");
    }

    #[test]
    fn test_existing_record_is_satisfied() {
        let nodes = vec![node("w1", "10.0.0.1")];
        let records = vec![record("r1", "node-0a000001.example.com", "10.0.0.1")];
        let suffixes = parse_suffixes(".example.com");
        let plan = ReconciliationPlan::compute(&nodes, &records, "node-", &suffixes, "");

        assert!(plan.is_noop());
        let satisfied: Vec<_> = plan.satisfied().collect();
        assert_eq!(satisfied.len(), 1);
        assert_eq!(satisfied[0].state, DesiredState::Satisfied(&records[0]));
    }

    #[test]
    fn test_stale_record_is_deleted() {
        let nodes = vec![node("w1", "10.0.0.1")];
        let records = vec![
            record("r1", "node-0a000001.example.com", "10.0.0.1"),
            record("r2", "node-0a000099.example.com", "10.0.0.99"),
        ];
        let suffixes = parse_suffixes(".example.com");
        let plan = ReconciliationPlan::compute(&nodes, &records, "node-", &suffixes, "");

        assert_eq!(plan.to_delete, vec![&records[1]]);
        assert_eq!(plan.to_create().count(), 0);
    }

    #[test]
    fn test_unprefixed_records_are_never_deleted() {
        let records = vec![
            record("r1", "www.example.com", "203.0.113.7"),
            record("r2", "mail.example.com", "203.0.113.8"),
            record("r3", "node-0a000099.example.com", "10.0.0.99"),
        ];
        let suffixes = parse_suffixes(".example.com");
        let plan = ReconciliationPlan::compute(&[], &records, "node-", &suffixes, "");

        assert_eq!(plan.to_delete, vec![&records[2]]);
    }

    #[test]
    fn test_deleted_name_never_counts_as_present() {
        // Same name, two records: one points at a live node, one is stale.
        // The stale one schedules the name for deletion, so the name must be
        // recreated rather than treated as satisfied.
        let nodes = vec![node("w1", "10.0.0.1")];
        let records = vec![
            record("r1", "node-0a000001.example.com", "10.0.0.50"),
            record("r2", "node-0a000001.example.com", "10.0.0.1"),
        ];
        let suffixes = parse_suffixes(".example.com");
        let plan = ReconciliationPlan::compute(&nodes, &records, "node-", &suffixes, "");

        assert_eq!(plan.to_delete, vec![&records[0]]);
        assert_eq!(plan.satisfied().count(), 0);
        assert_eq!(names(plan.to_create()), vec!["node-0a000001.example.com"]);
    }

    #[test]
    fn test_cross_product_order() {
        let nodes = vec![node("w1", "10.0.0.1"), node("w2", "10.0.0.2")];
        let suffixes = parse_suffixes(".a., .b.");
        let records = vec![record("r1", "node-0a000001.b.example.com", "10.0.0.1")];
        let plan =
            ReconciliationPlan::compute(&nodes, &records, "node-", &suffixes, "example.com");

        let all: Vec<String> = plan.desired.iter().map(|d| d.name.clone()).collect();
        assert_eq!(
            all,
            vec![
                "node-0a000001.a.example.com",
                "node-0a000001.b.example.com",
                "node-0a000002.a.example.com",
                "node-0a000002.b.example.com",
            ]
        );
        assert_eq!(
            names(plan.to_create()),
            vec![
                "node-0a000001.a.example.com",
                "node-0a000002.a.example.com",
                "node-0a000002.b.example.com",
            ]
        );
        assert_eq!(names(plan.satisfied()), vec!["node-0a000001.b.example.com"]);
    }

    #[test]
    fn test_empty_suffix_means_no_suffix() {
        let nodes = vec![node("w1", "10.0.0.1")];
        let suffixes = parse_suffixes(".k8s., ");
        let plan = ReconciliationPlan::compute(&nodes, &[], "node-", &suffixes, "example.com");

        assert_eq!(
            names(plan.to_create()),
            vec!["node-0a000001.k8s.example.com", "node-0a000001example.com"]
        );
    }

    #[test]
    fn test_deletions_keep_snapshot_order() {
        let records = vec![
            record("r3", "node-0a000003.x", "10.0.0.3"),
            record("r1", "node-0a000001.x", "10.0.0.1"),
            record("r2", "node-0a000002.x", "10.0.0.2"),
        ];
        let plan = ReconciliationPlan::compute(&[], &records, "node-", &parse_suffixes(".x"), "");
        let ids: Vec<&str> = plan.to_delete.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r3", "r1", "r2"]);
    }

    #[test]
    fn test_applying_plan_converges() {
        let nodes = vec![node("w1", "10.0.0.1"), node("w2", "10.0.0.2")];
        let suffixes = parse_suffixes(".a.,.b.");
        let mut records = vec![
            record("r1", "node-0a000001.a.example.com", "10.0.0.1"),
            record("r2", "node-0a000009.a.example.com", "10.0.0.9"),
            record("r3", "www.example.com", "10.0.0.9"),
        ];

        let plan =
            ReconciliationPlan::compute(&nodes, &records, "node-", &suffixes, "example.com");
        let deleted: Vec<String> = plan.to_delete.iter().map(|r| r.id.clone()).collect();
        let created: Vec<DnsRecord> = plan
            .to_create()
            .enumerate()
            .map(|(i, d)| record(&format!("new{i}"), &d.name, &d.node.address().to_string()))
            .collect();

        records.retain(|r| !deleted.contains(&r.id));
        records.extend(created);

        let again =
            ReconciliationPlan::compute(&nodes, &records, "node-", &suffixes, "example.com");
        assert!(again.is_noop());
        assert_eq!(again.satisfied().count(), 4);
    }

    #[test]
    fn test_mutual_exclusion_holds() {
        let nodes = vec![node("w1", "10.0.0.1"), node("w2", "10.0.0.2")];
        let records = vec![
            record("r1", "node-0a000001.x", "10.0.0.7"),
            record("r2", "node-0a000001.x", "10.0.0.1"),
            record("r3", "node-0a000002.x", "10.0.0.2"),
            record("r4", "node-0a000008.x", "10.0.0.8"),
        ];
        let plan = ReconciliationPlan::compute(&nodes, &records, "node-", &parse_suffixes(".x"), "");

        let deleted: HashSet<&str> = plan.to_delete.iter().map(|r| r.name.as_str()).collect();
        for d in plan.satisfied() {
            assert!(!deleted.contains(d.name.as_str()), "{} both deleted and satisfied", d.name);
        }
    }
}
