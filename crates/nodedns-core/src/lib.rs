// # nodedns-core
//
// Core library for keeping DNS address records in sync with cluster nodes.
//
// ## Architecture Overview
//
// - **encoder**: Derives a node's subdomain label from its IPv4 address
// - **plan**: Diffs desired nodes against a zone snapshot (records to delete/create)
// - **labels**: Writes each node's subdomain into a node label, once per run
// - **Reconciler**: Runs the above for every configured zone
// - **DnsProvider** / **NodeSource**: Traits implemented by plugin crates
//
// ## Design Principles
//
// 1. **Stateless runs**: Every invocation recomputes names from live addresses
// 2. **Fail fast**: The first error ends the run; the next scheduled run retries
// 3. **Library-first**: The binary only resolves configuration and wires plugins
// 4. **Idempotency**: Re-running against converged state changes nothing

pub mod config;
pub mod encoder;
pub mod error;
pub mod labels;
pub mod node;
pub mod plan;
pub mod reconciler;
pub mod traits;

// Re-export core types for convenience
pub use config::{NodeSelectorConfig, ProviderConfig, SyncConfig};
pub use error::{Error, Result};
pub use labels::{LabelOutcome, LabelSynchronizer, SyncedNodes};
pub use node::Node;
pub use plan::{DesiredRecord, DesiredState, ReconciliationPlan};
pub use reconciler::{Reconciler, RunReport, ZoneReport};
pub use traits::{AddressType, ClusterNode, DnsProvider, DnsRecord, NewRecord, NodeAddress, NodeSource};
