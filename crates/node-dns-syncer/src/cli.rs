//! Command-line interface
//!
//! Every option can also come from an environment variable. Values are kept
//! as `Option` so [`crate::settings`] can fall back to the config file.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Publish Kubernetes node addresses as Cloudflare DNS records
#[derive(Debug, Parser)]
#[command(name = "node-dns-syncer", version, about)]
pub struct Cli {
    /// Config file (default: $HOME/.node-dns-syncer.yaml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Reconcile DNS records and node labels once, then exit
    Sync(SyncArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct SyncArgs {
    /// Prefix of every managed record name
    #[arg(long, env = "DOMAIN_NAME_PREFIX")]
    pub domain_name_prefix: Option<String>,

    /// Comma-separated suffixes placed between subdomain and zone
    #[arg(long, env = "DOMAIN_NAME_SUFFIX")]
    pub domain_name_suffix: Option<String>,

    /// Log the plan without changing DNS records or node labels
    #[arg(
        long,
        env = "DRY_RUN",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub dry_run: Option<bool>,

    /// Cloudflare API token
    #[arg(long, env = "CF_API_TOKEN", hide_env_values = true)]
    pub cf_api_token: Option<String>,

    /// Cloudflare global API key (requires --cf-api-email)
    #[arg(long, env = "CF_API_KEY", hide_env_values = true)]
    pub cf_api_key: Option<String>,

    /// Cloudflare account email
    #[arg(long, env = "CF_API_EMAIL")]
    pub cf_api_email: Option<String>,

    /// Comma-separated Cloudflare zones to reconcile
    #[arg(long, env = "CF_ZONES")]
    pub cf_zones: Option<String>,

    /// Only publish nodes matching this label selector
    #[arg(long, env = "K8S_LABEL_SELECTOR")]
    pub k8s_label_selector: Option<String>,

    /// Node label that receives the node's subdomain
    #[arg(long, env = "K8S_LABEL_NAME")]
    pub k8s_label_name: Option<String>,

    /// Node address type to publish (external, internal)
    #[arg(long, env = "K8S_ADDRESS_TYPE")]
    pub k8s_address_type: Option<String>,
}
