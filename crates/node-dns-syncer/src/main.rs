// # node-dns-syncer
//
// Publishes the addresses of Kubernetes nodes as A records in Cloudflare
// zones and writes each node's DNS label back onto the node.
//
// The binary is a thin integration layer:
// 1. Parse the command line and resolve configuration (flag > env > file)
// 2. Initialize logging
// 3. Connect the Cloudflare provider and the Kubernetes node source
// 4. Run one reconciliation pass and exit
//
// All reconciliation logic lives in nodedns-core.
//
// ## Example
//
// ```bash
// export CF_API_TOKEN=your_token
// node-dns-syncer sync \
//     --domain-name-prefix node- \
//     --domain-name-suffix .k8s. \
//     --cf-zones example.com \
//     --k8s-label-name node-dns-syncer/subdomain \
//     --dry-run
// ```
//
// ## Logging
//
// - `RUST_LOG`: filter directives (default `info`)
// - `LOG_FORMAT=json`: one JSON object per line

mod cli;
mod settings;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use nodedns_core::{Reconciler, SyncConfig};
use nodedns_provider_cloudflare::CloudflareProvider;
use nodedns_source_kube::KubeNodeSource;
use settings::FileConfig;
use std::process::ExitCode;
use tracing::{error, info};

/// Process exit status
#[derive(Debug, Clone, Copy)]
enum SyncerExitCode {
    /// Every zone reconciled
    Success = 0,
    /// Configuration error or failed run
    Failure = 1,
}

impl From<SyncerExitCode> for ExitCode {
    fn from(code: SyncerExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return SyncerExitCode::Failure.into();
        }
    };

    init_logging();

    info!("Starting node-dns-syncer");
    info!(
        "Configuration loaded: {} zone(s), {} suffix(es), provider {:?}",
        config.zones.len(),
        config.domain_name_suffixes.len(),
        config.provider
    );

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return SyncerExitCode::Failure.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_sync(config).await {
            error!("Sync failed: {:#}", e);
            SyncerExitCode::Failure
        } else {
            SyncerExitCode::Success
        }
    });

    result.into()
}

fn load_config(cli: &Cli) -> Result<SyncConfig> {
    let file = FileConfig::load(cli.config.as_deref())?;
    let Command::Sync(args) = &cli.command;
    settings::resolve(args, &file)
}

/// Install the global tracing subscriber
fn init_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
    }
}

/// Connect both ends and run one reconciliation pass
async fn run_sync(config: SyncConfig) -> Result<()> {
    let provider = CloudflareProvider::from_config(&config.provider)
        .context("Failed to create Cloudflare provider")?;

    let kubeconfig = settings::kubeconfig_path();
    let source = KubeNodeSource::connect(kubeconfig.as_deref())
        .await
        .context("Failed to connect to Kubernetes")?;

    let mut reconciler = Reconciler::new(Box::new(provider), Box::new(source), config)?;
    let report = reconciler.run().await?;

    let created: usize = report.zones.iter().map(|z| z.created.len()).sum();
    let deleted: usize = report.zones.iter().map(|z| z.deleted.len()).sum();
    info!(
        "Sync finished: {} node address(es), {} zone(s), {} record(s) created, {} deleted",
        report.nodes,
        report.zones.len(),
        created,
        deleted
    );

    Ok(())
}
