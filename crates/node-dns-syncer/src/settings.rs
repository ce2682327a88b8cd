//! Configuration resolution
//!
//! Merges command-line/environment values ([`SyncArgs`]) with the YAML
//! config file into a [`SyncConfig`]. Precedence: flag, then environment
//! (both handled by clap), then file, then default. Empty strings count as
//! unset at every level.

use crate::cli::SyncArgs;
use anyhow::{Context, Result};
use directories::BaseDirs;
use nodedns_core::{AddressType, NodeSelectorConfig, ProviderConfig, SyncConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Name of the config file looked up in the home directory
pub const DEFAULT_CONFIG_FILE: &str = ".node-dns-syncer.yaml";

/// Contents of the YAML config file
///
/// Keys match the long flag names.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub domain_name_prefix: Option<String>,
    pub domain_name_suffix: Option<String>,
    pub dry_run: Option<bool>,
    pub cf_api_token: Option<String>,
    pub cf_api_key: Option<String>,
    pub cf_api_email: Option<String>,
    pub cf_zones: Option<ZoneList>,
    pub k8s_label_selector: Option<String>,
    pub k8s_label_name: Option<String>,
    pub k8s_address_type: Option<String>,
}

/// `cf-zones` may be a comma-separated string or a YAML list
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ZoneList {
    Joined(String),
    List(Vec<String>),
}

impl ZoneList {
    fn zones(&self) -> Vec<String> {
        match self {
            ZoneList::Joined(raw) => split_list(raw),
            ZoneList::List(zones) => zones
                .iter()
                .map(|z| z.trim().to_string())
                .filter(|z| !z.is_empty())
                .collect(),
        }
    }
}

impl FileConfig {
    /// Load the config file
    ///
    /// An explicit path must exist. Without one, the default file in the home
    /// directory is read if present.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match default_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        Self::from_file(&path)
    }

    /// Parse a YAML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }
}

/// `$HOME/.node-dns-syncer.yaml`
pub fn default_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join(DEFAULT_CONFIG_FILE))
}

/// `$HOME/.kube/config`
pub fn kubeconfig_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join(".kube").join("config"))
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|v| !v.is_empty()).map(str::to_string)
}

fn pick(arg: &Option<String>, file: &Option<String>) -> Option<String> {
    non_empty(arg).or_else(|| non_empty(file))
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Resolve the final run configuration
///
/// The result has passed [`SyncConfig::validate`].
pub fn resolve(args: &SyncArgs, file: &FileConfig) -> Result<SyncConfig> {
    let prefix = pick(&args.domain_name_prefix, &file.domain_name_prefix)
        .context("domain-name-prefix is required (flag, DOMAIN_NAME_PREFIX or config file)")?;

    let suffix = pick(&args.domain_name_suffix, &file.domain_name_suffix)
        .context("domain-name-suffix is required (flag, DOMAIN_NAME_SUFFIX or config file)")?;

    let zones = match non_empty(&args.cf_zones) {
        Some(raw) => split_list(&raw),
        None => file.cf_zones.as_ref().map(ZoneList::zones).unwrap_or_default(),
    };

    let address_type = match pick(&args.k8s_address_type, &file.k8s_address_type) {
        Some(raw) => raw.parse::<AddressType>()?,
        None => AddressType::default(),
    };

    let provider = ProviderConfig::Cloudflare {
        api_token: pick(&args.cf_api_token, &file.cf_api_token),
        api_key: pick(&args.cf_api_key, &file.cf_api_key),
        api_email: pick(&args.cf_api_email, &file.cf_api_email),
    };

    let mut config = SyncConfig::new(prefix, &suffix, provider)
        .with_dry_run(args.dry_run.or(file.dry_run).unwrap_or(false));
    config.zones = zones;
    config.nodes = NodeSelectorConfig {
        label_selector: pick(&args.k8s_label_selector, &file.k8s_label_selector),
        address_type,
        label_name: pick(&args.k8s_label_name, &file.k8s_label_name),
    };

    config.validate()?;
    Ok(config)
}
