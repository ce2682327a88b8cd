//! Configuration types for the node DNS syncer
//!
//! These are the *resolved* settings of a run. Where each value came from
//! (flag, environment, config file, default) is the binary's concern.

use crate::traits::AddressType;
use std::fmt;

/// Main syncer configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Prefix of every managed record name (e.g. "node-")
    pub domain_name_prefix: String,

    /// Suffixes appended after the subdomain label; one record per suffix
    ///
    /// An empty string is a valid entry meaning "no suffix".
    pub domain_name_suffixes: Vec<String>,

    /// Compute and log the plan without mutating DNS or node labels
    pub dry_run: bool,

    /// DNS zones to reconcile, in order
    pub zones: Vec<String>,

    /// Which nodes and addresses to publish
    pub nodes: NodeSelectorConfig,

    /// DNS provider configuration
    pub provider: ProviderConfig,
}

impl SyncConfig {
    /// Create a configuration with the required naming settings
    ///
    /// `suffixes` is the raw comma-separated list, see [`parse_suffixes`].
    pub fn new(prefix: impl Into<String>, suffixes: &str, provider: ProviderConfig) -> Self {
        Self {
            domain_name_prefix: prefix.into(),
            domain_name_suffixes: parse_suffixes(suffixes),
            dry_run: false,
            zones: Vec::new(),
            nodes: NodeSelectorConfig::default(),
            provider,
        }
    }

    /// Add a zone to reconcile
    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.zones.push(zone.into());
        self
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set the node label that receives each node's subdomain
    pub fn with_label_name(mut self, label_name: impl Into<String>) -> Self {
        self.nodes.label_name = Some(label_name.into());
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.domain_name_prefix.is_empty() {
            return Err(crate::Error::config("domain-name-prefix is required"));
        }

        if self.domain_name_suffixes.is_empty() {
            return Err(crate::Error::config("domain-name-suffix is required"));
        }

        if self.zones.is_empty() {
            return Err(crate::Error::config("At least one DNS zone must be configured"));
        }

        self.nodes.validate()?;
        self.provider.validate()?;

        Ok(())
    }
}

/// Split a comma-separated suffix list, trimming each entry
///
/// Empty entries are kept: `""` yields one empty suffix, matching a record
/// named `<subdomain><zone>`.
pub fn parse_suffixes(raw: &str) -> Vec<String> {
    raw.split(',').map(|s| s.trim().to_string()).collect()
}

/// Node selection and label write-back
#[derive(Debug, Clone, Default)]
pub struct NodeSelectorConfig {
    /// Label selector applied when listing nodes
    pub label_selector: Option<String>,

    /// Address type to publish
    pub address_type: AddressType,

    /// Label to write each node's subdomain into; `None` disables label sync
    pub label_name: Option<String>,
}

impl NodeSelectorConfig {
    /// Validate the node selection settings
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self
            .label_name
            .as_deref()
            .is_some_and(|l| l.chars().any(char::is_whitespace))
        {
            return Err(crate::Error::config("k8s-label-name cannot contain whitespace"));
        }
        Ok(())
    }
}

/// DNS provider configuration
#[derive(Clone)]
pub enum ProviderConfig {
    /// Cloudflare provider
    ///
    /// Authenticates with an API token, or with the global API key + email pair.
    Cloudflare {
        /// Scoped API token
        api_token: Option<String>,
        /// Global API key
        api_key: Option<String>,
        /// Account email for the global API key
        api_email: Option<String>,
    },
}

impl ProviderConfig {
    /// Cloudflare configuration using an API token
    pub fn cloudflare_token(token: impl Into<String>) -> Self {
        ProviderConfig::Cloudflare {
            api_token: Some(token.into()),
            api_key: None,
            api_email: None,
        }
    }

    /// Cloudflare configuration using the global API key
    pub fn cloudflare_key(key: impl Into<String>, email: impl Into<String>) -> Self {
        ProviderConfig::Cloudflare {
            api_token: None,
            api_key: Some(key.into()),
            api_email: Some(email.into()),
        }
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Cloudflare {
                api_token,
                api_key,
                api_email,
            } => {
                let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
                if present(api_token) {
                    return Ok(());
                }
                match (present(api_key), present(api_email)) {
                    (true, true) => Ok(()),
                    (true, false) => Err(crate::Error::config(
                        "cf-api-email is required when using cf-api-key",
                    )),
                    (false, true) => Err(crate::Error::config(
                        "cf-api-key is required when using cf-api-email",
                    )),
                    (false, false) => Err(crate::Error::config(
                        "Cloudflare credentials are required: set cf-api-token, or cf-api-key and cf-api-email",
                    )),
                }
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Cloudflare { .. } => "cloudflare",
        }
    }
}

// Credentials never show up in Debug output
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderConfig::Cloudflare {
                api_token,
                api_key,
                api_email,
            } => f
                .debug_struct("Cloudflare")
                .field("api_token", &api_token.as_ref().map(|_| "<REDACTED>"))
                .field("api_key", &api_key.as_ref().map(|_| "<REDACTED>"))
                .field("api_email", api_email)
                .finish(),
        }
    }
}
