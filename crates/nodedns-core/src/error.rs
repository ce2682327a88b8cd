//! Error types for the node DNS syncer
//!
//! Every failure in this system is fatal for the current run. The variants
//! exist so callers can report *what* failed, not to drive recovery.

use thiserror::Error;

/// Result type alias for syncer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the node DNS syncer
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A node address that is not a valid IPv4 address
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// DNS provider call failed
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Zone or record not found at the provider
    #[error("Not found: {0}")]
    NotFound(String),

    /// Provider rejected the credentials
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Provider rate limit hit
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Cluster API call (node list/get/update) failed
    #[error("Cluster error: {0}")]
    Cluster(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid address error
    pub fn invalid_address(msg: impl Into<String>) -> Self {
        Self::InvalidAddress(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a cluster API error
    pub fn cluster(msg: impl Into<String>) -> Self {
        Self::Cluster(msg.into())
    }

    /// True for failures reported by the DNS provider
    pub fn is_provider(&self) -> bool {
        matches!(
            self,
            Self::Provider { .. } | Self::NotFound(_) | Self::Authentication(_) | Self::RateLimited(_)
        )
    }

    /// True for failures reported by the cluster API
    pub fn is_cluster(&self) -> bool {
        matches!(self, Self::Cluster(_))
    }
}
