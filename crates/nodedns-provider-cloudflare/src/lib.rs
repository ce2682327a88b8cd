// # Cloudflare DNS Provider
//
// Cloudflare API v4 implementation of `DnsProvider` for the node DNS syncer.
//
// ## Behaviour
//
// - One HTTP request per trait call, except `list_records`, which follows
//   pagination until every page of A records has been read
// - HTTP timeout of 30 seconds
// - HTTP status codes map onto core error kinds (401/403, 404, 429, other)
// - A `success: false` envelope is an error even with a 2xx status
// - No retry, backoff or caching: the first failure ends the run
//
// ## Security Requirements
//
// - Credentials NEVER appear in logs or Debug output
// - Empty credentials are rejected at construction
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones?name=...`
// - List DNS Records: GET `/zones/:zone_id/dns_records?type=A&page=..&per_page=..`
// - Create DNS Record: POST `/zones/:zone_id/dns_records`
// - Delete DNS Record: DELETE `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use nodedns_core::config::ProviderConfig;
use nodedns_core::traits::{DnsProvider, DnsRecord, NewRecord};
use nodedns_core::{Error, Result};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Records requested per page when listing a zone
const RECORDS_PER_PAGE: u32 = 100;

const PROVIDER: &str = "cloudflare";

/// How requests authenticate against the API
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Scoped API token, sent as `Authorization: Bearer`
    Token(String),
    /// Global API key, sent as `X-Auth-Key` together with `X-Auth-Email`
    GlobalKey { key: String, email: String },
}

impl Credentials {
    fn validate(&self) -> Result<()> {
        match self {
            Credentials::Token(token) if token.is_empty() => {
                Err(Error::config("Cloudflare API token cannot be empty"))
            }
            Credentials::GlobalKey { key, .. } if key.is_empty() => {
                Err(Error::config("Cloudflare API key cannot be empty"))
            }
            Credentials::GlobalKey { email, .. } if email.is_empty() => {
                Err(Error::config("Cloudflare API email cannot be empty"))
            }
            _ => Ok(()),
        }
    }

    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Credentials::Token(token) => request.bearer_auth(token),
            Credentials::GlobalKey { key, email } => request
                .header("X-Auth-Key", key)
                .header("X-Auth-Email", email),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Token(_) => f.debug_tuple("Token").field(&"<REDACTED>").finish(),
            Credentials::GlobalKey { email, .. } => f
                .debug_struct("GlobalKey")
                .field("key", &"<REDACTED>")
                .field("email", email)
                .finish(),
        }
    }
}

/// Cloudflare DNS provider
///
/// Stateless: every call goes to the API. Zone IDs are not cached between
/// calls.
pub struct CloudflareProvider {
    /// ⚠️ NEVER log this value
    credentials: Credentials,

    /// API root, overridable for tests
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("credentials", &self.credentials)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider
    ///
    /// # Errors
    ///
    /// - `Error::Config` if a credential is empty
    /// - `Error::Provider` if the HTTP client cannot be built
    pub fn new(credentials: Credentials) -> Result<Self> {
        credentials.validate()?;

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::provider(PROVIDER, format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            credentials,
            base_url: CLOUDFLARE_API_BASE.to_string(),
            client,
        })
    }

    /// Create a provider from resolved configuration
    ///
    /// An API token wins over the key/email pair when both are set.
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        config.validate()?;

        let ProviderConfig::Cloudflare {
            api_token,
            api_key,
            api_email,
        } = config;

        let credentials = match (api_token.as_deref(), api_key, api_email) {
            (Some(token), _, _) if !token.is_empty() => Credentials::Token(token.to_string()),
            (_, Some(key), Some(email)) => Credentials::GlobalKey {
                key: key.clone(),
                email: email.clone(),
            },
            _ => return Err(Error::config("Cloudflare credentials are required")),
        };

        Self::new(credentials)
    }

    /// Point the provider at another API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.credentials.apply(self.client.request(method, url))
    }

    /// Send a request and unwrap the API envelope
    ///
    /// `what` names the resource for NotFound messages.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<Envelope<T>> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::provider(PROVIDER, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(status_error(status, what, &error_text));
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| Error::provider(PROVIDER, format!("Failed to parse response: {}", e)))?;

        if !envelope.success {
            return Err(Error::provider(
                PROVIDER,
                format!("API call for {} was not successful: {}", what, envelope.error_summary()),
            ));
        }

        Ok(envelope)
    }
}

/// Map a non-2xx status onto a core error
fn status_error(status: StatusCode, what: &str, body: &str) -> Error {
    match status.as_u16() {
        401 | 403 => Error::auth(format!(
            "Invalid credentials or insufficient permissions for {}. Status: {}",
            what, status
        )),
        404 => Error::not_found(format!("{} not found", what)),
        429 => Error::rate_limited(format!("Rate limit exceeded. Status: {}", status)),
        500..=599 => Error::provider(
            PROVIDER,
            format!("Cloudflare server error: {} - {}", status, body),
        ),
        _ => Error::provider(PROVIDER, format!("Request for {} failed: {} - {}", what, status, body)),
    }
}

/// Standard Cloudflare response wrapper
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
    #[serde(default)]
    result_info: Option<ResultInfo>,
}

impl<T> Envelope<T> {
    fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return "no error details".to_string();
        }
        self.errors
            .iter()
            .map(|e| format!("{} ({})", e.message, e.code))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn into_result(self, what: &str) -> Result<T> {
        self.result.ok_or_else(|| {
            Error::provider(PROVIDER, format!("Invalid response format: {} has no result", what))
        })
    }
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    #[serde(default)]
    total_pages: u32,
}

#[derive(Debug, Deserialize)]
struct ZoneResult {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RecordResult {
    id: String,
    name: String,
    content: String,
}

impl From<RecordResult> for DnsRecord {
    fn from(r: RecordResult) -> Self {
        DnsRecord::new(r.id, r.name, r.content)
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// ```http
    /// GET /zones?name=example.com
    /// ```
    async fn zone_id(&self, zone_name: &str) -> Result<String> {
        tracing::debug!("Looking up zone ID for {}", zone_name);

        let what = format!("Zone {}", zone_name);
        let request = self
            .request(Method::GET, "/zones")
            .query(&[("name", zone_name)]);
        let zones: Vec<ZoneResult> = self.send(request, &what).await?.into_result(&what)?;

        let zone = zones
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found(format!("Zone not found: {}", zone_name)))?;

        tracing::debug!("Found zone ID: {}", zone.id);
        Ok(zone.id)
    }

    /// ```http
    /// GET /zones/:zone_id/dns_records?type=A&page=1&per_page=100
    /// ```
    async fn list_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>> {
        let what = format!("DNS records of zone {}", zone_id);
        let path = format!("/zones/{}/dns_records", zone_id);
        let per_page = RECORDS_PER_PAGE.to_string();

        let mut records = Vec::new();
        let mut page: u32 = 1;
        loop {
            let page_param = page.to_string();
            let request = self.request(Method::GET, &path).query(&[
                ("type", "A"),
                ("page", page_param.as_str()),
                ("per_page", per_page.as_str()),
            ]);

            let envelope = self.send::<Vec<RecordResult>>(request, &what).await?;
            let total_pages = envelope.result_info.as_ref().map_or(1, |i| i.total_pages);
            let batch = envelope.into_result(&what)?;

            tracing::debug!("Zone {}: page {} of {} ({} records)", zone_id, page, total_pages, batch.len());
            records.extend(batch.into_iter().map(DnsRecord::from));

            if page >= total_pages {
                break;
            }
            page += 1;
        }

        Ok(records)
    }

    /// ```http
    /// POST /zones/:zone_id/dns_records
    /// { "type": "A", "name": "...", "content": "...", "proxied": false }
    /// ```
    async fn create_record(&self, zone_id: &str, record: &NewRecord) -> Result<DnsRecord> {
        let what = format!("DNS record {}", record.name);
        let payload = serde_json::json!({
            "type": record.record_type(),
            "name": record.name,
            "content": record.address.to_string(),
            "proxied": record.proxied,
        });

        let request = self
            .request(Method::POST, &format!("/zones/{}/dns_records", zone_id))
            .json(&payload);
        let created: RecordResult = self.send(request, &what).await?.into_result(&what)?;

        tracing::debug!("Created record {} with ID {}", created.name, created.id);
        Ok(created.into())
    }

    /// ```http
    /// DELETE /zones/:zone_id/dns_records/:record_id
    /// ```
    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<()> {
        let what = format!("DNS record {}", record_id);
        let request = self.request(
            Method::DELETE,
            &format!("/zones/{}/dns_records/{}", zone_id, record_id),
        );
        self.send::<serde_json::Value>(request, &what).await?;

        tracing::debug!("Deleted record {}", record_id);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}
