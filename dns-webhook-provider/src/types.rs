use std::time::Duration;

use serde::{Deserialize, Serialize};

// ============ Zones ============

/// A zone as reported by the provider, together with its records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderZone {
    /// Zone name, e.g. `example.com`.
    pub name: String,
    /// Every RRSet in the zone.
    #[serde(default)]
    pub records: Vec<ProviderRecord>,
}

impl ProviderZone {
    /// Create an empty zone (no records).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Vec::new(),
        }
    }

    /// Builder-style helper used by tests and adapters.
    #[must_use]
    pub fn with_record(mut self, record: ProviderRecord) -> Self {
        self.records.push(record);
        self
    }
}

/// One RRSet inside a [`ProviderZone`].
///
/// `short_answers` holds the record contents in their presentation format
/// (`"10 mail.example.com"` for MX, `"1.2.3.4"` for A).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRecord {
    /// Fully-qualified record name.
    pub name: String,
    /// Record type as the API spells it (`A`, `CNAME`, ...).
    #[serde(rename = "type")]
    pub record_type: String,
    /// TTL in seconds.
    #[serde(default)]
    pub ttl: u32,
    /// Record contents.
    #[serde(default)]
    pub short_answers: Vec<String>,
}

impl ProviderRecord {
    pub fn new(
        name: impl Into<String>,
        record_type: impl Into<String>,
        ttl: u32,
        short_answers: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            record_type: record_type.into(),
            ttl,
            short_answers,
        }
    }
}

/// Server-side filter for zone listing.
///
/// An empty `names` list lists every zone the token can see.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZonesFilter {
    /// Exact zone names to restrict the listing to.
    #[serde(default)]
    pub names: Vec<String>,
}

impl ZonesFilter {
    /// Filter that matches every zone.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

// ============ Client Config ============

/// Default connect timeout (seconds).
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Default request timeout (seconds).
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
/// Default transport retries.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Settings used by [`create_client`](crate::create_client).
///
/// The token is required; every other field has a default.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// API base URL. `None` uses the provider default.
    #[serde(default)]
    pub api_url: Option<String>,
    /// Permanent API token.
    pub api_token: String,
    /// Transport-level retries for transient failures (0 disables).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl ClientConfig {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_url: None,
            api_token: api_token.into(),
            max_retries: DEFAULT_MAX_RETRIES,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// The token must never end up in logs.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url)
            .field("api_token", &"<redacted>")
            .field("max_retries", &self.max_retries)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}
