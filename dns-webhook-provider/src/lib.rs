//! # dns-webhook-provider
//!
//! DNS provider client used by the reconciliation webhook. The engine talks to
//! the provider only through the [`DnsClient`] trait: list zones with their
//! records, add values to an RRSet, remove values from an RRSet.
//!
//! ## Supported Providers
//!
//! | Provider | Feature Flag | Auth Method |
//! |----------|-------------|-------------|
//! | [EdgeCenter DNS](https://edgecenter.ru/dns) | `edgecenter` | `APIKey` token |
//!
//! ## Feature Flags
//!
//! - **`edgecenter`** *(default)*: the EdgeCenter client and [`create_client`].
//! - **`native-tls`** *(default)*: use the platform's native TLS implementation.
//! - **`rustls`**: use rustls. Recommended for static musl builds.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dns_webhook_provider::{create_client, ClientConfig, DnsClient, ZonesFilter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = create_client(ClientConfig::new("your-token"))?;
//!
//!     for zone in client.zones_with_records(&ZonesFilter::all()).await? {
//!         println!("{} ({} rrsets)", zone.name, zone.records.len());
//!     }
//!
//!     client
//!         .add_rrset("example.com", "www.example.com", "A", &["1.2.3.4".into()], 300)
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, ProviderError>`](ProviderError):
//!
//! - [`ProviderError::InvalidCredentials`]: authentication failed
//! - [`ProviderError::ZoneNotFound`]: the zone does not exist
//! - [`ProviderError::RateLimited`]: API rate limit exceeded (retryable)
//! - [`ProviderError::NetworkError`]: network connectivity issue (retryable)
//!
//! Transient errors (`NetworkError`, `Timeout`, `RateLimited`) are retried
//! with exponential backoff up to [`ClientConfig::max_retries`] times.

mod error;
mod factory;
mod http_client;
mod providers;
mod traits;
mod types;
mod utils;

// Re-export error types
pub use error::{ProviderError, Result};

// Re-export factory functions
#[cfg(feature = "edgecenter")]
pub use factory::create_client;

// Re-export the client trait only (internal traits are not exported)
pub use traits::DnsClient;

// Re-export types
pub use types::{
    ClientConfig, DEFAULT_MAX_RETRIES, DEFAULT_REQUEST_TIMEOUT_SECS, ProviderRecord, ProviderZone,
    ZonesFilter,
};

pub use utils::log_sanitizer::mask_secret;

// Re-export concrete clients (behind feature flags)
#[cfg(feature = "edgecenter")]
pub use providers::EdgecenterClient;
