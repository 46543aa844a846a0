//! Client factory.

use std::sync::Arc;

use crate::error::{ProviderError, Result};
use crate::traits::DnsClient;
use crate::types::ClientConfig;

#[cfg(feature = "edgecenter")]
use crate::providers::EdgecenterClient;

/// Creates a [`DnsClient`] from the given configuration.
///
/// The returned client is wrapped in `Arc<dyn DnsClient>` for sharing across
/// async tasks.
///
/// # Errors
///
/// * [`ProviderError::InvalidCredentials`] when the API token is empty
/// * [`ProviderError::InvalidParameter`] when the API URL cannot be parsed
///
/// # Examples
///
/// ```rust,no_run
/// use dns_webhook_provider::{create_client, ClientConfig};
///
/// let client = create_client(ClientConfig::new("your-token")).unwrap();
/// ```
#[cfg(feature = "edgecenter")]
pub fn create_client(config: ClientConfig) -> Result<Arc<dyn DnsClient>> {
    if config.api_token.trim().is_empty() {
        return Err(ProviderError::InvalidCredentials {
            provider: "edgecenter".to_string(),
            raw_message: Some("empty API token, check env var EC_API_TOKEN".to_string()),
        });
    }
    let client = EdgecenterClient::new(&config)?;
    log::debug!("Created edgecenter client for {}", client.base_url());
    Ok(Arc::new(client))
}
