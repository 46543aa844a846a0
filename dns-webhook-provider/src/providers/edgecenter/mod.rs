//! EdgeCenter DNS client

mod client;
mod error;
mod http;
mod types;

use reqwest::Client;

use crate::error::Result;
use crate::providers::common::{create_http_client, parse_base_url};
use crate::types::ClientConfig;

pub(crate) use types::{ApiErrorBody, ResourceRecord, RrSet, ZonesResponse};

pub(crate) const EC_API_BASE: &str = "https://api.edgecenter.ru/dns";
pub(crate) const PROVIDER_NAME: &str = "edgecenter";

/// EdgeCenter DNS API client
pub struct EdgecenterClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) api_token: String,
    pub(crate) max_retries: u32,
}

impl EdgecenterClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = match config.api_url.as_deref() {
            Some(raw) if !raw.trim().is_empty() => parse_base_url(PROVIDER_NAME, raw)?,
            _ => EC_API_BASE.to_string(),
        };
        Ok(Self {
            client: create_http_client(PROVIDER_NAME, config.request_timeout())?,
            base_url,
            api_token: config.api_token.clone(),
            max_retries: config.max_retries,
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
