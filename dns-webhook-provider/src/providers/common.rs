//! Provider 公共工具函数

use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::error::{ProviderError, Result};
use crate::types::DEFAULT_CONNECT_TIMEOUT_SECS;

// ============ HTTP Client ============

/// 创建带超时配置的 HTTP Client
pub fn create_http_client(provider: &str, request_timeout: Duration) -> Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .timeout(request_timeout)
        .build()
        .map_err(|e| ProviderError::NetworkError {
            provider: provider.to_string(),
            detail: format!("failed to build HTTP client: {e}"),
        })
}

/// 解析并校验 API 基础地址，去掉末尾的 `/`
pub fn parse_base_url(provider: &str, raw: &str) -> Result<String> {
    let url = Url::parse(raw).map_err(|e| ProviderError::InvalidParameter {
        provider: provider.to_string(),
        param: "api_url".to_string(),
        detail: format!("can't parse API URL '{raw}': {e}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ProviderError::InvalidParameter {
            provider: provider.to_string(),
            param: "api_url".to_string(),
            detail: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

// ============ 域名名称处理 ============

/// 去掉域名末尾的点
pub fn normalize_domain_name(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}
