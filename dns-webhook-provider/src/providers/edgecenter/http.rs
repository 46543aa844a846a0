//! EdgeCenter HTTP 请求方法

use reqwest::RequestBuilder;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ProviderError, Result};
use crate::http_client::{HttpReply, HttpUtils};
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::{ApiErrorBody, EdgecenterClient, PROVIDER_NAME};

impl EdgecenterClient {
    /// `/v2/zones/{zone}/{name}/{type}`
    pub(crate) fn rrset_path(zone: &str, name: &str, record_type: &str) -> String {
        format!(
            "/v2/zones/{}/{}/{}",
            urlencoding::encode(zone),
            urlencoding::encode(name),
            urlencoding::encode(record_type)
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(
            reqwest::header::AUTHORIZATION,
            format!("APIKey {}", self.api_token),
        )
    }

    /// 执行 GET 请求，404 返回 `None`
    pub(crate) async fn get_optional<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        context: ErrorContext,
    ) -> Result<Option<T>> {
        let url = format!("{}{path}", self.base_url);
        let request = self.authorized(self.client.get(&url).query(query));
        let reply =
            HttpUtils::send_with_retry(request, PROVIDER_NAME, &format!("GET {path}"), self.max_retries)
                .await?;

        if reply.status == 404 {
            return Ok(None);
        }
        let reply = self.check(reply, context)?;
        HttpUtils::parse_json(&reply.body, PROVIDER_NAME).map(Some)
    }

    /// 执行 GET 请求
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        context: ErrorContext,
    ) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        let request = self.authorized(self.client.get(&url).query(query));
        let reply =
            HttpUtils::send_with_retry(request, PROVIDER_NAME, &format!("GET {path}"), self.max_retries)
                .await?;
        let reply = self.check(reply, context)?;
        HttpUtils::parse_json(&reply.body, PROVIDER_NAME)
    }

    /// 执行 POST 请求
    ///
    /// 创建操作不是幂等的，只发送一次。
    pub(crate) async fn post<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        context: ErrorContext,
    ) -> Result<()> {
        let url = format!("{}{path}", self.base_url);
        let request = self
            .authorized(self.client.post(&url))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(self.encode(body)?);
        let reply = HttpUtils::send(request, PROVIDER_NAME, &format!("POST {path}")).await?;
        self.check(reply, context).map(|_| ())
    }

    /// 执行 PUT 请求
    pub(crate) async fn put<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        context: ErrorContext,
    ) -> Result<()> {
        let url = format!("{}{path}", self.base_url);
        let request = self
            .authorized(self.client.put(&url))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(self.encode(body)?);
        let reply =
            HttpUtils::send_with_retry(request, PROVIDER_NAME, &format!("PUT {path}"), self.max_retries)
                .await?;
        self.check(reply, context).map(|_| ())
    }

    /// 执行 DELETE 请求
    pub(crate) async fn delete(&self, path: &str, context: ErrorContext) -> Result<()> {
        let url = format!("{}{path}", self.base_url);
        let request = self.authorized(self.client.delete(&url));
        let reply = HttpUtils::send_with_retry(
            request,
            PROVIDER_NAME,
            &format!("DELETE {path}"),
            self.max_retries,
        )
        .await?;
        self.check(reply, context).map(|_| ())
    }

    fn encode<B: Serialize>(&self, body: &B) -> Result<String> {
        serde_json::to_string(body).map_err(|e| ProviderError::SerializationError {
            provider: PROVIDER_NAME.to_string(),
            detail: e.to_string(),
        })
    }

    /// 将非 2xx 响应映射为 [`ProviderError`]
    fn check(&self, reply: HttpReply, context: ErrorContext) -> Result<HttpReply> {
        if reply.is_success() {
            return Ok(reply);
        }
        let message = serde_json::from_str::<ApiErrorBody>(&reply.body)
            .ok()
            .and_then(|b| b.error)
            .unwrap_or_else(|| format!("HTTP {}", reply.status));
        log::error!("[{PROVIDER_NAME}] API error {}: {message}", reply.status);
        Err(self.map_error(RawApiError::new(reply.status, message), context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rrset_path_encodes_segments() {
        assert_eq!(
            EdgecenterClient::rrset_path("example.com", "www.example.com", "A"),
            "/v2/zones/example.com/www.example.com/A"
        );
        assert_eq!(
            EdgecenterClient::rrset_path("example.com", "*.example.com", "TXT"),
            "/v2/zones/example.com/%2A.example.com/TXT"
        );
    }
}
