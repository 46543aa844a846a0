//! 共享测试工具和辅助函数

#![allow(dead_code)]

use std::sync::Arc;

use dns_webhook_provider::{ClientConfig, DnsClient, create_client};
use wiremock::MockServer;

/// 测试使用的 API token
pub const TEST_TOKEN: &str = "test-token";

/// 断言 `Result` 为 `Ok`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(val) = res else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(
            res.is_ok(),
            "{}: {res:?}",
            format_args!($($msg)+)
        );
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

/// 测试上下文：mock API 服务器 + 指向它的客户端
pub struct TestContext {
    pub server: MockServer,
    pub client: Arc<dyn DnsClient>,
}

impl TestContext {
    /// 不重试的客户端
    pub async fn new() -> Self {
        Self::with_retries(0).await
    }

    pub async fn with_retries(max_retries: u32) -> Self {
        let server = MockServer::start().await;
        let config = ClientConfig::new(TEST_TOKEN)
            .with_api_url(server.uri())
            .with_max_retries(max_retries);
        let client = create_client(config).expect("client for mock server");
        Self { server, client }
    }

    /// mock 服务器收到的指定方法的请求
    pub async fn requests(&self, method: &str) -> Vec<wiremock::Request> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.method.as_str() == method)
            .collect()
    }
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}
