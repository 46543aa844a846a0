use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::types::{ProviderZone, ZonesFilter};

/// 原始 API 错误（内部使用）
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// HTTP 状态码
    pub status: u16,
    /// 原始错误消息
    pub message: String,
}

impl RawApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// 错误上下文信息（内部使用）
/// 用于在映射错误时提供额外信息
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    /// Zone 名称（用于 `ZoneNotFound`）
    pub zone: Option<String>,
    /// `name/type`（用于 `RecordNotFound`）
    pub record: Option<String>,
}

impl ErrorContext {
    pub fn zone(zone: &str) -> Self {
        Self {
            zone: Some(zone.to_string()),
            record: None,
        }
    }

    pub fn rrset(zone: &str, name: &str, record_type: &str) -> Self {
        Self {
            zone: Some(zone.to_string()),
            record: Some(format!("{name}/{record_type}")),
        }
    }
}

/// Provider 错误映射 Trait（内部使用）
pub(crate) trait ProviderErrorMapper {
    /// 返回 Provider 标识符
    fn provider_name(&self) -> &'static str;

    /// 将原始 API 错误映射到统一错误类型
    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError;

    /// 快捷方法：解析错误
    fn parse_error(&self, detail: impl ToString) -> ProviderError {
        ProviderError::ParseError {
            provider: self.provider_name().to_string(),
            detail: detail.to_string(),
        }
    }

    /// 快捷方法：未知错误（fallback）
    fn unknown_error(&self, raw: RawApiError) -> ProviderError {
        ProviderError::Unknown {
            provider: self.provider_name().to_string(),
            raw_code: Some(raw.status.to_string()),
            raw_message: raw.message,
        }
    }
}

/// DNS 客户端 Trait
///
/// 引擎只通过这三个方法访问 provider。实现必须支持并发调用：
/// 每个记录操作都会并行发出一次调用。
///
/// 取消是协作式的：调用方直接丢弃返回的 future。
#[async_trait]
pub trait DnsClient: Send + Sync {
    /// 客户端标识符
    fn id(&self) -> &'static str;

    /// 向 `zone` 中的 RRSet `name/record_type` 添加 `values`，
    /// RRSet 不存在时创建；已有的值保留。
    async fn add_rrset(
        &self,
        zone: &str,
        name: &str,
        record_type: &str,
        values: &[String],
        ttl: u32,
    ) -> Result<()>;

    /// 获取 zone 列表及其全部记录
    async fn zones_with_records(&self, filter: &ZonesFilter) -> Result<Vec<ProviderZone>>;

    /// 从 `zone` 中的 RRSet `name/record_type` 删除 `contents`，
    /// 没有剩余值时删除整个 RRSet。
    async fn delete_rrset_records(
        &self,
        zone: &str,
        name: &str,
        record_type: &str,
        contents: &[String],
    ) -> Result<()>;
}
