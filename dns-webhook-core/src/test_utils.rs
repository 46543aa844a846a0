//! 测试辅助模块
//!
//! 提供 mock 实现和便捷的测试工厂方法。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dns_webhook_provider::{
    DnsClient, ProviderError, ProviderRecord, ProviderZone, Result as ProviderResult, ZonesFilter,
};
use tokio::sync::RwLock;

// ===== MockDnsClient =====

/// [`MockDnsClient`] 收到的一次调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ZonesWithRecords(Vec<String>),
    Add {
        zone: String,
        name: String,
        record_type: String,
        values: Vec<String>,
        ttl: u32,
    },
    Delete {
        zone: String,
        name: String,
        record_type: String,
        contents: Vec<String>,
    },
}

impl Call {
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Self::ZonesWithRecords(_))
    }
}

pub struct MockDnsClient {
    zones: RwLock<Vec<ProviderZone>>,
    calls: RwLock<Vec<Call>>,
    /// 如果 Some，zones_with_records 返回此错误
    list_error: RwLock<Option<ProviderError>>,
    /// `(name, error)`：对该记录名的 add 调用失败
    add_errors: RwLock<Vec<(String, ProviderError)>>,
    /// `(name, error)`：对该记录名的 delete 调用失败
    delete_errors: RwLock<Vec<(String, ProviderError)>>,
    /// 每次变更调用前的延迟（用于取消测试）
    delay: RwLock<Option<Duration>>,
    /// zones_with_records 返回前的延迟
    list_delay: RwLock<Option<Duration>>,
}

impl MockDnsClient {
    pub fn new() -> Self {
        Self {
            zones: RwLock::new(Vec::new()),
            calls: RwLock::new(Vec::new()),
            list_error: RwLock::new(None),
            add_errors: RwLock::new(Vec::new()),
            delete_errors: RwLock::new(Vec::new()),
            delay: RwLock::new(None),
            list_delay: RwLock::new(None),
        }
    }

    /// 创建包含给定（空）zone 的客户端
    pub fn with_zones(names: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            zones: RwLock::new(names.iter().map(|n| ProviderZone::new(*n)).collect()),
            ..Self::new()
        })
    }

    pub async fn set_zones(&self, zones: Vec<ProviderZone>) {
        *self.zones.write().await = zones;
    }

    pub async fn set_list_error(&self, err: Option<ProviderError>) {
        *self.list_error.write().await = err;
    }

    pub async fn fail_add(&self, name: &str, err: ProviderError) {
        self.add_errors.write().await.push((name.to_string(), err));
    }

    pub async fn fail_delete(&self, name: &str, err: ProviderError) {
        self.delete_errors.write().await.push((name.to_string(), err));
    }

    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    pub async fn set_list_delay(&self, delay: Duration) {
        *self.list_delay.write().await = Some(delay);
    }

    pub async fn calls(&self) -> Vec<Call> {
        self.calls.read().await.clone()
    }

    pub async fn mutating_calls(&self) -> Vec<Call> {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| c.is_mutating())
            .cloned()
            .collect()
    }

    async fn pause(&self) {
        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl DnsClient for MockDnsClient {
    fn id(&self) -> &'static str {
        "mock"
    }

    async fn add_rrset(
        &self,
        zone: &str,
        name: &str,
        record_type: &str,
        values: &[String],
        ttl: u32,
    ) -> ProviderResult<()> {
        self.pause().await;
        self.calls.write().await.push(Call::Add {
            zone: zone.to_string(),
            name: name.to_string(),
            record_type: record_type.to_string(),
            values: values.to_vec(),
            ttl,
        });
        match self.add_errors.read().await.iter().find(|(n, _)| n == name) {
            Some((_, err)) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn zones_with_records(&self, filter: &ZonesFilter) -> ProviderResult<Vec<ProviderZone>> {
        self.calls
            .write()
            .await
            .push(Call::ZonesWithRecords(filter.names.clone()));
        let list_delay = *self.list_delay.read().await;
        if let Some(delay) = list_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(ref err) = *self.list_error.read().await {
            return Err(err.clone());
        }
        let zones = self.zones.read().await;
        Ok(zones
            .iter()
            .filter(|z| filter.names.is_empty() || filter.names.contains(&z.name))
            .cloned()
            .collect())
    }

    async fn delete_rrset_records(
        &self,
        zone: &str,
        name: &str,
        record_type: &str,
        contents: &[String],
    ) -> ProviderResult<()> {
        self.pause().await;
        self.calls.write().await.push(Call::Delete {
            zone: zone.to_string(),
            name: name.to_string(),
            record_type: record_type.to_string(),
            contents: contents.to_vec(),
        });
        match self.delete_errors.read().await.iter().find(|(n, _)| n == name) {
            Some((_, err)) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

// ===== 测试数据工厂 =====

pub fn network_error(detail: &str) -> ProviderError {
    ProviderError::NetworkError {
        provider: "mock".to_string(),
        detail: detail.to_string(),
    }
}

pub fn zone_with(name: &str, records: &[(&str, &str, u32, &[&str])]) -> ProviderZone {
    records
        .iter()
        .fold(ProviderZone::new(name), |zone, (n, t, ttl, answers)| {
            zone.with_record(ProviderRecord::new(
                *n,
                *t,
                *ttl,
                answers.iter().map(|a| (*a).to_string()).collect(),
            ))
        })
}
