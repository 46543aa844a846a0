use std::sync::Mutex;

use async_trait::async_trait;
use dns_webhook_provider::{
    DnsClient, ProviderError, ProviderRecord, ProviderZone, Result as ProviderResult, ZonesFilter,
};

/// In-memory client for route tests. Records every call as a short string.
#[derive(Default)]
pub struct StubDnsClient {
    zones: Vec<ProviderZone>,
    list_error: Option<ProviderError>,
    add_error: Option<ProviderError>,
    calls: Mutex<Vec<String>>,
}

impl StubDnsClient {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_zone(mut self, name: &str, records: &[(&str, &str, u32, &[&str])]) -> Self {
        let mut zone = ProviderZone::new(name);
        for (record_name, record_type, ttl, answers) in records {
            zone = zone.with_record(ProviderRecord::new(
                *record_name,
                *record_type,
                *ttl,
                answers.iter().map(ToString::to_string).collect(),
            ));
        }
        self.zones.push(zone);
        self
    }

    #[must_use]
    pub fn failing_list(mut self) -> Self {
        self.list_error = Some(network_error());
        self
    }

    #[must_use]
    pub fn failing_add(mut self) -> Self {
        self.add_error = Some(network_error());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

pub fn network_error() -> ProviderError {
    ProviderError::NetworkError {
        provider: "stub".to_string(),
        detail: "connection refused".to_string(),
    }
}

#[async_trait]
impl DnsClient for StubDnsClient {
    fn id(&self) -> &'static str {
        "stub"
    }

    async fn add_rrset(
        &self,
        zone: &str,
        name: &str,
        record_type: &str,
        values: &[String],
        ttl: u32,
    ) -> ProviderResult<()> {
        self.record(format!(
            "add {zone} {name} {record_type} {} {ttl}",
            values.join(",")
        ));
        self.add_error.clone().map_or(Ok(()), Err)
    }

    async fn zones_with_records(&self, filter: &ZonesFilter) -> ProviderResult<Vec<ProviderZone>> {
        self.record(format!("zones [{}]", filter.names.join(",")));
        if let Some(e) = &self.list_error {
            return Err(e.clone());
        }
        Ok(self
            .zones
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
        self.record(format!(
            "delete {zone} {name} {record_type} {}",
            contents.join(",")
        ));
        Ok(())
    }
}
