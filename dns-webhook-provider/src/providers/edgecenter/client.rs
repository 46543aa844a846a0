//! EdgeCenter `DnsClient` implementation

use async_trait::async_trait;
use futures::future::try_join_all;

use crate::error::{ProviderError, Result};
use crate::providers::common::normalize_domain_name;
use crate::traits::{DnsClient, ErrorContext};
use crate::types::{ProviderZone, ZonesFilter};

use super::{EdgecenterClient, PROVIDER_NAME, ResourceRecord, RrSet, ZonesResponse};
use super::types::EdgecenterZone;

#[async_trait]
impl DnsClient for EdgecenterClient {
    fn id(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn add_rrset(
        &self,
        zone: &str,
        name: &str,
        record_type: &str,
        values: &[String],
        ttl: u32,
    ) -> Result<()> {
        let zone = normalize_domain_name(zone);
        let name = normalize_domain_name(name);
        let path = Self::rrset_path(zone, name, record_type);
        let ctx = || ErrorContext::rrset(zone, name, record_type);

        match self.get_optional::<RrSet>(&path, &[], ctx()).await? {
            Some(mut existing) => {
                let mut added = 0;
                for value in values {
                    let present = existing
                        .resource_records
                        .iter()
                        .any(|r| same_value(record_type, &r.presentation(), value));
                    if !present {
                        existing
                            .resource_records
                            .push(ResourceRecord::from_presentation(record_type, value));
                        added += 1;
                    }
                }

                if added == 0 && existing.ttl == ttl {
                    log::debug!("[{PROVIDER_NAME}] {name}/{record_type} already up to date");
                    return Ok(());
                }

                existing.ttl = ttl;
                log::info!("[{PROVIDER_NAME}] Updating RRSet {name}/{record_type} in {zone} (+{added})");
                self.put(&path, &existing, ctx()).await
            }
            None => {
                let rrset = RrSet::new(ttl, dedup_values(record_type, values));
                log::info!(
                    "[{PROVIDER_NAME}] Creating RRSet {name}/{record_type} in {zone} ({} values)",
                    rrset.resource_records.len()
                );
                self.post(&path, &rrset, ctx()).await
            }
        }
    }

    async fn zones_with_records(&self, filter: &ZonesFilter) -> Result<Vec<ProviderZone>> {
        let query: Vec<(&str, &str)> = filter
            .names
            .iter()
            .map(|n| ("name", normalize_domain_name(n)))
            .collect();

        let listing: ZonesResponse = self
            .get("/v2/zones", &query, ErrorContext::default())
            .await?;
        log::debug!("[{PROVIDER_NAME}] Listed {} zones", listing.zones.len());

        let fetches = listing.zones.into_iter().map(|summary| async move {
            let path = format!("/v2/zones/{}", urlencoding::encode(&summary.name));
            let zone: EdgecenterZone = self
                .get(&path, &[], ErrorContext::zone(&summary.name))
                .await?;
            Ok::<_, ProviderError>(ProviderZone::from(zone))
        });

        try_join_all(fetches).await
    }

    async fn delete_rrset_records(
        &self,
        zone: &str,
        name: &str,
        record_type: &str,
        contents: &[String],
    ) -> Result<()> {
        let zone = normalize_domain_name(zone);
        let name = normalize_domain_name(name);
        let path = Self::rrset_path(zone, name, record_type);
        let ctx = || ErrorContext::rrset(zone, name, record_type);

        let Some(mut existing) = self.get_optional::<RrSet>(&path, &[], ctx()).await? else {
            log::debug!("[{PROVIDER_NAME}] {name}/{record_type} does not exist, nothing to delete");
            return Ok(());
        };

        let before = existing.resource_records.len();
        existing.resource_records.retain(|r| {
            let value = r.presentation();
            !contents.iter().any(|c| same_value(record_type, &value, c))
        });
        let removed = before - existing.resource_records.len();

        if removed == 0 {
            log::debug!("[{PROVIDER_NAME}] {name}/{record_type} has none of the values to delete");
            return Ok(());
        }

        if existing.resource_records.is_empty() {
            log::info!("[{PROVIDER_NAME}] Deleting RRSet {name}/{record_type} in {zone}");
            match self.delete(&path, ctx()).await {
                Err(ProviderError::RecordNotFound { .. }) => Ok(()),
                other => other,
            }
        } else {
            log::info!("[{PROVIDER_NAME}] Updating RRSet {name}/{record_type} in {zone} (-{removed})");
            self.put(&path, &existing, ctx()).await
        }
    }
}

/// Host-name valued types compare without the trailing dot and ignoring case.
fn same_value(record_type: &str, a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    match record_type.to_ascii_uppercase().as_str() {
        "CNAME" | "NS" | "MX" | "SRV" | "PTR" => {
            normalize_domain_name(a).eq_ignore_ascii_case(normalize_domain_name(b))
        }
        _ => false,
    }
}

fn dedup_values(record_type: &str, values: &[String]) -> Vec<ResourceRecord> {
    let mut seen: Vec<&str> = Vec::with_capacity(values.len());
    for value in values {
        if !seen.iter().any(|v| same_value(record_type, v, value)) {
            seen.push(value);
        }
    }
    seen.into_iter()
        .map(|v| ResourceRecord::from_presentation(record_type, v))
        .collect()
}
