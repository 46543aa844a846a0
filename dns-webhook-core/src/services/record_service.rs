//! Read path: current records, domain filter, endpoint adjustment

use std::collections::BTreeMap;
use std::sync::Arc;

use dns_webhook_provider::{DnsClient, ZonesFilter};
use tracing::{Instrument, debug, error, info};

use crate::context::RequestContext;
use crate::error::{CoreError, CoreResult};
use crate::services::change_executor::guarded;
use crate::types::{DomainFilter, Record, RecordType, Zone};

/// Lists what the provider currently holds.
pub struct RecordService {
    client: Arc<dyn DnsClient>,
}

impl RecordService {
    #[must_use]
    pub fn new(client: Arc<dyn DnsClient>) -> Self {
        Self { client }
    }

    /// Every supported record of the zones `filter` accepts.
    ///
    /// TTL and targets are passed through verbatim. A listing failure is
    /// returned as-is; there is no partial answer. A listing still running
    /// when `ctx` is cancelled yields [`CoreError::Cancelled`].
    pub async fn records(
        &self,
        ctx: &RequestContext,
        filter: &DomainFilter,
    ) -> CoreResult<Vec<Record>> {
        async {
            info!("starting to get records");
            let names = filter.include_names();
            let zones_filter = ZonesFilter::by_names(names);
            let listing = self.client.zones_with_records(&zones_filter);
            let zones = guarded(ctx.cancel(), listing)
                .await
                .map_err(|failure| CoreError::from_failure(failure, CoreError::Provider))?;

            let mut count_by_zone = BTreeMap::new();
            let mut records = Vec::new();
            for zone in zones.into_iter().map(Zone::from) {
                if !filter.matches(&zone.name) {
                    debug!(zone = %zone.name, "zone outside domain filter");
                    continue;
                }
                let before = records.len();
                records.extend(zone.supported_records().cloned());
                count_by_zone.insert(zone.name, records.len() - before);
            }

            info!(
                zones = count_by_zone.len(),
                records = records.len(),
                "finished getting records"
            );
            debug!(?count_by_zone, "records by zone");
            Ok::<_, CoreError>(records)
        }
        .instrument(ctx.span().clone())
        .await
    }

    /// Domain filter announced to the orchestrator.
    ///
    /// Provider zone names (each with and without trailing dot) that
    /// `configured` accepts. Falls back to `configured` when listing fails.
    pub async fn domain_filter(
        &self,
        ctx: &RequestContext,
        configured: &DomainFilter,
    ) -> DomainFilter {
        async {
            let zones_filter = ZonesFilter::all();
            let listing = self.client.zones_with_records(&zones_filter);
            match guarded(ctx.cancel(), listing).await {
                Ok(zones) => {
                    let include: Vec<String> = zones
                        .iter()
                        .filter(|z| configured.matches(&z.name))
                        .flat_map(|z| {
                            let name = z.name.strip_suffix('.').unwrap_or(&z.name);
                            [name.to_string(), format!("{name}.")]
                        })
                        .collect();
                    DomainFilter::new(include, configured.exclude().iter().cloned())
                }
                Err(e) => {
                    error!(error = %e, "failed to get zones with records");
                    configured.clone()
                }
            }
        }
        .instrument(ctx.span().clone())
        .await
    }

    /// Drop TXT endpoints: ownership TXT records are not kept at the
    /// provider.
    #[must_use]
    pub fn adjust_endpoints(endpoints: Vec<Record>) -> Vec<Record> {
        endpoints
            .into_iter()
            .filter(|e| e.record_type != RecordType::TXT)
            .collect()
    }
}
