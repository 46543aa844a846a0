use std::sync::Arc;
use std::time::Duration;

use dns_webhook_core::{ApplyService, CancelSignal, DomainFilter, RecordService};
use dns_webhook_provider::DnsClient;

use crate::config::Config;

/// Shared by every worker.
pub struct AppState {
    pub apply: Arc<ApplyService>,
    pub records: RecordService,
    /// Filter from configuration; `GET /` narrows it to existing zones.
    pub domain_filter: DomainFilter,
    pub apply_timeout: Option<Duration>,
}

impl AppState {
    pub fn new(
        client: Arc<dyn DnsClient>,
        dry_run: bool,
        domain_filter: DomainFilter,
        apply_timeout: Option<Duration>,
    ) -> Self {
        Self {
            apply: Arc::new(ApplyService::new(Arc::clone(&client), dry_run)),
            records: RecordService::new(client),
            domain_filter,
            apply_timeout,
        }
    }

    pub fn from_config(client: Arc<dyn DnsClient>, config: &Config) -> Self {
        Self::new(
            client,
            config.dry_run,
            config.domain_filter(),
            config.apply_timeout(),
        )
    }

    /// Cancellation for one apply: the configured deadline, if any.
    pub fn apply_cancel(&self) -> CancelSignal {
        self.apply_timeout
            .map_or_else(CancelSignal::never, CancelSignal::after)
    }
}
