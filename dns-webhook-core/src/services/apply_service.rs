//! Apply coordinator

use std::sync::Arc;

use dns_webhook_provider::{DnsClient, ZonesFilter};
use tracing::{Instrument, error, info};

use crate::context::RequestContext;
use crate::error::{CoreError, CoreResult};
use crate::resolver::ZoneResolver;
use crate::services::ChangeExecutor;
use crate::services::change_executor::guarded;
use crate::types::{ApplyOutcome, ChangeKind, ChangeSet};

/// Runs the update, delete and create categories of a change set
/// concurrently and aggregates their failures.
pub struct ApplyService {
    client: Arc<dyn DnsClient>,
    dry_run: bool,
}

impl ApplyService {
    #[must_use]
    pub fn new(client: Arc<dyn DnsClient>, dry_run: bool) -> Self {
        Self { client, dry_run }
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Apply `changes`; `Ok(())` only when every category succeeded.
    pub async fn apply(&self, ctx: &RequestContext, changes: &ChangeSet) -> CoreResult<()> {
        self.apply_changes(ctx, changes)
            .await?
            .into_result()
            .map_err(CoreError::Apply)
    }

    /// Apply `changes` and report per-category counts and failures.
    ///
    /// An empty change set returns at once without contacting the provider.
    /// Zones are listed once and shared by all three categories; a listing
    /// cut short by `ctx` returns [`CoreError::Cancelled`]. Every task
    /// is spawned before the first join. Results are collected in the fixed
    /// order update, delete, create.
    pub async fn apply_changes(
        &self,
        ctx: &RequestContext,
        changes: &ChangeSet,
    ) -> CoreResult<ApplyOutcome> {
        if !changes.has_changes() {
            return Ok(ApplyOutcome::default());
        }

        async {
            info!(dry_run = self.dry_run, "starting to apply changes");

            let zones_filter = ZonesFilter::all();
            let listing = self.client.zones_with_records(&zones_filter);
            let zones = guarded(ctx.cancel(), listing).await.map_err(|failure| {
                error!(error = %failure, "failed to list zones");
                CoreError::from_failure(failure, CoreError::ListZones)
            })?;
            let resolver = Arc::new(ZoneResolver::new(zones.iter().map(|z| z.name.as_str())));

            let executor =
                ChangeExecutor::new(Arc::clone(&self.client), resolver, self.dry_run);
            let runs = [
                executor.execute(ctx, ChangeKind::Update, changes),
                executor.execute(ctx, ChangeKind::Delete, changes),
                executor.execute(ctx, ChangeKind::Create, changes),
            ];

            let mut outcome = ApplyOutcome::default();
            for run in runs {
                let kind = run.kind();
                let count = run.count();
                match kind {
                    ChangeKind::Update => outcome.updated = count,
                    ChangeKind::Delete => outcome.deleted = count,
                    ChangeKind::Create => outcome.created = count,
                }
                match run.wait().await {
                    Ok(_) => info!("{kind} changes committed"),
                    Err(e) => {
                        error!(error = %e, "failed to commit {kind} changes");
                        outcome.errors.push(e);
                    }
                }
            }

            info!(
                created = outcome.created,
                updated = outcome.updated,
                deleted = outcome.deleted,
                failed_categories = outcome.errors.len(),
                "finished applying changes"
            );
            Ok::<_, CoreError>(outcome)
        }
        .instrument(ctx.span().clone())
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::context::{CancelHandle, CancelSignal};
    use crate::error::Operation;
    use crate::test_utils::{Call, MockDnsClient, network_error};
    use crate::types::{Record, RecordType};

    fn a(name: &str, targets: &[&str]) -> Record {
        Record::new(name, RecordType::A, 300, targets.iter().copied())
    }

    fn service(client: &Arc<MockDnsClient>, dry_run: bool) -> ApplyService {
        ApplyService::new(client.clone(), dry_run)
    }

    fn full_change_set() -> ChangeSet {
        ChangeSet {
            create: vec![a("new.test.com", &["5.5.5.5"])],
            update_old: vec![a("upd.test.com", &["1.1.1.1"])],
            update_new: vec![a("upd.test.com", &["1.2.3.4"])],
            delete: vec![a("old.test.com", &["9.9.9.9"])],
        }
    }

    // ===== Empty change set =====

    #[tokio::test]
    async fn empty_change_set_makes_no_calls() {
        let client = MockDnsClient::with_zones(&["test.com"]);
        let result = service(&client, false)
            .apply(&RequestContext::new(), &ChangeSet::default())
            .await;
        assert!(result.is_ok());
        assert!(client.calls().await.is_empty());
    }

    // ===== Scenarios =====

    #[tokio::test]
    async fn delete_in_known_zone() {
        let client = MockDnsClient::with_zones(&["test.com"]);
        let changes = ChangeSet {
            delete: vec![a("my.test.com", &["1.1.1.1"])],
            ..ChangeSet::default()
        };

        let outcome = service(&client, false)
            .apply_changes(&RequestContext::new(), &changes)
            .await
            .unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.deleted, 1);
        assert_eq!(
            client.mutating_calls().await,
            vec![Call::Delete {
                zone: "test.com".into(),
                name: "my.test.com".into(),
                record_type: "A".into(),
                contents: vec!["1.1.1.1".into()],
            }]
        );
    }

    #[tokio::test]
    async fn update_issues_delete_then_add() {
        let client = MockDnsClient::with_zones(&["test.com"]);
        let changes = ChangeSet {
            update_old: vec![a("my.test.com", &["1.1.1.1"])],
            update_new: vec![a("my.test.com", &["1.2.3.4"])],
            ..ChangeSet::default()
        };

        let outcome = service(&client, false)
            .apply_changes(&RequestContext::new(), &changes)
            .await
            .unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.updated, 2);
        assert_eq!(
            client.mutating_calls().await,
            vec![
                Call::Delete {
                    zone: "test.com".into(),
                    name: "my.test.com".into(),
                    record_type: "A".into(),
                    contents: vec!["1.1.1.1".into()],
                },
                Call::Add {
                    zone: "test.com".into(),
                    name: "my.test.com".into(),
                    record_type: "A".into(),
                    values: vec!["1.2.3.4".into()],
                    ttl: 300,
                },
            ]
        );
    }

    #[tokio::test]
    async fn update_fails_when_either_call_fails() {
        let client = MockDnsClient::with_zones(&["test.com"]);
        client.fail_delete("my.test.com", network_error("reset")).await;
        let changes = ChangeSet {
            update_old: vec![a("my.test.com", &["1.1.1.1"])],
            update_new: vec![a("my.test.com", &["1.2.3.4"])],
            ..ChangeSet::default()
        };

        let err = service(&client, false)
            .apply(&RequestContext::new(), &changes)
            .await
            .unwrap_err();
        let CoreError::Apply(apply) = err else {
            panic!("expected apply error, got {err:?}");
        };
        assert_eq!(apply.failed_kinds(), vec![ChangeKind::Update]);
        assert_eq!(apply.categories[0].errors[0].operation, Operation::Delete);
        // The add still ran.
        assert_eq!(client.mutating_calls().await.len(), 2);
    }

    #[tokio::test]
    async fn unknown_zone_is_skipped() {
        let client = MockDnsClient::with_zones(&["test.com"]);
        let changes = ChangeSet {
            delete: vec![a("my.example.org", &["1.1.1.1"])],
            ..ChangeSet::default()
        };

        let outcome = service(&client, false)
            .apply_changes(&RequestContext::new(), &changes)
            .await
            .unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.deleted, 0);
        assert!(client.mutating_calls().await.is_empty());
    }

    #[tokio::test]
    async fn update_without_previous_record_creates_all() {
        let client = MockDnsClient::with_zones(&["test.com"]);
        let changes = ChangeSet {
            update_new: vec![a("my.test.com", &["1.1.1.1", "2.2.2.2"])],
            ..ChangeSet::default()
        };

        service(&client, false)
            .apply(&RequestContext::new(), &changes)
            .await
            .unwrap();
        assert_eq!(
            client.mutating_calls().await,
            vec![Call::Add {
                zone: "test.com".into(),
                name: "my.test.com".into(),
                record_type: "A".into(),
                values: vec!["1.1.1.1".into(), "2.2.2.2".into()],
                ttl: 300,
            }]
        );
    }

    #[tokio::test]
    async fn unchanged_update_makes_no_call() {
        let client = MockDnsClient::with_zones(&["test.com"]);
        let changes = ChangeSet {
            update_old: vec![a("my.test.com", &["1.1.1.1"])],
            update_new: vec![a("my.test.com", &["1.1.1.1"])],
            ..ChangeSet::default()
        };

        service(&client, false)
            .apply(&RequestContext::new(), &changes)
            .await
            .unwrap();
        assert!(client.mutating_calls().await.is_empty());
    }

    // ===== Partial failure =====

    #[tokio::test]
    async fn one_failing_category_does_not_stop_the_others() {
        let client = MockDnsClient::with_zones(&["test.com"]);
        client.fail_add("new.test.com", network_error("boom")).await;

        let err = service(&client, false)
            .apply(&RequestContext::new(), &full_change_set())
            .await
            .unwrap_err();

        let CoreError::Apply(apply) = &err else {
            panic!("expected apply error, got {err:?}");
        };
        assert_eq!(apply.failed_kinds(), vec![ChangeKind::Create]);
        let msg = err.to_string();
        assert!(msg.contains("create changes failed"), "{msg}");
        assert!(msg.contains("boom"), "{msg}");
        assert!(!msg.contains("update changes failed"), "{msg}");
        assert!(!msg.contains("delete changes failed"), "{msg}");

        // update: delete + add, delete: 1, create: 1
        assert_eq!(client.mutating_calls().await.len(), 4);
    }

    #[tokio::test]
    async fn failures_in_several_categories_are_all_reported() {
        let client = MockDnsClient::with_zones(&["test.com"]);
        client.fail_add("new.test.com", network_error("create failed")).await;
        client.fail_delete("old.test.com", network_error("delete failed")).await;

        let outcome = service(&client, false)
            .apply_changes(&RequestContext::new(), &full_change_set())
            .await
            .unwrap();
        let kinds: Vec<_> = outcome.errors.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ChangeKind::Delete, ChangeKind::Create]);

        let msg = outcome.into_result().unwrap_err().to_string();
        assert!(msg.contains("create failed") && msg.contains("delete failed"), "{msg}");
    }

    #[tokio::test]
    async fn failing_records_do_not_cancel_siblings() {
        let client = MockDnsClient::with_zones(&["test.com"]);
        client.fail_delete("b.test.com", network_error("nope")).await;
        let changes = ChangeSet {
            delete: vec![
                a("a.test.com", &["1.1.1.1"]),
                a("b.test.com", &["2.2.2.2"]),
                a("c.test.com", &["3.3.3.3"]),
            ],
            ..ChangeSet::default()
        };

        let outcome = service(&client, false)
            .apply_changes(&RequestContext::new(), &changes)
            .await
            .unwrap();
        assert_eq!(outcome.deleted, 3);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].errors[0].name, "b.test.com");
        assert_eq!(client.mutating_calls().await.len(), 3);
    }

    #[tokio::test]
    async fn zone_listing_failure_fails_apply() {
        let client = MockDnsClient::with_zones(&["test.com"]);
        client.set_list_error(Some(network_error("down"))).await;

        let err = service(&client, false)
            .apply(&RequestContext::new(), &full_change_set())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ListZones(_)), "{err:?}");
        assert!(client.mutating_calls().await.is_empty());
    }

    // ===== Dry-run =====

    #[tokio::test]
    async fn dry_run_makes_no_mutating_calls() {
        let client = MockDnsClient::with_zones(&["test.com"]);

        let outcome = service(&client, true)
            .apply_changes(&RequestContext::new(), &full_change_set())
            .await
            .unwrap();
        assert!(outcome.is_success());
        assert_eq!(
            (outcome.created, outcome.updated, outcome.deleted),
            (1, 2, 1)
        );
        assert!(client.mutating_calls().await.is_empty());
        assert_eq!(
            client.calls().await,
            vec![Call::ZonesWithRecords(Vec::new())]
        );
    }

    #[tokio::test]
    async fn dry_run_ignores_provider_failures() {
        let client = MockDnsClient::with_zones(&["test.com"]);
        client.fail_add("new.test.com", network_error("boom")).await;

        let result = service(&client, true)
            .apply(&RequestContext::new(), &full_change_set())
            .await;
        assert!(result.is_ok());
    }

    // ===== Cancellation =====

    #[tokio::test]
    async fn cancelled_request_starts_nothing() {
        let client = MockDnsClient::with_zones(&["test.com"]);
        let (handle, signal) = CancelHandle::new();
        handle.cancel();
        let ctx = RequestContext::new().with_cancel(signal);

        let err = service(&client, false)
            .apply_changes(&ctx, &full_change_set())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Cancelled), "{err:?}");
        assert!(client.calls().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_stops_slow_zone_listing() {
        let client = MockDnsClient::with_zones(&["test.com"]);
        client.set_list_delay(Duration::from_secs(3600)).await;
        let ctx = RequestContext::new().with_cancel(CancelSignal::after(Duration::from_secs(5)));
        let changes = ChangeSet {
            delete: vec![a("www.test.com", &["1.1.1.1"])],
            ..ChangeSet::default()
        };

        let started = tokio::time::Instant::now();
        let err = service(&client, false)
            .apply(&ctx, &changes)
            .await
            .unwrap_err();
        let elapsed = started.elapsed();

        assert!(matches!(err, CoreError::Cancelled), "{err:?}");
        assert!(elapsed >= Duration::from_secs(5), "{elapsed:?}");
        assert!(elapsed < Duration::from_secs(60), "{elapsed:?}");
        assert_eq!(client.calls().await, vec![Call::ZonesWithRecords(vec![])]);
        assert!(client.mutating_calls().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_fails_in_flight_calls() {
        let client = MockDnsClient::with_zones(&["test.com"]);
        client.set_delay(Duration::from_secs(60)).await;
        let ctx = RequestContext::new().with_cancel(CancelSignal::after(Duration::from_secs(5)));

        let err = service(&client, false)
            .apply(&ctx, &full_change_set())
            .await
            .unwrap_err();
        let CoreError::Apply(apply) = err else {
            panic!("expected apply error, got {err:?}");
        };
        assert_eq!(
            apply.failed_kinds(),
            vec![ChangeKind::Update, ChangeKind::Delete, ChangeKind::Create]
        );
        assert!(client.mutating_calls().await.is_empty());
    }
}
