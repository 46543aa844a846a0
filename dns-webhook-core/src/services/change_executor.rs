//! Per-category change execution
//!
//! Resolves the owning zone of each record, computes the values to add or
//! remove and dispatches one tokio task per record. Tasks never cancel each
//! other; the category result is collected by [`CategoryRun::wait`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use dns_webhook_provider::{DnsClient, Result as ProviderResult};
use tokio::task::{Id, JoinSet};
use tracing::{Instrument, debug, error, info, warn};

use crate::context::{CancelSignal, RequestContext};
use crate::differ;
use crate::error::{CategoryError, Operation, OperationError, OperationFailure};
use crate::resolver::ZoneResolver;
use crate::types::{ChangeKind, ChangeSet, Record};

/// Dispatches the provider calls of one change category.
pub struct ChangeExecutor {
    client: Arc<dyn DnsClient>,
    resolver: Arc<ZoneResolver>,
    dry_run: bool,
}

impl ChangeExecutor {
    pub fn new(client: Arc<dyn DnsClient>, resolver: Arc<ZoneResolver>, dry_run: bool) -> Self {
        Self {
            client,
            resolver,
            dry_run,
        }
    }

    /// Plan and dispatch every record of `kind`.
    ///
    /// Returns once all tasks are spawned; the affected-value count is final
    /// at that point. Must be called inside a tokio runtime.
    pub fn execute(
        &self,
        ctx: &RequestContext,
        kind: ChangeKind,
        changes: &ChangeSet,
    ) -> CategoryRun {
        let _entered = ctx.span().enter();
        info!("start applying {kind} changes");

        let mut run = CategoryRun::new(kind);
        for record in changes.records(kind) {
            let Some(zone) = self.resolver.resolve(&record.name) else {
                warn!(dns_name = %record.name, "{kind} skipped - no such zone");
                continue;
            };
            match kind {
                ChangeKind::Update => self.update(ctx, &mut run, zone, record, &changes.update_old),
                ChangeKind::Create => self.create(ctx, &mut run, zone, record),
                ChangeKind::Delete => self.delete(ctx, &mut run, zone, record),
            }
        }

        info!(
            count = run.count,
            tasks = run.pending(),
            "finish applying {kind} changes"
        );
        run
    }

    fn update(
        &self,
        ctx: &RequestContext,
        run: &mut CategoryRun,
        zone: &str,
        record: &Record,
        olds: &[Record],
    ) {
        let to_delete = differ::targets_to_delete(record, olds);
        let to_create = differ::targets_to_create(record, olds);
        self.log_values("update-delete", record, &to_delete);
        self.log_values("update-add", record, &to_create);
        run.count += to_delete.len() + to_create.len();

        if self.dry_run || (to_delete.is_empty() && to_create.is_empty()) {
            return;
        }

        let target = Target::new(zone, record);
        let client = Arc::clone(&self.client);
        let cancel = ctx.cancel().clone();
        let ttl = record.ttl;
        let task_target = target.clone();
        run.spawn(ctx, Operation::Update, target, async move {
            let t = task_target;
            let mut errors = Vec::new();
            // Both calls are attempted even when the first one fails.
            if !to_delete.is_empty() {
                let call = client.delete_rrset_records(&t.zone, &t.name, &t.record_type, &to_delete);
                if let Err(failure) = guarded(&cancel, call).await {
                    errors.push(t.failed(Operation::Delete, failure));
                }
            }
            if !to_create.is_empty() {
                let call = client.add_rrset(&t.zone, &t.name, &t.record_type, &to_create, ttl);
                if let Err(failure) = guarded(&cancel, call).await {
                    errors.push(t.failed(Operation::Add, failure));
                }
            }
            errors
        });
    }

    fn create(&self, ctx: &RequestContext, run: &mut CategoryRun, zone: &str, record: &Record) {
        self.log_values("create", record, &record.targets);
        run.count += record.targets.len();

        if self.dry_run || record.targets.is_empty() {
            return;
        }

        let target = Target::new(zone, record);
        let client = Arc::clone(&self.client);
        let cancel = ctx.cancel().clone();
        let values = record.targets.clone();
        let ttl = record.ttl;
        let t = target.clone();
        run.spawn(ctx, Operation::Add, target, async move {
            let call = client.add_rrset(&t.zone, &t.name, &t.record_type, &values, ttl);
            match guarded(&cancel, call).await {
                Ok(()) => Vec::new(),
                Err(failure) => vec![t.failed(Operation::Add, failure)],
            }
        });
    }

    fn delete(&self, ctx: &RequestContext, run: &mut CategoryRun, zone: &str, record: &Record) {
        self.log_values("delete", record, &record.targets);
        run.count += record.targets.len();

        if self.dry_run || record.targets.is_empty() {
            return;
        }

        let target = Target::new(zone, record);
        let client = Arc::clone(&self.client);
        let cancel = ctx.cancel().clone();
        let values = record.targets.clone();
        let t = target.clone();
        run.spawn(ctx, Operation::Delete, target, async move {
            let call = client.delete_rrset_records(&t.zone, &t.name, &t.record_type, &values);
            match guarded(&cancel, call).await {
                Ok(()) => Vec::new(),
                Err(failure) => vec![t.failed(Operation::Delete, failure)],
            }
        });
    }

    fn log_values(&self, action: &str, record: &Record, values: &[String]) {
        for value in values {
            if self.dry_run {
                info!(
                    dns_name = %record.name,
                    dry_run = true,
                    "for {action} {} {} {value}",
                    record.name,
                    record.record_type
                );
            } else {
                debug!(
                    dns_name = %record.name,
                    "for {action} {} {} {value}",
                    record.name,
                    record.record_type
                );
            }
        }
    }
}

/// Run one provider call unless the request is cancelled; an in-flight call
/// is abandoned as soon as the signal fires.
pub(crate) async fn guarded<F, T>(cancel: &CancelSignal, call: F) -> Result<T, OperationFailure>
where
    F: Future<Output = ProviderResult<T>>,
{
    if cancel.is_cancelled() {
        return Err(OperationFailure::Cancelled);
    }
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(OperationFailure::Cancelled),
        res = call => res.map_err(OperationFailure::Provider),
    }
}

/// Owned address of one record operation.
#[derive(Debug, Clone)]
struct Target {
    zone: String,
    name: String,
    record_type: String,
}

impl Target {
    fn new(zone: &str, record: &Record) -> Self {
        Self {
            zone: zone.to_string(),
            name: record.name.clone(),
            record_type: record.record_type.to_string(),
        }
    }

    fn failed(&self, operation: Operation, failure: OperationFailure) -> OperationError {
        let err = OperationError {
            operation,
            zone: self.zone.clone(),
            name: self.name.clone(),
            record_type: self.record_type.clone(),
            failure,
        };
        error!(dns_name = %self.name, error = %err.failure, "failed to {operation} rrset records");
        err
    }
}

struct PendingTask {
    index: usize,
    operation: Operation,
    target: Target,
}

/// Tasks dispatched for one category plus the number of affected values.
pub struct CategoryRun {
    kind: ChangeKind,
    count: usize,
    tasks: JoinSet<Vec<OperationError>>,
    pending: HashMap<Id, PendingTask>,
}

impl CategoryRun {
    fn new(kind: ChangeKind) -> Self {
        Self {
            kind,
            count: 0,
            tasks: JoinSet::new(),
            pending: HashMap::new(),
        }
    }

    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    /// Record values affected by this category (dry-run included).
    pub fn count(&self) -> usize {
        self.count
    }

    /// Tasks dispatched and not yet collected.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    fn spawn<F>(&mut self, ctx: &RequestContext, operation: Operation, target: Target, task: F)
    where
        F: Future<Output = Vec<OperationError>> + Send + 'static,
    {
        let index = self.pending.len();
        let handle = self.tasks.spawn(task.instrument(ctx.span().clone()));
        self.pending.insert(
            handle.id(),
            PendingTask {
                index,
                operation,
                target,
            },
        );
    }

    /// Wait for every task of the category.
    ///
    /// Returns the affected-value count, or every failed operation in
    /// dispatch order.
    pub async fn wait(mut self) -> Result<usize, CategoryError> {
        let mut failed: Vec<(usize, Vec<OperationError>)> = Vec::new();

        while let Some(joined) = self.tasks.join_next_with_id().await {
            match joined {
                Ok((id, errors)) => {
                    let task = self.pending.remove(&id);
                    if let (Some(task), false) = (task, errors.is_empty()) {
                        failed.push((task.index, errors));
                    }
                }
                Err(join_err) => {
                    if let Some(task) = self.pending.remove(&join_err.id()) {
                        let failure = OperationFailure::Aborted(join_err.to_string());
                        failed.push((task.index, vec![task.target.failed(task.operation, failure)]));
                    }
                }
            }
        }

        if failed.is_empty() {
            return Ok(self.count);
        }
        failed.sort_by_key(|(index, _)| *index);
        Err(CategoryError {
            kind: self.kind,
            errors: failed.into_iter().flat_map(|(_, errors)| errors).collect(),
        })
    }
}
