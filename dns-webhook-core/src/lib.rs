//! DNS Webhook Core Library
//!
//! The reconciliation engine behind the ExternalDNS webhook:
//! - zone resolution ([`ZoneResolver`])
//! - record value diffing ([`differ`])
//! - concurrent apply with partial-failure aggregation ([`ApplyService`])
//! - the read path ([`RecordService`])
//!
//! The provider is reached only through [`dns_webhook_provider::DnsClient`],
//! so the engine runs unchanged against the real client or a test double.

pub mod context;
pub mod differ;
pub mod error;
pub mod resolver;
pub mod services;
pub mod types;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use context::{CancelHandle, CancelSignal, RequestContext};
pub use error::{
    ApplyError, CategoryError, CoreError, CoreResult, Operation, OperationError, OperationFailure,
};
pub use resolver::ZoneResolver;
pub use services::{ApplyService, CategoryRun, ChangeExecutor, RecordService};
pub use types::{ApplyOutcome, ChangeKind, ChangeSet, DomainFilter, Record, RecordType, Zone};
