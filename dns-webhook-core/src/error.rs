//! Unified error type definition

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::types::ChangeKind;

// Re-export library error type
pub use dns_webhook_provider::ProviderError;

/// Core layer error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// Zone listing before an apply failed; nothing was attempted.
    #[error("failed to list zones: {0}")]
    ListZones(ProviderError),

    /// One or more change categories failed.
    #[error("{0}")]
    Apply(ApplyError),

    /// Provider error (converting from library)
    #[error("{0}")]
    Provider(#[from] ProviderError),

    /// The request was cancelled or hit its deadline before the provider
    /// answered.
    #[error("request cancelled")]
    Cancelled,
}

impl CoreError {
    /// Whether it is expected behavior (bad credentials, missing zone, etc.) is used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Please update this method simultaneously when new variants are added.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::ListZones(e) | Self::Provider(e) => e.is_expected(),
            Self::Apply(_) | Self::Cancelled => false,
        }
    }

    /// Error for a guarded call that did not complete: provider failures go
    /// through `wrap`, anything else means the request was cancelled.
    pub(crate) fn from_failure(failure: OperationFailure, wrap: fn(ProviderError) -> Self) -> Self {
        match failure {
            OperationFailure::Provider(e) => wrap(e),
            OperationFailure::Cancelled | OperationFailure::Aborted(_) => Self::Cancelled,
        }
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Provider call made for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// `add_rrset`
    Add,
    /// `delete_rrset_records`
    Delete,
    /// delete then add for one updated record
    Update,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "add",
            Self::Delete => "delete",
            Self::Update => "update",
        })
    }
}

/// Why a record operation did not complete.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail")]
pub enum OperationFailure {
    #[error("{0}")]
    Provider(ProviderError),

    /// The request was cancelled or hit its deadline.
    #[error("cancelled")]
    Cancelled,

    /// The task panicked or was aborted.
    #[error("task aborted: {0}")]
    Aborted(String),
}

/// A failed provider call for one record.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("failed to {operation} rrset records {name} {record_type} in zone {zone}: {failure}")]
pub struct OperationError {
    pub operation: Operation,
    pub zone: String,
    pub name: String,
    pub record_type: String,
    pub failure: OperationFailure,
}

/// Every failed operation of one change category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryError {
    pub kind: ChangeKind,
    pub errors: Vec<OperationError>,
}

impl fmt::Display for CategoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} changes failed: ", self.kind)?;
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CategoryError {}

/// Compound error of an apply call; names only the failing categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyError {
    pub categories: Vec<CategoryError>,
}

impl ApplyError {
    pub fn new(categories: Vec<CategoryError>) -> Self {
        Self { categories }
    }

    /// Failing categories in collection order.
    pub fn failed_kinds(&self) -> Vec<ChangeKind> {
        self.categories.iter().map(|c| c.kind).collect()
    }

    /// Total number of failed record operations.
    pub fn operation_count(&self) -> usize {
        self.categories.iter().map(|c| c.errors.len()).sum()
    }
}

impl fmt::Display for ApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, c) in self.categories.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ApplyError {}
