//! Change set pushed by the orchestrator

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Record, null_as_default};

/// The four-way partition of desired mutations for one reconciliation cycle.
///
/// `update_old` and `update_new` are paired by `(name, record_type)`, not by
/// position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    #[serde(rename = "Create", default, deserialize_with = "null_as_default")]
    pub create: Vec<Record>,
    #[serde(rename = "UpdateOld", default, deserialize_with = "null_as_default")]
    pub update_old: Vec<Record>,
    #[serde(rename = "UpdateNew", default, deserialize_with = "null_as_default")]
    pub update_new: Vec<Record>,
    #[serde(rename = "Delete", default, deserialize_with = "null_as_default")]
    pub delete: Vec<Record>,
}

impl ChangeSet {
    /// False only when all four lists are empty.
    pub fn has_changes(&self) -> bool {
        !(self.create.is_empty()
            && self.update_old.is_empty()
            && self.update_new.is_empty()
            && self.delete.is_empty())
    }

    /// Records processed for `kind` (`update_new` for updates).
    pub fn records(&self, kind: ChangeKind) -> &[Record] {
        match kind {
            ChangeKind::Create => &self.create,
            ChangeKind::Update => &self.update_new,
            ChangeKind::Delete => &self.delete,
        }
    }
}

/// Change category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Create,
    Update,
    Delete,
}

impl ChangeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
