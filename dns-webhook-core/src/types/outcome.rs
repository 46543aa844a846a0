//! Apply summary

use serde::Serialize;

use crate::error::{ApplyError, CategoryError};

/// Summary of one apply call. Counts are the number of record values each
/// category scheduled; they are advisory and not part of the error contract.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ApplyOutcome {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub errors: Vec<CategoryError>,
}

impl ApplyOutcome {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok(())` when every category succeeded, otherwise one compound error.
    pub fn into_result(self) -> Result<(), ApplyError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApplyError::new(self.errors))
        }
    }
}
