//! Domain types

mod changes;
mod domain_filter;
mod outcome;
mod record;
mod zone;

pub use changes::{ChangeKind, ChangeSet};
pub use domain_filter::DomainFilter;
pub use outcome::ApplyOutcome;
pub use record::{ProviderSpecificProperty, Record, RecordType};
pub use zone::Zone;

use serde::{Deserialize, Deserializer};

/// Decode `null` as the type's default (ExternalDNS sends `null` for empty lists).
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
