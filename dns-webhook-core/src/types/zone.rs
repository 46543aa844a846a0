//! Zone snapshot

use dns_webhook_provider::ProviderZone;
use serde::{Deserialize, Serialize};

use super::{Record, RecordType};

/// A zone with the records it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    #[serde(default)]
    pub records: Vec<Record>,
}

impl Zone {
    /// Records whose type the read path exposes.
    pub fn supported_records(&self) -> impl Iterator<Item = &Record> {
        self.records.iter().filter(|r| r.record_type.is_supported())
    }
}

impl From<ProviderZone> for Zone {
    fn from(zone: ProviderZone) -> Self {
        Self {
            name: zone.name,
            records: zone
                .records
                .into_iter()
                .map(|r| {
                    Record::new(
                        r.name,
                        RecordType::from(r.record_type),
                        r.ttl,
                        r.short_answers,
                    )
                })
                .collect(),
        }
    }
}
