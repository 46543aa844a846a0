//! Record value diffing for updates
//!
//! Pure functions over record snapshots; inputs are never modified.

use std::collections::HashSet;

use crate::types::Record;

/// Values of `target.targets` absent from `source.targets`.
///
/// Keeps `target` order, compares as sets after normalizing by the target's
/// record type, and never returns the same value twice.
pub fn diff(target: &Record, source: &Record) -> Vec<String> {
    let kind = &target.record_type;
    let existing: HashSet<String> = source
        .targets
        .iter()
        .map(|v| kind.normalize_value(v))
        .collect();

    let mut seen = HashSet::with_capacity(target.targets.len());
    target
        .targets
        .iter()
        .filter(|v| {
            let key = kind.normalize_value(v);
            !existing.contains(&key) && seen.insert(key)
        })
        .cloned()
        .collect()
}

/// The old record `new` replaces: the last entry of `olds` with the same
/// `(name, record_type)`.
pub fn find_previous<'a>(new: &Record, olds: &'a [Record]) -> Option<&'a Record> {
    olds.iter().rev().find(|old| old.same_identity(new))
}

/// Values `new` adds over its previous record. Without a previous record
/// every value of `new` is new.
pub fn targets_to_create(new: &Record, olds: &[Record]) -> Vec<String> {
    match find_previous(new, olds) {
        Some(old) => diff(new, old),
        None => diff(new, &empty_like(new)),
    }
}

/// Values of the previous record that `new` drops. Empty without a previous
/// record.
pub fn targets_to_delete(new: &Record, olds: &[Record]) -> Vec<String> {
    find_previous(new, olds).map_or_else(Vec::new, |old| diff(old, new))
}

fn empty_like(record: &Record) -> Record {
    Record::new(
        record.name.clone(),
        record.record_type.clone(),
        record.ttl,
        Vec::<String>::new(),
    )
}
