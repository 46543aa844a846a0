//! Zone resolution: map a DNS name to the zone that owns it

use std::collections::HashMap;

/// Lookup of known zones, built once per batch and shared read-only.
///
/// Keys are zone names without a trailing dot, ASCII lower-cased; values are
/// the provider's spelling (trailing dot removed).
#[derive(Debug, Clone, Default)]
pub struct ZoneResolver {
    zones: HashMap<String, String>,
}

impl ZoneResolver {
    pub fn new<I, S>(zone_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let zones = zone_names
            .into_iter()
            .filter_map(|name| {
                let name = strip_dot(name.as_ref().trim());
                (!name.is_empty()).then(|| (name.to_ascii_lowercase(), name.to_string()))
            })
            .collect();
        Self { zones }
    }

    /// Longest known zone that equals `candidate` or is a suffix of it on a
    /// label boundary.
    ///
    /// Labels are stripped from the left one at a time, so the first hit is
    /// the longest match. A leading dot is tolerated. O(labels).
    pub fn resolve(&self, candidate: &str) -> Option<&str> {
        let name = strip_dot(candidate).to_ascii_lowercase();
        let mut rest = name.as_str();
        loop {
            if let Some(zone) = self.zones.get(rest) {
                return Some(zone);
            }
            let (_, tail) = rest.split_once('.')?;
            rest = tail;
        }
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

fn strip_dot(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}
