//! Domain scope filter

use serde::{Deserialize, Serialize};

use super::null_as_default;

/// Include/exclude lists of domain suffixes.
///
/// An empty include list means "no restriction". Matching strips a trailing
/// dot and ignores ASCII case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainFilter {
    #[serde(default, deserialize_with = "null_as_default")]
    include: Vec<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    exclude: Vec<String>,
}

impl DomainFilter {
    /// Blank entries are dropped; spelling is otherwise kept.
    pub fn new<I, E, S, T>(include: I, exclude: E) -> Self
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            include: clean(include),
            exclude: clean(exclude),
        }
    }

    pub fn include(&self) -> &[String] {
        &self.include
    }

    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    /// No include and no exclude entries.
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// Include entries without trailing dot, lower-cased and de-duplicated.
    pub fn include_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::with_capacity(self.include.len());
        for entry in &self.include {
            let name = normalize(entry);
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// `name` equals or is a subdomain of an include entry (or include is
    /// empty) and does not fall under an exclude entry.
    pub fn matches(&self, name: &str) -> bool {
        let name = normalize(name);
        let included = self.include.is_empty()
            || self.include.iter().any(|s| is_within(&name, &normalize(s)));
        included && !self.exclude.iter().any(|s| is_within(&name, &normalize(s)))
    }
}

fn clean<I, S>(entries: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    entries
        .into_iter()
        .map(|s| s.into().trim().to_string())
        .filter(|s| !s.is_empty() && s != ".")
        .collect()
}

fn normalize(name: &str) -> String {
    name.trim()
        .strip_suffix('.')
        .unwrap_or(name.trim())
        .to_ascii_lowercase()
}

/// `name` equals `suffix` or ends with `.suffix`.
fn is_within(name: &str, suffix: &str) -> bool {
    if suffix.is_empty() {
        return true;
    }
    name == suffix
        || name
            .strip_suffix(suffix)
            .is_some_and(|head| head.ends_with('.'))
}
