//! EdgeCenter API wire types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{ProviderRecord, ProviderZone};

/// `GET /v2/zones`
#[derive(Debug, Deserialize)]
pub struct ZonesResponse {
    #[serde(default)]
    pub zones: Vec<EdgecenterZone>,
}

/// Zone summary or full zone (`GET /v2/zones/{zone}` fills `records`).
#[derive(Debug, Deserialize)]
pub struct EdgecenterZone {
    pub name: String,
    #[serde(default)]
    pub records: Vec<ZoneRecord>,
}

#[derive(Debug, Deserialize)]
pub struct ZoneRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(default)]
    pub ttl: u32,
    #[serde(default)]
    pub short_answers: Vec<String>,
}

impl From<EdgecenterZone> for ProviderZone {
    fn from(zone: EdgecenterZone) -> Self {
        Self {
            name: zone.name,
            records: zone
                .records
                .into_iter()
                .map(|r| ProviderRecord::new(r.name, r.record_type, r.ttl, r.short_answers))
                .collect(),
        }
    }
}

/// Request and response body of `/v2/zones/{zone}/{name}/{type}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RrSet {
    #[serde(default)]
    pub ttl: u32,
    #[serde(default)]
    pub resource_records: Vec<ResourceRecord>,
}

impl RrSet {
    pub fn new(ttl: u32, resource_records: Vec<ResourceRecord>) -> Self {
        Self {
            ttl,
            resource_records,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Content split into fields, e.g. `[10, "mail.example.com"]` for MX.
    pub content: Vec<Value>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

fn default_enabled() -> bool {
    true
}

impl ResourceRecord {
    /// Split a presentation-format value into API content fields.
    ///
    /// MX, SRV and CAA carry leading numeric fields; everything else is sent
    /// as a single string.
    pub fn from_presentation(record_type: &str, value: &str) -> Self {
        let numeric_fields = match record_type.to_ascii_uppercase().as_str() {
            "MX" => 1,
            "SRV" => 3,
            "CAA" => 1,
            _ => 0,
        };

        let content = if numeric_fields == 0 {
            vec![Value::String(value.to_string())]
        } else {
            split_fields(value, numeric_fields)
        };

        Self {
            content,
            enabled: true,
            meta: None,
        }
    }

    /// Join the content fields back into presentation format.
    pub fn presentation(&self) -> String {
        self.content
            .iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Parse up to `numeric` leading whitespace-separated integers; the rest of the
/// value stays text. Falls back to a single string when a field is not numeric.
fn split_fields(value: &str, numeric: usize) -> Vec<Value> {
    let mut content = Vec::with_capacity(numeric + 1);
    let mut rest = value.trim();

    for _ in 0..numeric {
        let (head, tail) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        match head.parse::<u64>() {
            Ok(n) => content.push(Value::from(n)),
            Err(_) => return vec![Value::String(value.to_string())],
        }
        rest = tail.trim_start();
    }

    // CAA: flags tag "value"
    if let Some((tag, caa_value)) = caa_tag_value(rest) {
        content.push(Value::String(tag.to_string()));
        content.push(Value::String(caa_value.to_string()));
        return content;
    }

    content.push(Value::String(rest.to_string()));
    content
}

fn caa_tag_value(rest: &str) -> Option<(&str, &str)> {
    let (tag, value) = rest.split_once(char::is_whitespace)?;
    let value = value.trim();
    if tag.chars().all(|c| c.is_ascii_alphanumeric()) && value.starts_with('"') {
        Some((tag, value.trim_matches('"')))
    } else {
        None
    }
}

/// Error body: `{"error": "..."}`
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_value_is_single_string() {
        let rr = ResourceRecord::from_presentation("A", "1.2.3.4");
        assert_eq!(rr.content, vec![Value::from("1.2.3.4")]);
        assert_eq!(rr.presentation(), "1.2.3.4");
    }

    #[test]
    fn mx_splits_priority() {
        let rr = ResourceRecord::from_presentation("MX", "10 mail.example.com");
        assert_eq!(
            rr.content,
            vec![Value::from(10_u64), Value::from("mail.example.com")]
        );
        assert_eq!(rr.presentation(), "10 mail.example.com");
    }

    #[test]
    fn srv_splits_three_numbers() {
        let rr = ResourceRecord::from_presentation("srv", "1 5 5060 sip.example.com");
        assert_eq!(rr.content.len(), 4);
        assert_eq!(rr.content[2], Value::from(5060_u64));
        assert_eq!(rr.presentation(), "1 5 5060 sip.example.com");
    }

    #[test]
    fn caa_splits_tag_and_value() {
        let rr = ResourceRecord::from_presentation("CAA", "0 issue \"letsencrypt.org\"");
        assert_eq!(
            rr.content,
            vec![
                Value::from(0_u64),
                Value::from("issue"),
                Value::from("letsencrypt.org")
            ]
        );
    }

    #[test]
    fn malformed_mx_kept_verbatim() {
        let rr = ResourceRecord::from_presentation("MX", "mail.example.com");
        assert_eq!(rr.content, vec![Value::from("mail.example.com")]);
    }

    #[test]
    fn txt_with_spaces_not_split() {
        let rr = ResourceRecord::from_presentation("TXT", "v=spf1 include:example.com ~all");
        assert_eq!(rr.content.len(), 1);
    }

    #[test]
    fn rrset_body_shape() {
        let body = RrSet::new(300, vec![ResourceRecord::from_presentation("A", "1.1.1.1")]);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["ttl"], 300);
        assert_eq!(json["resource_records"][0]["content"][0], "1.1.1.1");
        assert_eq!(json["resource_records"][0]["enabled"], true);
        assert!(json["resource_records"][0].get("meta").is_none());
    }

    #[test]
    fn zone_converts_to_provider_zone() {
        let json = r#"{"name":"example.com","records":[
            {"name":"www.example.com","type":"A","ttl":60,"short_answers":["1.1.1.1"]}
        ]}"#;
        let zone: EdgecenterZone = serde_json::from_str(json).unwrap();
        let zone: ProviderZone = zone.into();
        assert_eq!(zone.name, "example.com");
        assert_eq!(zone.records[0].short_answers, vec!["1.1.1.1"]);
    }
}
