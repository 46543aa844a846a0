//! DNS record model, serialized as an ExternalDNS endpoint

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::null_as_default;

/// DNS record type.
///
/// Parsing is case-insensitive; display is upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
#[allow(clippy::upper_case_acronyms)]
pub enum RecordType {
    A,
    AAAA,
    CNAME,
    TXT,
    MX,
    NS,
    SRV,
    PTR,
    NAPTR,
    CAA,
    Other(String),
}

impl RecordType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::A => "A",
            Self::AAAA => "AAAA",
            Self::CNAME => "CNAME",
            Self::TXT => "TXT",
            Self::MX => "MX",
            Self::NS => "NS",
            Self::SRV => "SRV",
            Self::PTR => "PTR",
            Self::NAPTR => "NAPTR",
            Self::CAA => "CAA",
            Self::Other(s) => s,
        }
    }

    /// Types ExternalDNS manages; only these take part in the read path.
    pub fn is_supported(&self) -> bool {
        matches!(
            self,
            Self::A
                | Self::AAAA
                | Self::CNAME
                | Self::TXT
                | Self::MX
                | Self::NS
                | Self::SRV
                | Self::PTR
                | Self::NAPTR
        )
    }

    /// Types whose values are (or end with) a host name.
    pub fn has_hostname_values(&self) -> bool {
        matches!(
            self,
            Self::CNAME | Self::NS | Self::MX | Self::SRV | Self::PTR
        )
    }

    /// Comparison key of a value: host names lose a single trailing dot and
    /// are ASCII lower-cased, everything else is compared verbatim.
    pub fn normalize_value(&self, value: &str) -> String {
        if self.has_hostname_values() {
            value
                .strip_suffix('.')
                .unwrap_or(value)
                .to_ascii_lowercase()
        } else {
            value.to_string()
        }
    }
}

impl FromStr for RecordType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Ok(match upper.as_str() {
            "A" => Self::A,
            "AAAA" => Self::AAAA,
            "CNAME" => Self::CNAME,
            "TXT" => Self::TXT,
            "MX" => Self::MX,
            "NS" => Self::NS,
            "SRV" => Self::SRV,
            "PTR" => Self::PTR,
            "NAPTR" => Self::NAPTR,
            "CAA" => Self::CAA,
            _ => Self::Other(upper),
        })
    }
}

impl From<&str> for RecordType {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(t) => t,
            Err(never) => match never {},
        }
    }
}

impl From<String> for RecordType {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<RecordType> for String {
    fn from(t: RecordType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider specific key/value attached to an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSpecificProperty {
    pub name: String,
    pub value: String,
}

/// One RRSet: a named, typed set of values sharing a TTL.
///
/// `(name, record_type)` identifies the record within a zone. `targets`
/// compare as a set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(rename = "dnsName")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub targets: Vec<String>,
    pub record_type: RecordType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub set_identifier: String,
    #[serde(rename = "recordTTL", default, skip_serializing_if = "is_zero")]
    pub ttl: u32,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub labels: BTreeMap<String, String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub provider_specific: Vec<ProviderSpecificProperty>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(v: &u32) -> bool {
    *v == 0
}

impl Record {
    pub fn new<I, S>(
        name: impl Into<String>,
        record_type: impl Into<RecordType>,
        ttl: u32,
        targets: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            targets: targets.into_iter().map(Into::into).collect(),
            record_type: record_type.into(),
            set_identifier: String::new(),
            ttl,
            labels: BTreeMap::new(),
            provider_specific: Vec::new(),
        }
    }

    /// Same `(name, record_type)`. Names compare without a trailing dot,
    /// ignoring ASCII case.
    pub fn same_identity(&self, other: &Self) -> bool {
        self.record_type == other.record_type
            && trim_dot(&self.name).eq_ignore_ascii_case(trim_dot(&other.name))
    }
}

fn trim_dot(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_type_parse_is_case_insensitive() {
        assert_eq!(RecordType::from("cname"), RecordType::CNAME);
        assert_eq!(RecordType::from(" Aaaa "), RecordType::AAAA);
        assert_eq!(RecordType::from("sshfp"), RecordType::Other("SSHFP".to_string()));
        assert_eq!(RecordType::from("sshfp").to_string(), "SSHFP");
    }

    #[test]
    fn supported_types() {
        for t in ["A", "AAAA", "CNAME", "TXT", "MX", "NS", "SRV", "PTR", "NAPTR"] {
            assert!(RecordType::from(t).is_supported(), "{t}");
        }
        assert!(!RecordType::CAA.is_supported());
        assert!(!RecordType::from("SOA").is_supported());
    }

    #[test]
    fn hostname_values_are_normalized() {
        assert_eq!(
            RecordType::CNAME.normalize_value("Target.Example.COM."),
            "target.example.com"
        );
        assert_eq!(RecordType::TXT.normalize_value("Hello."), "Hello.");
        assert_eq!(RecordType::A.normalize_value("1.1.1.1"), "1.1.1.1");
    }

    #[test]
    fn endpoint_json_shape() {
        let record = Record::new("www.example.com", RecordType::A, 300, ["1.1.1.1"]);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "dnsName": "www.example.com",
                "targets": ["1.1.1.1"],
                "recordType": "A",
                "recordTTL": 300
            })
        );
    }

    #[test]
    fn endpoint_json_with_metadata() {
        let json = r#"{
            "dnsName": "txt.example.com",
            "targets": null,
            "recordType": "txt",
            "setIdentifier": "eu",
            "labels": {"owner": "default"},
            "providerSpecific": [{"name": "alias", "value": "false"}]
        }"#;
        let record: Record = serde_json::from_str(json).unwrap();
        assert!(record.targets.is_empty());
        assert_eq!(record.record_type, RecordType::TXT);
        assert_eq!(record.ttl, 0);
        assert_eq!(record.set_identifier, "eu");
        assert_eq!(record.labels["owner"], "default");
        assert_eq!(record.provider_specific[0].name, "alias");
    }

    #[test]
    fn identity_ignores_trailing_dot_and_case() {
        let a = Record::new("My.Test.com.", RecordType::A, 0, ["1.1.1.1"]);
        let b = Record::new("my.test.com", RecordType::A, 0, Vec::<String>::new());
        let c = Record::new("my.test.com", RecordType::AAAA, 0, Vec::<String>::new());
        assert!(a.same_identity(&b));
        assert!(!a.same_identity(&c));
    }
}
