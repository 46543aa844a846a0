use serde::{Deserialize, Serialize};

/// Unified error type for all DNS client operations.
///
/// Each variant includes a `provider` field identifying which client produced the error,
/// plus variant-specific context. All variants are serializable for structured error reporting.
///
/// # Retryable Errors
///
/// The following variants represent transient failures that may succeed on retry:
/// - [`NetworkError`](Self::NetworkError): network connectivity issues
/// - [`Timeout`](Self::Timeout): request timed out
/// - [`RateLimited`](Self::RateLimited): API rate limit exceeded
///
/// The built-in HTTP client retries these with exponential backoff when
/// `max_retries` is non-zero. Nothing above the client retries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum ProviderError {
    /// A network-level error occurred (DNS resolution failure, connection refused, etc.).
    NetworkError {
        /// Provider that produced the error.
        provider: String,
        /// Error details.
        detail: String,
    },

    /// The API token is missing, invalid or expired.
    InvalidCredentials {
        /// Provider that produced the error.
        provider: String,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// The RRSet addressed by zone/name/type does not exist.
    RecordNotFound {
        /// Provider that produced the error.
        provider: String,
        /// `name/type` of the missing RRSet.
        record: String,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// A request parameter is invalid (bad TTL, malformed content, bad endpoint URL).
    InvalidParameter {
        /// Provider that produced the error.
        provider: String,
        /// Name of the invalid parameter.
        param: String,
        /// Description of what's wrong.
        detail: String,
    },

    /// The API rate limit has been exceeded (HTTP 429).
    RateLimited {
        /// Provider that produced the error.
        provider: String,
        /// Suggested wait time in seconds before retrying, if provided by the API.
        retry_after: Option<u64>,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// The HTTP request timed out.
    Timeout {
        /// Provider that produced the error.
        provider: String,
        /// Error details.
        detail: String,
    },

    /// The zone was not found.
    ZoneNotFound {
        /// Provider that produced the error.
        provider: String,
        /// Zone name that was not found.
        zone: String,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// The token lacks permission for the requested operation.
    PermissionDenied {
        /// Provider that produced the error.
        provider: String,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// Failed to parse the provider's API response.
    ParseError {
        /// Provider that produced the error.
        provider: String,
        /// Details about the parse failure.
        detail: String,
    },

    /// Failed to serialize a request body.
    SerializationError {
        /// Provider that produced the error.
        provider: String,
        /// Details about the serialization failure.
        detail: String,
    },

    /// An unrecognized error from the provider API.
    Unknown {
        /// Provider that produced the error.
        provider: String,
        /// Raw error code (HTTP status) from the API, if available.
        raw_code: Option<String>,
        /// Raw error message from the API.
        raw_message: String,
    },
}

impl ProviderError {
    /// Whether the error is expected behavior (bad input, missing resource),
    /// used to pick the log level.
    ///
    /// `true` should be logged at `warn`, `false` at `error`.
    /// **Update this method when adding variants.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials { .. }
                | Self::RecordNotFound { .. }
                | Self::InvalidParameter { .. }
                | Self::ZoneNotFound { .. }
                | Self::PermissionDenied { .. }
        )
    }

    /// Transient failure worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError { .. } | Self::Timeout { .. } | Self::RateLimited { .. }
        )
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError { provider, detail } => {
                write!(f, "[{provider}] Network error: {detail}")
            }
            Self::InvalidCredentials {
                provider,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{provider}] Invalid credentials: {msg}")
                } else {
                    write!(f, "[{provider}] Invalid credentials")
                }
            }
            Self::RecordNotFound {
                provider, record, ..
            } => {
                write!(f, "[{provider}] RRSet '{record}' not found")
            }
            Self::InvalidParameter {
                provider,
                param,
                detail,
            } => {
                write!(f, "[{provider}] Invalid parameter '{param}': {detail}")
            }
            Self::RateLimited {
                provider,
                retry_after,
                ..
            } => {
                if let Some(secs) = retry_after {
                    write!(f, "[{provider}] Rate limited (retry after {secs}s)")
                } else {
                    write!(f, "[{provider}] Rate limited")
                }
            }
            Self::Timeout { provider, detail } => {
                write!(f, "[{provider}] Request timeout: {detail}")
            }
            Self::ZoneNotFound {
                provider,
                zone,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{provider}] Zone '{zone}' not found: {msg}")
                } else {
                    write!(f, "[{provider}] Zone '{zone}' not found")
                }
            }
            Self::PermissionDenied {
                provider,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{provider}] Permission denied: {msg}")
                } else {
                    write!(f, "[{provider}] Permission denied")
                }
            }
            Self::ParseError { provider, detail } => {
                write!(f, "[{provider}] Parse error: {detail}")
            }
            Self::SerializationError { provider, detail } => {
                write!(f, "[{provider}] Serialization error: {detail}")
            }
            Self::Unknown {
                provider,
                raw_code,
                raw_message,
            } => {
                if let Some(code) = raw_code {
                    write!(f, "[{provider}] {raw_message} (code {code})")
                } else {
                    write!(f, "[{provider}] {raw_message}")
                }
            }
        }
    }
}

impl std::error::Error for ProviderError {}

/// Convenience type alias for `Result<T, ProviderError>`.
pub type Result<T> = std::result::Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_network_error() {
        let e = ProviderError::NetworkError {
            provider: "test".to_string(),
            detail: "connection refused".to_string(),
        };
        assert_eq!(e.to_string(), "[test] Network error: connection refused");
    }

    #[test]
    fn display_invalid_credentials_with_message() {
        let e = ProviderError::InvalidCredentials {
            provider: "edgecenter".to_string(),
            raw_message: Some("bad key".to_string()),
        };
        assert_eq!(e.to_string(), "[edgecenter] Invalid credentials: bad key");
    }

    #[test]
    fn display_record_not_found() {
        let e = ProviderError::RecordNotFound {
            provider: "edgecenter".to_string(),
            record: "www.example.com/A".to_string(),
            raw_message: None,
        };
        assert_eq!(
            e.to_string(),
            "[edgecenter] RRSet 'www.example.com/A' not found"
        );
    }

    #[test]
    fn display_zone_not_found_with_message() {
        let e = ProviderError::ZoneNotFound {
            provider: "edgecenter".to_string(),
            zone: "example.com".to_string(),
            raw_message: Some("zone is not found".to_string()),
        };
        assert_eq!(
            e.to_string(),
            "[edgecenter] Zone 'example.com' not found: zone is not found"
        );
    }

    #[test]
    fn display_rate_limited_with_retry() {
        let e = ProviderError::RateLimited {
            provider: "edgecenter".to_string(),
            retry_after: Some(7),
            raw_message: None,
        };
        assert_eq!(e.to_string(), "[edgecenter] Rate limited (retry after 7s)");
    }

    #[test]
    fn display_unknown_with_code() {
        let e = ProviderError::Unknown {
            provider: "edgecenter".to_string(),
            raw_code: Some("418".to_string()),
            raw_message: "teapot".to_string(),
        };
        assert_eq!(e.to_string(), "[edgecenter] teapot (code 418)");
    }

    #[test]
    fn serialize_carries_code_tag() {
        let e = ProviderError::Timeout {
            provider: "edgecenter".to_string(),
            detail: "30s".to_string(),
        };
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["code"], "Timeout");
        assert_eq!(json["detail"], "30s");
    }

    #[test]
    fn expected_and_retryable_are_disjoint() {
        let variants = [
            ProviderError::NetworkError {
                provider: "t".into(),
                detail: "d".into(),
            },
            ProviderError::Timeout {
                provider: "t".into(),
                detail: "d".into(),
            },
            ProviderError::RateLimited {
                provider: "t".into(),
                retry_after: None,
                raw_message: None,
            },
            ProviderError::ZoneNotFound {
                provider: "t".into(),
                zone: "z".into(),
                raw_message: None,
            },
            ProviderError::InvalidCredentials {
                provider: "t".into(),
                raw_message: None,
            },
        ];
        for e in &variants {
            assert!(!(e.is_expected() && e.is_retryable()), "{e:?}");
        }
        assert!(variants[0].is_retryable());
        assert!(variants[3].is_expected());
    }
}
