//! EdgeCenter error mapping

use crate::error::ProviderError;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::{EdgecenterClient, PROVIDER_NAME};

/// EdgeCenter reports failures through the HTTP status plus `{"error": "..."}`.
impl ProviderErrorMapper for EdgecenterClient {
    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        match raw.status {
            401 => ProviderError::InvalidCredentials {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            403 => ProviderError::PermissionDenied {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            // A 404 on an RRSet path means the RRSet is missing; on a zone
            // path it means the zone is.
            404 => match (context.record, context.zone) {
                (Some(record), _) => ProviderError::RecordNotFound {
                    provider: self.provider_name().to_string(),
                    record,
                    raw_message: Some(raw.message),
                },
                (None, zone) => ProviderError::ZoneNotFound {
                    provider: self.provider_name().to_string(),
                    zone: zone.unwrap_or_else(|| "<unknown>".to_string()),
                    raw_message: Some(raw.message),
                },
            },

            400 | 422 => ProviderError::InvalidParameter {
                provider: self.provider_name().to_string(),
                param: context.record.map_or_else(|| "request".to_string(), |_| "rrset".to_string()),
                detail: raw.message,
            },

            _ => self.unknown_error(raw),
        }
    }
}
