//! Webhook media type negotiation

use actix_web::HttpRequest;
use actix_web::http::{Method, header};

/// The only media type the webhook protocol speaks.
pub const WEBHOOK_MEDIA_TYPE: &str = "application/external.dns.webhook+json;version=1";
pub const TEXT_PLAIN: &str = "text/plain";

/// Header problems are answered before any provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderError {
    /// 400
    Missing(&'static str),
    /// 415
    Unsupported(&'static str),
}

impl std::fmt::Display for HeaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(name) => write!(f, "'{name}' header is required"),
            Self::Unsupported(name) => {
                write!(f, "valid media type is required in '{name}' header")
            }
        }
    }
}

impl std::error::Error for HeaderError {}

/// POST requests must declare the webhook media type in `Content-Type`,
/// everything else must ask for it in `Accept`.
pub fn negotiate(req: &HttpRequest) -> Result<(), HeaderError> {
    let (name, key) = if *req.method() == Method::POST {
        ("Content-Type", header::CONTENT_TYPE)
    } else {
        ("Accept", header::ACCEPT)
    };

    let value = req
        .headers()
        .get(key)
        .map(|v| v.to_str().unwrap_or_default().trim())
        .unwrap_or_default();
    tracing::debug!(header = value, "start validating header");

    if value.is_empty() {
        return Err(HeaderError::Missing(name));
    }
    if value != WEBHOOK_MEDIA_TYPE {
        return Err(HeaderError::Unsupported(name));
    }
    Ok(())
}
