use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::media::{HeaderError, TEXT_PLAIN};

/// Handler failure, rendered as the webhook protocol expects.
///
/// Client errors carry a plain-text explanation. Server errors carry no
/// body; details only go to the log.
#[derive(Debug)]
pub enum ApiError {
    Header(HeaderError),
    /// Request body could not be decoded.
    Decode(String),
    Internal,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Header(e) => write!(f, "{e}"),
            Self::Decode(msg) => write!(f, "{msg}"),
            Self::Internal => write!(f, "internal server error"),
        }
    }
}

impl From<HeaderError> for ApiError {
    fn from(e: HeaderError) -> Self {
        Self::Header(e)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Header(HeaderError::Missing(_)) | Self::Decode(_) => StatusCode::BAD_REQUEST,
            Self::Header(HeaderError::Unsupported(_)) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            Self::Internal => HttpResponse::build(self.status_code()).finish(),
            _ => HttpResponse::build(self.status_code())
                .content_type(TEXT_PLAIN)
                .body(self.to_string()),
        }
    }
}
