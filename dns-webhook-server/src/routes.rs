//! ExternalDNS webhook routes
//!
//! - `GET /healthz`: liveness
//! - `GET /`: negotiation, returns the domain filter
//! - `GET /records`: current records
//! - `POST /records`: apply a change set
//! - `POST /adjustendpoints`: drop endpoints the provider won't keep

use std::sync::Arc;

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use dns_webhook_core::{ChangeSet, Record, RecordService, RequestContext};
use serde::Serialize;
use tracing::{Instrument, Span, debug, error, info, warn};

use crate::error::ApiError;
use crate::media::{WEBHOOK_MEDIA_TYPE, negotiate};
use crate::state::AppState;

/// Change sets for large clusters easily exceed actix's 256 KiB default.
const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(MAX_BODY_BYTES))
        .service(web::resource("/healthz").route(web::get().to(healthz)))
        .service(web::resource("/").route(web::get().to(negotiate_filter)))
        .service(
            web::resource("/records")
                .route(web::get().to(get_records))
                .route(web::post().to(apply_changes)),
        )
        .service(web::resource("/adjustendpoints").route(web::post().to(adjust_endpoints)));
}

/// Fresh trace id for the request plus a child span with method and path.
fn traced(req: &HttpRequest) -> (RequestContext, Span) {
    let ctx = RequestContext::new();
    let span = tracing::info_span!(
        parent: ctx.span(),
        "http",
        method = %req.method(),
        url = %req.path()
    );
    (ctx, span)
}

fn webhook_json<T: Serialize>(value: &T) -> Result<HttpResponse, ApiError> {
    let body = serde_json::to_vec(value).map_err(|e| {
        error!(error = %e, "failed to encode response");
        ApiError::Internal
    })?;
    Ok(HttpResponse::Ok()
        .content_type(WEBHOOK_MEDIA_TYPE)
        .insert_header((header::VARY, "Content-Type"))
        .body(body))
}

fn check_headers(req: &HttpRequest) -> Result<(), ApiError> {
    negotiate(req).map_err(|e| {
        error!(error = %e, "failed header check");
        ApiError::from(e)
    })
}

async fn healthz() -> HttpResponse {
    HttpResponse::Ok().finish()
}

async fn negotiate_filter(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let (ctx, span) = traced(&req);
    async move {
        debug!("GET /");
        check_headers(&req)?;
        let filter = state.records.domain_filter(&ctx, &state.domain_filter).await;
        webhook_json(&filter)
    }
    .instrument(span)
    .await
}

async fn get_records(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let (ctx, span) = traced(&req);
    async move {
        debug!("GET /records");
        check_headers(&req)?;
        let records = state
            .records
            .records(&ctx, &state.domain_filter)
            .await
            .map_err(|e| {
                error!(error = %e, "failed to get records from provider");
                ApiError::Internal
            })?;
        info!("found {} records", records.len());
        webhook_json(&records)
    }
    .instrument(span)
    .await
}

async fn apply_changes(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let (ctx, span) = traced(&req);
    async move {
        info!("POST /records");
        check_headers(&req)?;

        let changes: ChangeSet = serde_json::from_slice(&body).map_err(|e| {
            warn!(error = %e, "failed to decode changes");
            ApiError::Decode(format!("failed to decode changes: {e}"))
        })?;

        // Runs detached: a client disconnect does not stop the apply, the deadline does.
        let ctx = ctx.with_cancel(state.apply_cancel());
        let service = Arc::clone(&state.apply);
        let joined = tokio::spawn(
            async move { service.apply(&ctx, &changes).await }.in_current_span(),
        )
        .await;

        match joined {
            Ok(Ok(())) => Ok(HttpResponse::NoContent().finish()),
            Ok(Err(e)) => {
                error!(error = %e, "failed to apply changes");
                Err(ApiError::Internal)
            }
            Err(e) => {
                error!(error = %e, "apply task aborted");
                Err(ApiError::Internal)
            }
        }
    }
    .instrument(span)
    .await
}

async fn adjust_endpoints(
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let (_ctx, span) = traced(&req);
    async move {
        info!("POST /adjustendpoints");
        check_headers(&req)?;

        let endpoints: Option<Vec<Record>> = serde_json::from_slice(&body).map_err(|e| {
            warn!(error = %e, "failed to decode endpoints for adjustment");
            ApiError::Decode(format!("failed to decode endpoints for adjustment: {e}"))
        })?;

        let adjusted = RecordService::adjust_endpoints(endpoints.unwrap_or_default());
        webhook_json(&adjusted)
    }
    .instrument(span)
    .await
}

#[cfg(test)]
#[path = "test_mocks.rs"]
#[allow(clippy::unwrap_used, clippy::panic)]
pub(crate) mod test_mocks;

#[cfg(test)]
#[path = "routes_tests.rs"]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests;
