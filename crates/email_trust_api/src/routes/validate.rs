//! Email validation route handler

use crate::{api_handler::*, AppState};
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use email_trust_core::{
    syntax::{is_valid_email, normalize_email},
    EmailAnalysis,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// POST /validate with body `{"email": "user@example.com"}`
///
/// Checks the address shape, then runs the full domain analysis:
/// - MX, SPF and DMARC lookups (concurrent)
/// - Disposable domain detection
/// - MX host geolocation
/// - Verdict
///
/// Upstream failures never fail the request; they only weaken the verdict.
#[instrument(skip(state, payload), fields(request_id))]
pub async fn validate_email_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ValidateRequest>, JsonRejection>,
) -> ApiResult<EmailAnalysis> {
    let request_id = Uuid::new_v4().to_string();
    tracing::Span::current().record("request_id", request_id.as_str());

    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected request body: {}", rejection.body_text());
        ApiError::InvalidRequest
    })?;

    if request.email.is_empty() {
        warn!("Empty email provided");
        return Err(ApiError::EmptyEmail);
    }

    info!("Received email for validation: {}", request.email);

    let email = normalize_email(&request.email);
    if !is_valid_email(&email) {
        warn!("Email failed format check: {}", email);
        return Err(ApiError::InvalidEmail);
    }

    let start_time = std::time::Instant::now();
    let analysis = state.analyzer.analyze(&email).await;

    info!(
        "Email analysis completed in {:?}: {} -> {}",
        start_time.elapsed(),
        analysis.domain(),
        analysis.verdict()
    );

    Ok(Json(analysis))
}
