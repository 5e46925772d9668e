// Key Match Route

use crate::api::{
    models::{error::ApiError, request::MatchKeyRequest},
    state::AppState,
};
use crate::certificates::KeyMatchReport;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use chrono::Utc;
use std::sync::Arc;

/// Subject id used when the caller does not send one
const DEFAULT_SUBJECT_ID: &str = "certificate";

/// Check whether a private key belongs to a certificate
///
/// POST /api/v1/match-key. Unparseable PEM input is reported in the body as
/// `{matches: false, error}` rather than as an HTTP error.
pub async fn match_key(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MatchKeyRequest>, JsonRejection>,
) -> Result<Json<KeyMatchReport>, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let subject_id = body
        .subject_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SUBJECT_ID);

    let report = state.key_matcher.report(
        subject_id,
        &body.certificate_pem,
        &body.private_key_pem,
        Utc::now(),
    );

    Ok(Json(report))
}
