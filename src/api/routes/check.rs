// Certificate Check Route

use crate::api::{
    config::Permission,
    middleware::{AuthExtension, check_permission},
    models::{error::ApiError, request::CheckCertRequest},
    state::AppState,
};
use crate::checker::{CheckReport, CheckRequest};
use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use std::sync::Arc;

/// Run a certificate check for the caller's plan identity
///
/// POST /api/v1/check-cert
pub async fn check_certificate(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthExtension>,
    payload: Result<Json<CheckCertRequest>, JsonRejection>,
) -> Result<Json<CheckReport>, ApiError> {
    check_permission(Permission::User, auth.permission)?;
    let Json(body) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let request = CheckRequest {
        identity: auth.identity,
        url: body.url,
        team_id: body.team_id,
        custom_emails: body.custom_emails,
        custom_alert_days: body.custom_alert_days,
        cadence: body.check_frequency,
    };

    let report = state.checker.check(&request).await?;
    Ok(Json(report))
}
