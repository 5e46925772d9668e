// Plan Status Route

use crate::api::{middleware::AuthExtension, models::error::ApiError, state::AppState};
use crate::plan::PlanSummary;
use axum::{Extension, Json, extract::State};
use std::sync::Arc;

/// Plan summary of the caller's identity
///
/// GET /api/v1/plan/status
pub async fn plan_status(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthExtension>,
) -> Result<Json<PlanSummary>, ApiError> {
    let summary = state.checker.plan_status(&auth.identity).await?;
    Ok(Json(summary))
}
