// Cadence Route

use crate::api::models::response::CadenceResponse;
use crate::monitor::cadence::CheckCadence;
use axum::{Json, extract::Path};
use chrono::Utc;

/// Interval for a cadence token
///
/// GET /api/v1/cadence/:token. Unknown tokens resolve to the hourly default.
pub async fn cadence(Path(token): Path<String>) -> Json<CadenceResponse> {
    let cadence = CheckCadence::from_token(&token);

    Json(CadenceResponse {
        token: cadence.token().to_string(),
        interval_seconds: cadence.interval().num_seconds(),
        next_check_at: cadence.next_check_at(Utc::now()),
    })
}
