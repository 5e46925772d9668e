// API Response Models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Cadence lookup response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CadenceResponse {
    /// Canonical token; unknown tokens resolve to `1h`
    pub token: String,
    pub interval_seconds: i64,
    pub next_check_at: DateTime<Utc>,
}
