// API Error Models

use crate::error::WardenError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// API Error Response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// HTTP status code
    pub status: u16,

    /// Error code
    pub error: String,

    /// Error message
    pub message: String,

    /// Optional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// API Error Types
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error(transparent)]
    Warden(#[from] WardenError),
}

impl ApiError {
    /// Convert to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Warden(err) => warden_status(err),
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Internal(_) => "INTERNAL_ERROR",
            ApiError::Warden(err) => err.code(),
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            ApiError::Warden(WardenError::TrialExhausted { reason }) => Some(reason.to_string()),
            ApiError::Warden(WardenError::Upstream { collaborator, .. }) => {
                Some(format!("collaborator: {}", collaborator))
            }
            ApiError::Warden(
                WardenError::Connection { host, port, .. }
                | WardenError::ConnectionTimeout { host, port, .. }
                | WardenError::NoCertificate { host, port },
            ) => Some(format!("target: {}:{}", host, port)),
            _ => None,
        }
    }
}

fn warden_status(err: &WardenError) -> StatusCode {
    match err {
        WardenError::InputValidation { .. }
        | WardenError::CertificateParse { .. }
        | WardenError::KeyParse { .. } => StatusCode::BAD_REQUEST,
        WardenError::TrialExhausted { .. } => StatusCode::FORBIDDEN,
        WardenError::Connection { .. }
        | WardenError::ConnectionTimeout { .. }
        | WardenError::NoCertificate { .. } => StatusCode::BAD_GATEWAY,
        WardenError::Upstream { status, .. } => status
            .filter(|s| (400..600).contains(s))
            .and_then(|s| StatusCode::from_u16(s).ok())
            .unwrap_or(StatusCode::BAD_GATEWAY),
    }
}

impl ApiErrorResponse {
    /// Create new error response
    pub fn new(status: StatusCode, error: &str, message: String) -> Self {
        Self {
            status: status.as_u16(),
            error: error.to_string(),
            message,
            details: None,
        }
    }

    /// Create with details
    pub fn with_details(mut self, details: String) -> Self {
        self.details = Some(details);
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let mut body = ApiErrorResponse::new(status, self.error_code(), self.to_string());
        if let Some(details) = self.details() {
            body = body.with_details(details);
        }

        (status, Json(body)).into_response()
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

// Conversion from anyhow::Error
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrialExhaustedReason;

    #[test]
    fn test_warden_error_status_mapping() {
        let cases = [
            (WardenError::invalid_input("bad url"), StatusCode::BAD_REQUEST),
            (
                WardenError::KeyParse {
                    details: "x".to_string(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                WardenError::TrialExhausted {
                    reason: TrialExhaustedReason::TrialConsumed,
                },
                StatusCode::FORBIDDEN,
            ),
            (
                WardenError::NoCertificate {
                    host: "h".to_string(),
                    port: 443,
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                WardenError::upstream("persistence", Some(403), "FREE_LIMIT_REACHED"),
                StatusCode::FORBIDDEN,
            ),
            (
                WardenError::upstream("plan", Some(302), "redirect"),
                StatusCode::BAD_GATEWAY,
            ),
            (
                WardenError::upstream("plan", None, "connection refused"),
                StatusCode::BAD_GATEWAY,
            ),
        ];

        for (err, expected) in cases {
            let code = err.code();
            let api = ApiError::from(err);
            assert_eq!(api.status_code(), expected, "code {}", code);
            assert_eq!(api.error_code(), code);
        }
    }

    #[test]
    fn test_trial_exhausted_details() {
        let api = ApiError::from(WardenError::TrialExhausted {
            reason: TrialExhaustedReason::LicenseExpired,
        });
        assert_eq!(api.details().as_deref(), Some("license expired"));
    }
}
