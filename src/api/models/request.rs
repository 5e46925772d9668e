// API Request Models

use serde::{Deserialize, Serialize};

/// Certificate check payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckCertRequest {
    /// URL of the site to check (`https://example.com`)
    pub url: String,

    /// Team whose alert defaults apply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,

    /// Comma-separated recipients overriding the team's
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_emails: Option<String>,

    /// Alert threshold in days overriding the team's
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_alert_days: Option<u32>,

    /// Re-check cadence token (`1h`, `daily`, `weekly`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_frequency: Option<String>,
}

/// Key match payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchKeyRequest {
    pub certificate_pem: String,
    pub private_key_pem: String,

    /// Caller's id for the certificate; echoed back in the result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
}
