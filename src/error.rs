// Error types for certwarden
//
// Every failure the core can report is a variant of WardenError. Each variant
// carries a stable machine-readable code so callers (CLI, HTTP API, external
// schedulers) can react to a specific failure without parsing messages.

use std::time::Duration;
use thiserror::Error;

/// Why a check was refused by the plan gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialExhaustedReason {
    /// The one free check has already been used
    TrialConsumed,
    /// The paid license is past its expiry
    LicenseExpired,
    /// The plan service refused another domain on this plan
    SiteLimitReached,
}

impl std::fmt::Display for TrialExhaustedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrialExhaustedReason::TrialConsumed => write!(f, "free check already used"),
            TrialExhaustedReason::LicenseExpired => write!(f, "license expired"),
            TrialExhaustedReason::SiteLimitReached => write!(f, "plan site limit reached"),
        }
    }
}

/// Main error type for certwarden operations
#[derive(Debug, Error)]
pub enum WardenError {
    /// Bad URL, bad email list, unknown team or other caller input.
    /// Always raised before any network call.
    #[error("Invalid input: {message}")]
    InputValidation { message: String },

    /// DNS, TCP connect, TLS handshake or timeout failure while probing
    #[error("Connection to {host}:{port} failed: {details}")]
    Connection {
        host: String,
        port: u16,
        details: String,
    },

    /// Probe timed out as a whole
    #[error("Connection to {host}:{port} timed out after {duration:?}")]
    ConnectionTimeout {
        host: String,
        port: u16,
        duration: Duration,
    },

    /// Peer completed the handshake without presenting a certificate chain
    #[error("No certificate presented by {host}:{port}")]
    NoCertificate { host: String, port: u16 },

    /// Certificate PEM/DER could not be parsed
    #[error("Certificate parsing error: {details}")]
    CertificateParse { details: String },

    /// Private key PEM could not be parsed
    #[error("Private key parsing error: {details}")]
    KeyParse { details: String },

    /// The plan gate refused the check
    #[error("Check refused: {reason}. Upgrade to a paid plan to continue")]
    TrialExhausted { reason: TrialExhaustedReason },

    /// An external collaborator (plan store, persistence service) failed
    #[error("{collaborator} request failed{}: {message}", status_suffix(.status))]
    Upstream {
        collaborator: String,
        status: Option<u16>,
        message: String,
    },
}

fn status_suffix(status: &Option<u16>) -> String {
    status
        .map(|s| format!(" (status {})", s))
        .unwrap_or_default()
}

impl WardenError {
    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            WardenError::InputValidation { .. } => "INPUT_VALIDATION",
            WardenError::Connection { .. } | WardenError::ConnectionTimeout { .. } => {
                "CONNECTION_ERROR"
            }
            WardenError::NoCertificate { .. } => "NO_CERTIFICATE",
            WardenError::CertificateParse { .. } => "CERTIFICATE_PARSE_ERROR",
            WardenError::KeyParse { .. } => "KEY_PARSE_ERROR",
            WardenError::TrialExhausted { .. } => "TRIAL_EXHAUSTED",
            WardenError::Upstream { .. } => "UPSTREAM_ERROR",
        }
    }

    /// Shorthand for an input validation error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        WardenError::InputValidation {
            message: message.into(),
        }
    }

    /// Shorthand for an upstream failure
    pub fn upstream(
        collaborator: impl Into<String>,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        WardenError::Upstream {
            collaborator: collaborator.into(),
            status,
            message: message.into(),
        }
    }

    /// True for errors caused by the probe (network side)
    pub fn is_probe_failure(&self) -> bool {
        matches!(
            self,
            WardenError::Connection { .. }
                | WardenError::ConnectionTimeout { .. }
                | WardenError::NoCertificate { .. }
        )
    }
}

impl From<crate::security::input_validation::ValidationError> for WardenError {
    fn from(err: crate::security::input_validation::ValidationError) -> Self {
        WardenError::InputValidation {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for WardenError {
    fn from(err: reqwest::Error) -> Self {
        WardenError::Upstream {
            collaborator: "engine".to_string(),
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}
