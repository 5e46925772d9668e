//! Input Validation Module
//!
//! Validates caller input before any network call is made: check URLs,
//! hostnames, ports and email addresses.

use lazy_static::lazy_static;
use regex::Regex;
use std::net::IpAddr;
use url::Url;

/// Maximum length for hostname (RFC 1035)
const MAX_HOSTNAME_LENGTH: usize = 253;

/// Maximum length for label in hostname (RFC 1035)
const MAX_LABEL_LENGTH: usize = 63;

/// Maximum length for an email address (RFC 5321 path limit)
const MAX_EMAIL_LENGTH: usize = 254;

lazy_static! {
    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?)*\.[A-Za-z]{2,}$")
            .expect("email pattern is a valid regex");
}

/// Validation error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    InvalidUrl(String),
    InvalidScheme(String),
    InvalidHostname(String),
    InvalidPort(String),
    InvalidEmail(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            Self::InvalidScheme(msg) => write!(f, "Unsupported URL scheme: {}", msg),
            Self::InvalidHostname(msg) => write!(f, "Invalid hostname: {}", msg),
            Self::InvalidPort(msg) => write!(f, "Invalid port: {}", msg),
            Self::InvalidEmail(msg) => write!(f, "Invalid email address: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Host and port extracted from a check URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckTarget {
    pub hostname: String,
    pub port: u16,
}

/// Validate a check URL and extract the probe target
///
/// The URL must parse and use the `http` or `https` scheme. The domain is the
/// URL hostname. An explicit port is honoured unless it is the scheme's
/// default; `http://` URLs without an explicit port are probed on 443 since
/// only the TLS endpoint carries a certificate.
pub fn validate_check_url(
    input: &str,
    default_port: u16,
) -> std::result::Result<CheckTarget, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::InvalidUrl("URL cannot be empty".to_string()));
    }

    let url = Url::parse(trimmed).map_err(|e| ValidationError::InvalidUrl(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(ValidationError::InvalidScheme(other.to_string())),
    }

    let host = url
        .host_str()
        .ok_or_else(|| ValidationError::InvalidUrl("URL has no hostname".to_string()))?;

    // Url keeps IPv6 literals bracketed
    let hostname = host
        .trim_start_matches('[')
        .trim_end_matches(']')
        .to_ascii_lowercase();

    validate_hostname(&hostname)?;

    // url::Url::port() is None when the port equals the scheme default
    let port = url.port().unwrap_or(default_port);
    validate_port(port)?;

    Ok(CheckTarget { hostname, port })
}

/// Turn loose CLI input (`example.com`, `example.com:8443`) into a URL
///
/// Input that already carries a scheme is returned unchanged so the URL
/// validator can reject unsupported schemes itself.
pub fn normalize_target_input(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Validate hostname according to RFC 1035 and RFC 1123
pub fn validate_hostname(hostname: &str) -> std::result::Result<(), ValidationError> {
    if hostname.is_empty() {
        return Err(ValidationError::InvalidHostname(
            "Hostname cannot be empty".to_string(),
        ));
    }

    if hostname.len() > MAX_HOSTNAME_LENGTH {
        return Err(ValidationError::InvalidHostname(format!(
            "Hostname too long (max {} characters)",
            MAX_HOSTNAME_LENGTH
        )));
    }

    if hostname.parse::<IpAddr>().is_ok() {
        return Ok(());
    }

    // A single trailing dot denotes the DNS root and is allowed
    let hostname = hostname.strip_suffix('.').unwrap_or(hostname);

    for label in hostname.split('.') {
        if label.is_empty() || label.len() > MAX_LABEL_LENGTH {
            return Err(ValidationError::InvalidHostname(format!(
                "Label '{}' has invalid length (must be 1-{} characters)",
                label, MAX_LABEL_LENGTH
            )));
        }

        let last = label.len() - 1;
        for (i, ch) in label.chars().enumerate() {
            // Underscores show up in real-world service names
            let is_valid = ch.is_ascii_alphanumeric()
                || ch == '_'
                || (ch == '-' && i != 0 && i != last);
            if !is_valid {
                return Err(ValidationError::InvalidHostname(format!(
                    "Label '{}' contains invalid character or invalid position for hyphen",
                    label
                )));
            }
        }
    }

    Ok(())
}

/// Validate port number (1-65535)
pub fn validate_port(port: u16) -> std::result::Result<(), ValidationError> {
    if port == 0 {
        return Err(ValidationError::InvalidPort(
            "Port must be between 1 and 65535".to_string(),
        ));
    }
    Ok(())
}

/// Validate a single, already trimmed email address
pub fn validate_email(address: &str) -> std::result::Result<(), ValidationError> {
    if address.is_empty() {
        return Err(ValidationError::InvalidEmail(
            "Address cannot be empty".to_string(),
        ));
    }

    if address.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::InvalidEmail(format!(
            "Address too long (max {} characters)",
            MAX_EMAIL_LENGTH
        )));
    }

    if !EMAIL_PATTERN.is_match(address) {
        return Err(ValidationError::InvalidEmail(address.to_string()));
    }

    Ok(())
}
