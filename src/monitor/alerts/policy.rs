// Alert Policy - Resolve who is alerted and how early
//
// Resolution order, field by field: system default, then team defaults, then
// per-request overrides.

use crate::Result;
use crate::error::WardenError;
use crate::security::validate_email;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Threshold used when neither team nor request sets one
pub const DEFAULT_THRESHOLD_DAYS: u32 = 10;

/// Largest accepted alert threshold
pub const MAX_THRESHOLD_DAYS: u32 = 3650;

/// Alert threshold and recipients for one check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertPolicy {
    pub threshold_days: u32,
    /// Validated addresses, first-seen order, unique case-insensitively
    pub recipients: Vec<String>,
}

impl AlertPolicy {
    /// System default: 10 days, nobody to notify
    pub fn system_default() -> Self {
        Self {
            threshold_days: DEFAULT_THRESHOLD_DAYS,
            recipients: Vec::new(),
        }
    }

    /// Whether anyone would be notified
    pub fn has_recipients(&self) -> bool {
        !self.recipients.is_empty()
    }
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self::system_default()
    }
}

/// Alert defaults configured for a team
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TeamDefaults {
    pub team_id: String,
    #[serde(default)]
    pub alert_days: Option<u32>,
    #[serde(default)]
    pub emails: Vec<String>,
}

/// Per-request overrides, as received from the caller
#[derive(Debug, Clone, Copy, Default)]
pub struct AlertOverrides<'a> {
    pub alert_days: Option<u32>,
    /// Comma-separated address list
    pub emails: Option<&'a str>,
}

/// Normalize a sequence of candidate addresses
///
/// Entries are trimmed; blanks, invalid addresses and case-insensitive
/// duplicates are dropped. The first spelling seen is kept.
pub fn normalize_email_iter<'a, I>(candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    let mut recipients = Vec::new();

    for candidate in candidates {
        let address = candidate.trim();
        if address.is_empty() {
            continue;
        }

        if let Err(e) = validate_email(address) {
            tracing::warn!("Ignoring alert recipient: {}", e);
            continue;
        }

        if seen.insert(address.to_ascii_lowercase()) {
            recipients.push(address.to_string());
        }
    }

    recipients
}

/// Normalize a comma-separated address list
pub fn normalize_emails(raw: &str) -> Vec<String> {
    normalize_email_iter(raw.split(','))
}

fn validate_threshold(days: u32) -> Result<u32> {
    if days > MAX_THRESHOLD_DAYS {
        return Err(WardenError::invalid_input(format!(
            "alert days must be at most {}, got {}",
            MAX_THRESHOLD_DAYS, days
        )));
    }
    Ok(days)
}

/// Resolve the alert policy for one check, starting from the system default
pub fn resolve_policy(
    team: Option<&TeamDefaults>,
    overrides: AlertOverrides<'_>,
) -> Result<AlertPolicy> {
    resolve_policy_from(AlertPolicy::system_default(), team, overrides)
}

/// Resolve the alert policy for one check, starting from `base`
///
/// A request email list that is non-blank but contains no valid address is
/// rejected. Invalid team addresses are dropped silently since the caller
/// cannot fix them.
pub fn resolve_policy_from(
    base: AlertPolicy,
    team: Option<&TeamDefaults>,
    overrides: AlertOverrides<'_>,
) -> Result<AlertPolicy> {
    let mut policy = base;

    if let Some(team) = team {
        if let Some(days) = team.alert_days {
            policy.threshold_days = validate_threshold(days)?;
        }
        let team_recipients = normalize_email_iter(team.emails.iter().map(String::as_str));
        if !team_recipients.is_empty() {
            policy.recipients = team_recipients;
        }
    }

    if let Some(days) = overrides.alert_days {
        policy.threshold_days = validate_threshold(days)?;
    }

    if let Some(raw) = overrides.emails.filter(|raw| !raw.trim().is_empty()) {
        let requested = normalize_emails(raw);
        if requested.is_empty() {
            return Err(WardenError::invalid_input(format!(
                "bad email list: no valid address in '{}'",
                raw.trim()
            )));
        }
        policy.recipients = requested;
    }

    Ok(policy)
}
