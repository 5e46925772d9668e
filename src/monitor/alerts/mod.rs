// Alerts - Alert policy resolution and expiry notice planning

pub mod notice;
pub mod policy;

pub use notice::{ExpiryNotice, NoticeSeverity};
pub use policy::{
    AlertOverrides, AlertPolicy, DEFAULT_THRESHOLD_DAYS, TeamDefaults, normalize_emails,
    resolve_policy, resolve_policy_from,
};
