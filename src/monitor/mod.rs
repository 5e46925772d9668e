// Certificate Monitoring Policy
//
// Pure policy used around each check:
// - Cadence tokens mapped to re-check intervals
// - Alert threshold and recipient resolution
// - Expiry notice planning
//
// Scheduling loops and email delivery are left to external services.

pub mod alerts;
pub mod cadence;

pub use alerts::{AlertOverrides, AlertPolicy, ExpiryNotice, TeamDefaults, resolve_policy};
pub use cadence::CheckCadence;
