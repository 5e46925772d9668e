// Plan module - Freemium gate, signed licenses and plan service responses

pub mod gate;
pub mod license;
pub mod upstream;

pub use gate::{
    Admission, GatePhase, PlanIdentity, PlanState, PlanSummary, PlanTier, admit, resolve_plan,
};
pub use license::{LicenseVerifier, parse_expiry, resolve_tier};
pub use upstream::UpstreamPlan;
