// API Models Module

pub mod error;
pub mod request;
pub mod response;

pub use error::{ApiError, ApiErrorResponse};
pub use request::{CheckCertRequest, MatchKeyRequest};
pub use response::{CadenceResponse, HealthResponse};
