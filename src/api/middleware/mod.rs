// Middleware Module

pub mod auth;
pub mod cors;
pub mod logging;

pub use auth::{AuthExtension, authenticate, check_permission};
pub use cors::{cors_layer, cors_layer_with_origins};
pub use logging::logging_layer;
