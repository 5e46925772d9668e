// API Module - REST API Server for certwarden

pub mod config;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;
pub mod state;

// Re-export commonly used types
pub use config::{ApiConfig, Permission};
pub use server::ApiServer;
pub use state::AppState;
