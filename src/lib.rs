// certwarden - TLS certificate lifecycle monitor
// Copyright (C) 2025 certwarden contributors
// Licensed under GPL-3.0

//! certwarden checks TLS certificates for upcoming expiry, verifies that a
//! private key belongs to a certificate, and gates checks behind a per-identity
//! plan (one free check, then a license).
//!
//! The core is [`CertificateChecker`]; the CLI and the HTTP API are thin
//! layers over it. Plan state, persistence and team defaults are reached
//! through the traits in [`store`].

pub mod api;
pub mod certificates;
pub mod checker;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod monitor;
pub mod plan;
pub mod security;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use crate::checker::{CertificateChecker, CheckReport, CheckRequest};
pub use crate::cli::Args;
pub use crate::config::WardenConfig;
pub use crate::error::WardenError;

/// Result type for certwarden library operations
pub type Result<T> = std::result::Result<T, WardenError>;
