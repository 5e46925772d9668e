//! Security Module
//!
//! Input validation applied to everything that arrives from a caller before
//! the core touches the network.

pub mod input_validation;

pub use input_validation::{
    CheckTarget, ValidationError, normalize_target_input, validate_check_url, validate_email,
    validate_hostname, validate_port,
};
