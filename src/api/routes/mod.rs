// API Routes Module

pub mod cadence;
pub mod check;
pub mod health;
pub mod keys;
pub mod plan;
