// Command trait - Defines the interface for all command implementations
// Copyright (C) 2025 certwarden contributors
// Licensed under GPL-3.0

use async_trait::async_trait;

/// One operational mode of the certwarden binary
///
/// Each command validates its own preconditions, runs, and reports failure
/// through the returned error. Commands are selected by
/// [`CommandRouter`](super::CommandRouter).
#[async_trait]
pub trait Command: Send + Sync {
    /// Execute the command asynchronously
    ///
    /// Library errors (`WardenError`) are propagated with `?` and surface
    /// through `anyhow` with their message intact.
    async fn execute(&self) -> anyhow::Result<()>;

    /// Get a human-readable name for this command (for logging/debugging)
    fn name(&self) -> &'static str;
}
