// Commands module - Command Pattern implementation
// Copyright (C) 2025 certwarden contributors
// Licensed under GPL-3.0

mod command;
mod router;

// Individual command implementations
mod api_server;
mod check;
mod config_example;
mod match_key;
mod plan;

pub use command::Command;
pub use router::CommandRouter;

// Re-export individual commands for testing purposes
pub use api_server::ApiServerCommand;
pub use check::CheckCommand;
pub use config_example::ConfigExampleCommand;
pub use match_key::MatchKeyCommand;
pub use plan::{CadenceCommand, PlanCommand};
