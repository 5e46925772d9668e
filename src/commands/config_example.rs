// ConfigExampleCommand - Write example configuration files
// Copyright (C) 2025 certwarden contributors
// Licensed under GPL-3.0

use super::Command;
use crate::Args;
use crate::api::ApiConfig;
use crate::config::WardenConfig;
use anyhow::Context;
use async_trait::async_trait;
use colored::Colorize;

/// ConfigExampleCommand writes `--config-example` and/or
/// `--api-config-example` files and exits
pub struct ConfigExampleCommand {
    args: Args,
}

impl ConfigExampleCommand {
    /// Create a new ConfigExampleCommand with the given arguments
    pub fn new(args: Args) -> Self {
        Self { args }
    }
}

#[async_trait]
impl Command for ConfigExampleCommand {
    async fn execute(&self) -> anyhow::Result<()> {
        if let Some(path) = &self.args.config_example {
            WardenConfig::create_example(path)?;
            println!(
                "{} Example configuration saved to: {}",
                "✓".green(),
                path.display()
            );
        }

        if let Some(path) = &self.args.api_server.config_example {
            let path_str = path.to_str().context("Invalid file path")?;
            ApiConfig::create_example(path_str)?;
            println!(
                "{} Example API configuration saved to: {}",
                "✓".green(),
                path.display()
            );
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "ConfigExampleCommand"
    }
}
