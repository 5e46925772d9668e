// ApiServerCommand - REST API server mode
// Copyright (C) 2025 certwarden contributors
// Licensed under GPL-3.0

use super::Command;
use crate::Args;
use crate::api::{ApiConfig, ApiServer};
use crate::config::WardenConfig;
use anyhow::Context;
use async_trait::async_trait;
use tracing::info;

/// ApiServerCommand handles REST API server mode
///
/// This command is responsible for:
/// - Loading the API configuration from file or defaults
/// - Applying host, port and key overrides from the command line
/// - Wiring the checker from the main configuration and serving requests
pub struct ApiServerCommand {
    args: Args,
}

impl ApiServerCommand {
    /// Create a new ApiServerCommand with the given arguments
    pub fn new(args: Args) -> Self {
        Self { args }
    }

    fn api_config(&self) -> anyhow::Result<ApiConfig> {
        let server_args = &self.args.api_server;

        let mut config = match &server_args.config {
            Some(path) => {
                let path = path.to_str().context("Invalid API config file path")?;
                ApiConfig::from_file(path)?
            }
            None => ApiConfig::default(),
        };

        if let Some(host) = &server_args.host {
            config.host = host.clone();
        }
        if let Some(port) = server_args.port {
            config.port = port;
        }
        config.accept_unknown_keys = server_args.accept_any_key || config.accept_unknown_keys;

        Ok(config)
    }
}

#[async_trait]
impl Command for ApiServerCommand {
    async fn execute(&self) -> anyhow::Result<()> {
        info!("Starting certwarden in API server mode");

        let api_config = self.api_config()?;
        let checker = WardenConfig::load(self.args.config.as_deref())?.build_checker()?;

        ApiServer::new(api_config, checker).run().await
    }

    fn name(&self) -> &'static str {
        "ApiServerCommand"
    }
}
