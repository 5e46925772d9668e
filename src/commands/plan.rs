// PlanCommand and CadenceCommand - Plan status and cadence lookups
// Copyright (C) 2025 certwarden contributors
// Licensed under GPL-3.0

use super::Command;
use crate::Args;
use crate::config::WardenConfig;
use crate::monitor::cadence::CheckCadence;
use crate::plan::{GatePhase, PlanIdentity};
use async_trait::async_trait;
use colored::Colorize;

/// PlanCommand prints the plan of the check identity
pub struct PlanCommand {
    args: Args,
}

impl PlanCommand {
    /// Create a new PlanCommand with the given arguments
    pub fn new(args: Args) -> Self {
        Self { args }
    }
}

#[async_trait]
impl Command for PlanCommand {
    async fn execute(&self) -> anyhow::Result<()> {
        let config = WardenConfig::load(self.args.config.as_deref())?;
        let checker = config.build_checker()?;
        let identity = PlanIdentity::new(self.args.check.identity.as_str())?;

        let summary = checker.plan_status(&identity).await?;

        if self.args.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            return Ok(());
        }

        let phase = match summary.phase {
            GatePhase::FreeUnused => "free check available".green(),
            GatePhase::FreeConsumed => "free check used".yellow(),
            GatePhase::ProActive => "licensed".green(),
            GatePhase::ProExpired => "license expired".red(),
        };

        println!("{} {}", "Plan:".cyan().bold(), identity.as_str().bold());
        println!("  Tier:       {}", summary.tier);
        println!("  Max sites:  {}", summary.max_sites);
        println!("  State:      {}", phase);
        if let Some(expires_at) = summary.license_expires_at {
            println!("  Expires at: {}", expires_at.to_rfc3339());
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "PlanCommand"
    }
}

/// CadenceCommand prints the interval of a check frequency token
pub struct CadenceCommand {
    args: Args,
}

impl CadenceCommand {
    /// Create a new CadenceCommand with the given arguments
    pub fn new(args: Args) -> Self {
        Self { args }
    }
}

#[async_trait]
impl Command for CadenceCommand {
    async fn execute(&self) -> anyhow::Result<()> {
        let token = self.args.cadence.as_deref().unwrap_or_default();
        let cadence = CheckCadence::from_token(token);
        let now = chrono::Utc::now();

        if self.args.json {
            let body = serde_json::json!({
                "token": cadence.token(),
                "interval_seconds": cadence.interval().num_seconds(),
                "next_check_at": cadence.next_check_at(now),
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
            return Ok(());
        }

        println!(
            "{} {} = {} seconds (next check at {})",
            "Cadence:".cyan().bold(),
            cadence,
            cadence.interval().num_seconds(),
            cadence.next_check_at(now).to_rfc3339()
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "CadenceCommand"
    }
}
