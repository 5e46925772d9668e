// CLI module - Command line interface and argument parsing
// Copyright (C) 2025 certwarden contributors
// Licensed under GPL-3.0

use clap::Parser;
use std::path::PathBuf;

// Sub-modules for organized CLI arguments
mod api_server_args;
mod check_args;
mod key_args;

// Re-export sub-structs
pub use api_server_args::ApiServerArgs;
pub use check_args::CheckArgs;
pub use key_args::KeyArgs;

/// certwarden - TLS certificate lifecycle monitor
///
/// The Args struct composes the per-mode argument groups:
/// - Targets and configuration
/// - Certificate checks (CheckArgs)
/// - Key matching (KeyArgs)
/// - Plan and cadence lookups
/// - API server (ApiServerArgs)
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, long_about = None)]
#[command(name = "certwarden")]
#[command(about = "TLS certificate expiry monitor and key matcher", long_about = None)]
pub struct Args {
    // ============ Targets and Configuration ============
    /// URLs to check (bare hosts are checked over https)
    #[arg(value_name = "URL")]
    pub urls: Vec<String>,

    /// File with one URL per line; blank lines and # comments are skipped
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub input_file: Option<PathBuf>,

    /// Configuration file (TOML format)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write an example configuration file and exit
    #[arg(long = "config-example", value_name = "FILE")]
    pub config_example: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long = "json")]
    pub json: bool,

    // ============ Certificate Checks ============
    #[command(flatten)]
    pub check: CheckArgs,

    // ============ Key Matching ============
    #[command(flatten)]
    pub key: KeyArgs,

    // ============ Plan and Cadence ============
    /// Show the plan of the check identity
    #[arg(long = "plan-status")]
    pub plan_status: bool,

    /// Print the interval of a check frequency token
    #[arg(long = "cadence", value_name = "TOKEN")]
    pub cadence: Option<String>,

    // ============ REST API Server ============
    #[command(flatten)]
    pub api_server: ApiServerArgs,
}

impl Args {
    /// Whether any URL was given, positionally or through `--file`
    pub fn has_targets(&self) -> bool {
        !self.urls.is_empty() || self.input_file.is_some()
    }

    /// Validate CLI arguments for mutual exclusivity
    ///
    /// Returns an error if more than one operational mode is requested
    pub fn validate(&self) -> anyhow::Result<()> {
        let modes = [
            ("--serve", self.api_server.enable),
            ("--match-cert/--match-key", self.key.requested()),
            ("--plan-status", self.plan_status),
            ("--cadence", self.cadence.is_some()),
            ("URL", self.has_targets()),
        ];

        let active: Vec<&str> = modes
            .iter()
            .filter(|(_, on)| *on)
            .map(|(name, _)| *name)
            .collect();

        if active.len() > 1 {
            anyhow::bail!(
                "Cannot combine {}. Choose one operation.",
                active.join(" and ")
            );
        }

        if self.key.cert_file.is_some() != self.key.key_file.is_some() {
            anyhow::bail!("--match-cert and --match-key must be used together");
        }

        if self.check.identity.trim().is_empty() {
            anyhow::bail!("--identity must not be blank");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check() {
        let args = Args::try_parse_from([
            "certwarden",
            "example.com",
            "--team",
            "ops",
            "--emails",
            "a@x.com,b@y.com",
            "--alert-days",
            "20",
            "--frequency",
            "daily",
        ])
        .unwrap();

        assert_eq!(args.urls, vec!["example.com".to_string()]);
        assert_eq!(args.check.team.as_deref(), Some("ops"));
        assert_eq!(args.check.alert_days, Some(20));
        assert_eq!(args.check.frequency.as_deref(), Some("daily"));
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_parse_match_key() {
        let args = Args::try_parse_from([
            "certwarden",
            "--match-cert",
            "cert.pem",
            "--match-key",
            "key.pem",
        ])
        .unwrap();
        assert!(args.key.requested());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_match_cert_requires_key() {
        assert!(Args::try_parse_from(["certwarden", "--match-cert", "cert.pem"]).is_err());
    }

    #[test]
    fn test_conflicting_modes() {
        let args =
            Args::try_parse_from(["certwarden", "example.com", "--serve"]).unwrap();
        assert!(args.validate().is_err());

        let args =
            Args::try_parse_from(["certwarden", "--plan-status", "--cadence", "1h"]).unwrap();
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_cadence_alone() {
        let args = Args::try_parse_from(["certwarden", "--cadence", "weekly"]).unwrap();
        assert_eq!(args.cadence.as_deref(), Some("weekly"));
        assert!(!args.has_targets());
        assert!(args.validate().is_ok());
    }
}
