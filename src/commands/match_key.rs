// MatchKeyCommand - Check that a private key belongs to a certificate
// Copyright (C) 2025 certwarden contributors
// Licensed under GPL-3.0

use super::Command;
use crate::Args;
use crate::certificates::{KeyMatchResult, KeyMatcher, MismatchReason};
use anyhow::Context;
use async_trait::async_trait;
use colored::Colorize;
use std::path::Path;

/// MatchKeyCommand compares a certificate PEM file with a private key PEM file
///
/// A key that does not match is reported and turned into a failing exit
/// status; unreadable or malformed files are errors.
pub struct MatchKeyCommand {
    args: Args,
}

impl MatchKeyCommand {
    /// Create a new MatchKeyCommand with the given arguments
    pub fn new(args: Args) -> Self {
        Self { args }
    }

    fn subject_id(&self, cert_path: &Path) -> String {
        self.args
            .key
            .subject_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| cert_path.display().to_string())
    }
}

fn read_pem(path: &Path, what: &str) -> anyhow::Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} file {}", what, path.display()))
}

fn print_result(result: &KeyMatchResult) {
    if result.matches {
        println!(
            "{} Private key matches certificate {}",
            "✓".green().bold(),
            result.subject_id.bold()
        );
        return;
    }

    let reason = match result.mismatch {
        Some(MismatchReason::AlgorithmMismatch) => "key algorithm differs from the certificate's",
        _ => "key belongs to a different certificate",
    };
    println!(
        "{} Private key does not match certificate {}: {}",
        "✗".red().bold(),
        result.subject_id.bold(),
        reason
    );
}

#[async_trait]
impl Command for MatchKeyCommand {
    async fn execute(&self) -> anyhow::Result<()> {
        let (Some(cert_path), Some(key_path)) = (&self.args.key.cert_file, &self.args.key.key_file)
        else {
            anyhow::bail!("--match-cert and --match-key must be used together");
        };

        let certificate_pem = read_pem(cert_path, "certificate")?;
        let private_key_pem = read_pem(key_path, "private key")?;
        let subject_id = self.subject_id(cert_path);

        let result = KeyMatcher::new().evaluate(
            &subject_id,
            &certificate_pem,
            &private_key_pem,
            chrono::Utc::now(),
        )?;

        if self.args.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            print_result(&result);
        }

        if !result.matches {
            anyhow::bail!("private key does not match certificate");
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "MatchKeyCommand"
    }
}
