// CheckCommand - Check the certificates of one or more URLs
// Copyright (C) 2025 certwarden contributors
// Licensed under GPL-3.0

use super::Command;
use crate::Args;
use crate::certificates::{CertificateStatus, TlsProbe};
use crate::checker::{CheckReport, CheckRequest};
use crate::config::WardenConfig;
use crate::monitor::alerts::ExpiryNotice;
use crate::plan::PlanIdentity;
use crate::security::normalize_target_input;
use crate::utils::network::timeout_from_secs;
use anyhow::Context;
use async_trait::async_trait;
use colored::Colorize;
use std::path::Path;
use tracing::info;

/// CheckCommand handles certificate checks from the command line
///
/// URLs come from positional arguments and `--file`. Bare hosts are
/// prefixed with `https://`. One check runs directly; several run through
/// the checker's bounded batch.
pub struct CheckCommand {
    args: Args,
}

impl CheckCommand {
    /// Create a new CheckCommand with the given arguments
    pub fn new(args: Args) -> Self {
        Self { args }
    }

    fn collect_urls(&self) -> anyhow::Result<Vec<String>> {
        let mut urls: Vec<String> = self.args.urls.clone();
        if let Some(path) = &self.args.input_file {
            urls.extend(read_url_file(path)?);
        }
        Ok(urls.iter().map(|u| normalize_target_input(u)).collect())
    }

    fn build_request(&self, identity: &PlanIdentity, url: String) -> CheckRequest {
        let check = &self.args.check;
        let mut request = CheckRequest::new(identity.clone(), url);
        request.team_id = check.team.clone();
        request.custom_emails = check.emails.clone();
        request.custom_alert_days = check.alert_days;
        request.cadence = check.frequency.clone();
        request
    }

    fn print_report(&self, report: &CheckReport) {
        let status = match report.status {
            CertificateStatus::Valid => report.status.as_str().green().bold(),
            CertificateStatus::Expiring => report.status.as_str().yellow().bold(),
            CertificateStatus::Expired => report.status.as_str().red().bold(),
        };

        println!("\n{} {}", "Certificate:".cyan().bold(), report.domain.bold());
        println!("  Common name:     {}", report.cn);
        println!("  Valid from:      {}", report.start_date);
        println!("  Valid until:     {}", report.end_date);
        println!("  Days remaining:  {}", report.days_remaining);
        println!("  Status:          {}", status);
        println!(
            "  Alert threshold: {} days",
            report.alert_policy.threshold_days
        );
        if report.alert_policy.has_recipients() {
            println!(
                "  Recipients:      {}",
                report.alert_policy.recipients.join(", ")
            );
        }
        println!(
            "  Next check:      {} ({})",
            report.next_check_at.to_rfc3339(),
            report.cadence
        );

        if self.args.check.show_notice
            && let Some(notice) = ExpiryNotice::plan(report, false)
        {
            println!(
                "  {} [{:?}] {}",
                "Notice:".yellow().bold(),
                notice.severity,
                notice.subject
            );
            println!("    {}", notice.message);
        }
    }
}

/// Read one URL per line, skipping blanks and `#` comments
fn read_url_file(path: &Path) -> anyhow::Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read URL file {}", path.display()))?;

    Ok(parse_url_lines(&contents))
}

fn parse_url_lines(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl Command for CheckCommand {
    async fn execute(&self) -> anyhow::Result<()> {
        let urls = self.collect_urls()?;
        if urls.is_empty() {
            anyhow::bail!("No URL given. Run with --help for usage.");
        }

        let config = WardenConfig::load(self.args.config.as_deref())?;
        let mut checker = config.build_checker()?;
        if let Some(timeout) = self.args.check.timeout {
            checker = checker.with_probe(TlsProbe::new(timeout_from_secs(timeout)));
        }

        let identity = PlanIdentity::new(self.args.check.identity.as_str())?;
        let requests: Vec<CheckRequest> = urls
            .into_iter()
            .map(|url| self.build_request(&identity, url))
            .collect();

        info!("Checking {} URL(s) for {}", requests.len(), identity);

        let urls: Vec<String> = requests.iter().map(|r| r.url.clone()).collect();
        let results = if requests.len() == 1 {
            vec![checker.check(&requests[0]).await]
        } else {
            checker.check_many(requests).await
        };

        let mut failures = 0usize;
        let mut reports = Vec::new();
        for (url, result) in urls.iter().zip(results) {
            match result {
                Ok(report) => reports.push(report),
                Err(e) => {
                    failures += 1;
                    eprintln!(
                        "{} {}: {} ({})",
                        "✗".red().bold(),
                        url,
                        e,
                        e.code()
                    );
                }
            }
        }

        if self.args.json {
            println!("{}", serde_json::to_string_pretty(&reports)?);
        } else {
            for report in &reports {
                self.print_report(report);
            }
        }

        if failures > 0 {
            anyhow::bail!("{} of {} check(s) failed", failures, urls.len());
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "CheckCommand"
    }
}
