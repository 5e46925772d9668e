// Certificate check arguments
// Copyright (C) 2025 certwarden contributors
// Licensed under GPL-3.0

use clap::Args;

/// Options applied to every checked URL
#[derive(Args, Debug, Clone, Default)]
pub struct CheckArgs {
    /// Plan identity the check is charged to
    #[arg(
        long = "identity",
        value_name = "ID",
        env = "CERTWARDEN_IDENTITY",
        default_value = "local"
    )]
    pub identity: String,

    /// Team whose alert defaults apply
    #[arg(long = "team", value_name = "TEAM_ID")]
    pub team: Option<String>,

    /// Comma-separated alert recipients, overriding the team's
    #[arg(long = "emails", value_name = "LIST")]
    pub emails: Option<String>,

    /// Alert threshold in days, overriding the team's
    #[arg(long = "alert-days", value_name = "DAYS")]
    pub alert_days: Option<u32>,

    /// Check frequency (1h, 2h, 4h, 8h, 12h, daily, weekly, monthly)
    #[arg(long = "frequency", value_name = "TOKEN")]
    pub frequency: Option<String>,

    /// TLS handshake timeout in seconds, overriding the config file
    #[arg(long = "timeout", value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Print the planned expiry notice, if one is due
    #[arg(long = "show-notice")]
    pub show_notice: bool,
}
