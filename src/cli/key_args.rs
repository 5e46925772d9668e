// Key matching arguments
// Copyright (C) 2025 certwarden contributors
// Licensed under GPL-3.0

use clap::Args;
use std::path::PathBuf;

/// Check whether a private key belongs to a certificate
#[derive(Args, Debug, Clone, Default)]
pub struct KeyArgs {
    /// Certificate PEM file
    #[arg(long = "match-cert", value_name = "FILE", requires = "key_file")]
    pub cert_file: Option<PathBuf>,

    /// Private key PEM file
    #[arg(
        long = "match-key",
        value_name = "FILE",
        id = "key_file",
        requires = "cert_file"
    )]
    pub key_file: Option<PathBuf>,

    /// Label reported with the result
    #[arg(long = "subject-id", value_name = "ID")]
    pub subject_id: Option<String>,
}

impl KeyArgs {
    /// Whether key matching was requested
    pub fn requested(&self) -> bool {
        self.cert_file.is_some() || self.key_file.is_some()
    }
}
