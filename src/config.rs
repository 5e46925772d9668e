// certwarden configuration
//
// Loaded from TOML; every field has a default so an empty file is valid.
// The license and its public key can also come from the environment.

use crate::certificates::TlsProbe;
use crate::checker::CertificateChecker;
use crate::monitor::alerts::{DEFAULT_THRESHOLD_DAYS, TeamDefaults};
use crate::plan::{PlanTier, resolve_tier};
use crate::store::http::DEFAULT_ENGINE_TIMEOUT;
use crate::store::{
    CertificateSink, EngineClient, FilePlanStore, HttpCertificateSink, HttpPlanStore,
    MemoryCertificateSink, MemoryPlanStore, PlanStore, StaticTeamDirectory,
};
use crate::utils::network::timeout_from_secs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Environment variable holding a license blob
pub const LICENSE_ENV: &str = "CERTWARDEN_LICENSE";

/// Environment variable holding the license public key
pub const LICENSE_PUBKEY_ENV: &str = "CERTWARDEN_LICENSE_PUBKEY";

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WardenConfig {
    pub probe: ProbeConfig,
    pub alerts: AlertsConfig,
    pub teams: BTreeMap<String, TeamConfig>,
    pub plan: PlanConfig,
    pub persistence: PersistenceConfig,
}

/// TLS probe settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub timeout_seconds: u64,
    pub default_port: u16,
    pub max_concurrent_checks: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 8,
            default_port: 443,
            max_concurrent_checks: crate::checker::DEFAULT_MAX_CONCURRENT_CHECKS,
        }
    }
}

/// System-wide alert defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    pub default_threshold_days: u32,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            default_threshold_days: DEFAULT_THRESHOLD_DAYS,
        }
    }
}

/// Alert defaults of one team
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamConfig {
    pub alert_days: Option<u32>,
    pub emails: Vec<String>,
}

/// Where plan state lives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStoreKind {
    #[default]
    Memory,
    File,
    Http,
}

/// Plan settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    pub store: PlanStoreKind,
    pub state_dir: PathBuf,
    pub engine_url: Option<String>,
    pub engine_token: Option<String>,
    pub license: Option<String>,
    pub license_public_key: Option<String>,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            store: PlanStoreKind::Memory,
            state_dir: PathBuf::from(".certwarden"),
            engine_url: None,
            engine_token: None,
            license: None,
            license_public_key: None,
        }
    }
}

/// Persistence service settings; no URL means results stay in memory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    pub engine_url: Option<String>,
    pub engine_token: Option<String>,
}

impl WardenConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).map_err(|e| {
            anyhow::anyhow!("Failed to read config file {:?}: {}", path.as_ref(), e)
        })?;

        let config: WardenConfig = toml::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML config: {}", e))?;

        Ok(config)
    }

    /// Write an example configuration file
    pub fn create_example<P: AsRef<Path>>(path: P) -> anyhow::Result<()> {
        let mut config = Self::default();
        config.teams.insert(
            "ops".to_string(),
            TeamConfig {
                alert_days: Some(15),
                emails: vec!["ops@example.com".to_string()],
            },
        );

        let toml_str = toml::to_string_pretty(&config)
            .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

        fs::write(path.as_ref(), toml_str).map_err(|e| {
            anyhow::anyhow!("Failed to write config file {:?}: {}", path.as_ref(), e)
        })?;

        Ok(())
    }

    /// Load `path` if given, else defaults; environment overrides apply to both
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(config.with_env())
    }

    /// Apply license overrides from the process environment
    pub fn with_env(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply license overrides from `lookup`; blank values are ignored
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(license) = non_blank(LICENSE_ENV) {
            self.plan.license = Some(license);
        }
        if let Some(public_key) = non_blank(LICENSE_PUBKEY_ENV) {
            self.plan.license_public_key = Some(public_key);
        }
        self
    }

    /// Tier granted by the configured license
    pub fn license_tier(&self) -> PlanTier {
        resolve_tier(
            self.plan.license.as_deref(),
            self.plan.license_public_key.as_deref(),
            chrono::Utc::now(),
        )
    }

    /// Team defaults in directory form
    pub fn team_defaults(&self) -> Vec<TeamDefaults> {
        self.teams
            .iter()
            .map(|(team_id, team)| TeamDefaults {
                team_id: team_id.clone(),
                alert_days: team.alert_days,
                emails: team.emails.clone(),
            })
            .collect()
    }

    /// Build the plan store selected by `[plan] store`
    pub fn build_plan_store(&self) -> anyhow::Result<Arc<dyn PlanStore>> {
        let store: Arc<dyn PlanStore> = match self.plan.store {
            PlanStoreKind::Memory => Arc::new(MemoryPlanStore::new(self.license_tier())),
            PlanStoreKind::File => Arc::new(FilePlanStore::new(
                self.plan.state_dir.clone(),
                self.license_tier(),
            )),
            PlanStoreKind::Http => {
                let url = self.plan.engine_url.clone().ok_or_else(|| {
                    anyhow::anyhow!("[plan] store = \"http\" requires engine_url")
                })?;
                let engine =
                    EngineClient::new(url, self.plan.engine_token.clone(), DEFAULT_ENGINE_TIMEOUT)?;
                Arc::new(HttpPlanStore::new(engine))
            }
        };
        Ok(store)
    }

    /// Build the persistence sink
    pub fn build_sink(&self) -> anyhow::Result<Arc<dyn CertificateSink>> {
        match &self.persistence.engine_url {
            Some(url) => {
                let engine = EngineClient::new(
                    url.clone(),
                    self.persistence.engine_token.clone(),
                    DEFAULT_ENGINE_TIMEOUT,
                )?;
                Ok(Arc::new(HttpCertificateSink::new(engine)))
            }
            None => Ok(Arc::new(MemoryCertificateSink::new())),
        }
    }

    /// Probe configured from `[probe]`
    pub fn build_probe(&self) -> TlsProbe {
        TlsProbe::new(timeout_from_secs(self.probe.timeout_seconds))
    }

    /// Checker wired with every configured collaborator
    pub fn build_checker(&self) -> anyhow::Result<CertificateChecker> {
        let teams = StaticTeamDirectory::new(self.team_defaults());

        Ok(CertificateChecker::new(
            self.build_plan_store()?,
            self.build_sink()?,
            Arc::new(teams),
        )
        .with_probe(self.build_probe())
        .with_default_threshold(self.alerts.default_threshold_days)
        .with_default_port(self.probe.default_port)
        .with_max_concurrent(self.probe.max_concurrent_checks))
    }
}
