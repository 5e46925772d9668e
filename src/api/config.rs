// API Configuration

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host address
    pub host: String,

    /// Server port
    pub port: u16,

    /// API keys (key -> permission level). The key is also the plan identity.
    pub api_keys: HashMap<String, Permission>,

    /// Accept any non-blank key with `User` permission, giving each caller
    /// its own plan identity
    pub accept_unknown_keys: bool,

    /// Enable CORS
    pub enable_cors: bool,

    /// Allowed CORS origins; empty allows any origin
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Permission {
    /// Full access
    Admin,

    /// Can run checks, which may consume the free trial
    User,

    /// Key matching, plan status and cadence lookups only
    ReadOnly,
}

impl Default for ApiConfig {
    fn default() -> Self {
        let mut api_keys = HashMap::new();
        // Default demo key
        api_keys.insert("demo-key-12345".to_string(), Permission::User);

        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            api_keys,
            accept_unknown_keys: false,
            enable_cors: false,
            cors_origins: Vec::new(),
            max_body_size: 256 * 1024, // 256KB, enough for a PEM pair
        }
    }
}

impl ApiConfig {
    /// Create config from file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ApiConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Create example config file
    pub fn create_example(path: &str) -> anyhow::Result<()> {
        let config = Self::default();
        let toml = toml::to_string_pretty(&config)?;
        std::fs::write(path, toml)?;
        Ok(())
    }

    /// Validate API key and return permission level
    pub fn validate_key(&self, key: &str) -> Option<Permission> {
        match self.api_keys.get(key) {
            Some(permission) => Some(*permission),
            None if self.accept_unknown_keys && !key.trim().is_empty() => Some(Permission::User),
            None => None,
        }
    }

    /// Add API key
    pub fn add_key(&mut self, key: String, permission: Permission) {
        self.api_keys.insert(key, permission);
    }

    /// Remove API key
    pub fn remove_key(&mut self, key: &str) -> Option<Permission> {
        self.api_keys.remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_unknown_keys_rejected_by_default() {
        let config = ApiConfig::default();
        assert_eq!(config.validate_key("demo-key-12345"), Some(Permission::User));
        assert_eq!(config.validate_key("someone-else"), None);
    }

    #[test]
    fn test_accept_unknown_keys() {
        let config = ApiConfig {
            accept_unknown_keys: true,
            ..ApiConfig::default()
        };
        assert_eq!(config.validate_key("someone-else"), Some(Permission::User));
        assert_eq!(config.validate_key("   "), None);
    }

    #[test]
    fn test_example_file_loads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("api.toml");
        let path = path.to_str().unwrap();

        ApiConfig::create_example(path).unwrap();
        let config = ApiConfig::from_file(path).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.validate_key("demo-key-12345"), Some(Permission::User));
    }
}
