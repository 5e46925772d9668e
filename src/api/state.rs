// API State Management

use crate::api::config::ApiConfig;
use crate::certificates::KeyMatcher;
use crate::checker::CertificateChecker;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state
pub struct AppState {
    /// API configuration
    pub config: Arc<ApiConfig>,

    /// Certificate checker wired to the configured collaborators
    pub checker: CertificateChecker,

    /// Key matcher
    pub key_matcher: KeyMatcher,

    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(config: ApiConfig, checker: CertificateChecker) -> Self {
        Self {
            config: Arc::new(config),
            checker,
            key_matcher: KeyMatcher::new(),
            start_time: Instant::now(),
        }
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
