//! Session gate configuration

use std::time::Duration;

/// Configuration for the session gate
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Base URL the gate prefixes onto request paths
    pub base_url: String,
    /// How long after a session-expired signal further 401s are treated
    /// as part of the same failure burst
    pub failure_debounce: Duration,
}

impl GateConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            failure_debounce: Duration::from_secs(2),
        }
    }
}
