//! Process-wide configuration for credential issuance and pruning.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::domain::entities::token::{ACCESS_TOKEN_EXPIRY_MINUTES, RENEWAL_WINDOW_HOURS};

/// Signing and lifetime configuration shared by the issuer and verifier
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenConfig {
    /// Symmetric signing key. An empty key is a startup error.
    pub secret: String,

    /// Access credential lifetime in seconds
    pub access_ttl_secs: i64,

    /// Renewal record validity window in seconds
    pub renewal_window_secs: i64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: String::from("development-secret-change-in-production"),
            access_ttl_secs: ACCESS_TOKEN_EXPIRY_MINUTES * 60,
            renewal_window_secs: RENEWAL_WINDOW_HOURS * 3600,
        }
    }
}

impl TokenConfig {
    /// Create a configuration with an explicit secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Read configuration from `JWT_SECRET`, `ACCESS_TTL_SECS` and
    /// `RENEWAL_WINDOW_SECS`. A missing `JWT_SECRET` yields an empty key,
    /// which the issuer and verifier reject at construction time.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_default();
        let access_ttl_secs = std::env::var("ACCESS_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(ACCESS_TOKEN_EXPIRY_MINUTES * 60);
        let renewal_window_secs = std::env::var("RENEWAL_WINDOW_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(RENEWAL_WINDOW_HOURS * 3600);

        Self {
            secret,
            access_ttl_secs,
            renewal_window_secs,
        }
    }

    /// Access credential lifetime
    pub fn access_ttl(&self) -> Duration {
        Duration::seconds(self.access_ttl_secs)
    }

    /// Renewal validity window W
    pub fn renewal_window(&self) -> Duration {
        Duration::seconds(self.renewal_window_secs)
    }

    /// Check for the development placeholder secret
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == "development-secret-change-in-production"
    }
}

/// Scheduling configuration for the renewal prune worker
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PruneConfig {
    /// How often to run a pass (in seconds)
    pub interval_seconds: u64,

    /// Whether the background task runs at all
    pub enabled: bool,
}

impl Default for PruneConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600,
            enabled: true,
        }
    }
}

impl PruneConfig {
    /// Read configuration from `PRUNE_INTERVAL_SECS` and `PRUNE_ENABLED`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let interval_seconds = std::env::var("PRUNE_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.interval_seconds);
        let enabled = std::env::var("PRUNE_ENABLED")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.enabled);

        Self {
            interval_seconds,
            enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_config_default() {
        let config = TokenConfig::default();
        assert_eq!(config.access_ttl_secs, 900);
        assert_eq!(config.renewal_window_secs, 5 * 3600);
        assert!(config.is_using_default_secret());
    }

    #[test]
    fn test_token_config_durations() {
        let config = TokenConfig::new("key");
        assert_eq!(config.access_ttl(), Duration::minutes(15));
        assert_eq!(config.renewal_window(), Duration::hours(5));
        assert!(!config.is_using_default_secret());
    }

    #[test]
    fn test_prune_config_default() {
        let config = PruneConfig::default();
        assert_eq!(config.interval_seconds, 3600);
        assert!(config.enabled);
    }
}
