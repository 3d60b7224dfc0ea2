//! Monitor configuration

use alerting::AlertConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level configuration for the focus monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Alert thresholds and cooldowns.
    pub alerts: AlertConfig,
    /// Transport connect confirmation timeout (ms).
    pub connect_timeout_ms: u64,
    /// Base URL of the trip persistence service.
    pub trip_service_url: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            alerts: AlertConfig::default(),
            connect_timeout_ms: 5000,
            trip_service_url: "http://localhost:8082".to_string(),
        }
    }
}

impl MonitorConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Load configuration from `roadguard.toml` (optional) and
    /// `ROADGUARD_*` environment overrides.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        ::config::Config::builder()
            .add_source(::config::File::with_name("roadguard").required(false))
            .add_source(::config::Environment::with_prefix("ROADGUARD").separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MonitorConfig::default();
        assert_eq!(config.connect_timeout(), Duration::from_millis(5000));
        assert_eq!(config.alerts.critical_focus_percent, 25);
    }
}
