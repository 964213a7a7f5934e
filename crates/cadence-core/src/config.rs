//! Configuration model.
//!
//! Every section and field has a default, so a partial (or missing)
//! `config.toml` still yields a usable configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct CadenceConfig {
    pub session: SessionSettings,
    pub timer: TimerSettings,
    pub gateway: GatewaySettings,
    pub cache: CacheSettings,
    pub logging: LoggingSettings,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SessionSettings {
    /// Quiet period before a local cache write, in milliseconds.
    pub debounce_ms: u64,
    /// Minimum spacing between two gateway reconciliations, in seconds.
    pub sync_throttle_secs: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 1000,
            sync_throttle_secs: 5,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TimerSettings {
    pub max_duration_minutes: u32,
    /// How long before expiry the warning fires.
    pub warning_before_minutes: u32,
    /// Time added by each extension.
    pub extension_minutes: u32,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            max_duration_minutes: 30,
            warning_before_minutes: 1,
            extension_minutes: 5,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GatewaySettings {
    /// Base URL of the hosted backend, e.g. `https://project.example.co`.
    pub base_url: Option<String>,
    /// Public API key sent as `apikey` and bearer token.
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct CacheSettings {
    /// Directory for the file-backed cache. `None` means the platform data dir.
    pub dir: Option<PathBuf>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config: CadenceConfig = toml::from_str("").unwrap();
        assert_eq!(config, CadenceConfig::default());
        assert_eq!(config.session.debounce_ms, 1000);
        assert_eq!(config.session.sync_throttle_secs, 5);
        assert_eq!(config.timer.extension_minutes, 5);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: CadenceConfig = toml::from_str(
            r#"
            [timer]
            max_duration_minutes = 5

            [gateway]
            base_url = "https://backend.example.co"
            "#,
        )
        .unwrap();

        assert_eq!(config.timer.max_duration_minutes, 5);
        assert_eq!(config.timer.warning_before_minutes, 1);
        assert_eq!(
            config.gateway.base_url.as_deref(),
            Some("https://backend.example.co")
        );
        assert_eq!(config.gateway.timeout_secs, 30);
        assert_eq!(config.logging.level, "info");
    }
}
