use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::DeviceConfig;
use crate::{ConfigError, MovementProtocol};

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;
pub const DEFAULT_FEEDBACK_CAPACITY: usize = 50;

pub const ENV_CONFIG_FILE: &str = "ARDUINO_CONFIG";
pub const ENV_BASE_URL: &str = "ARDUINO_BASE_URL";
pub const ENV_TIMEOUT_MS: &str = "ARDUINO_TIMEOUT_MS";
pub const ENV_MOVEMENT_PROTOCOL: &str = "ARDUINO_MOVEMENT_PROTOCOL";
pub const ENV_POLL_INTERVAL_MS: &str = "ARDUINO_POLL_INTERVAL_MS";

/// Everything a control surface needs: the device endpoint plus polling and
/// feedback settings.
///
/// In TOML form every key is optional:
///
/// ```toml
/// poll_interval_ms = 2000
/// feedback_capacity = 50
///
/// [device]
/// base_url = "http://192.168.0.22"
/// timeout_ms = 5000
/// movement = "motors"
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PanelConfig {
    pub device: DeviceConfig,
    pub poll_interval_ms: u64,
    pub feedback_capacity: usize,
}

impl PanelConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.device.validate()?;
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.feedback_capacity == 0 {
            return Err(ConfigError::ZeroFeedbackCapacity);
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Reads `ARDUINO_CONFIG` if it is set, otherwise the individual
    /// `ARDUINO_*` variables.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var(ENV_CONFIG_FILE) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim()),
            _ => Self::from_env(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from a variable lookup. Unset variables keep their
    /// defaults; set but unparsable ones are rejected.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(base_url) = lookup(ENV_BASE_URL) {
            config.device.base_url = base_url.trim().to_string();
        }
        if let Some(timeout_ms) = parse_var(&lookup, ENV_TIMEOUT_MS)? {
            config.device.timeout_ms = timeout_ms;
        }
        if let Some(movement) = parse_var::<MovementProtocol, _>(&lookup, ENV_MOVEMENT_PROTOCOL)? {
            config.device.movement = movement;
        }
        if let Some(poll_interval_ms) = parse_var(&lookup, ENV_POLL_INTERVAL_MS)? {
            config.poll_interval_ms = poll_interval_ms;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: PanelConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            device: DeviceConfig::default(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            feedback_capacity: DEFAULT_FEEDBACK_CAPACITY,
        }
    }
}

fn parse_var<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&'static str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidVariable { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&'static str, &str)]) -> impl Fn(&'static str) -> Option<String> {
        let vars: HashMap<&'static str, String> =
            pairs.iter().map(|(k, v)| (*k, v.to_string())).collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = PanelConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, PanelConfig::default());
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = PanelConfig::from_lookup(lookup_from(&[
            (ENV_BASE_URL, "http://10.0.0.7"),
            (ENV_TIMEOUT_MS, "750"),
            (ENV_MOVEMENT_PROTOCOL, "PATH"),
            (ENV_POLL_INTERVAL_MS, "500"),
        ]))
        .unwrap();

        assert_eq!(config.device.base_url, "http://10.0.0.7");
        assert_eq!(config.device.timeout_ms, 750);
        assert_eq!(config.device.movement, MovementProtocol::Path);
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
    }

    #[test]
    fn unparsable_variable_is_an_error() {
        let err = PanelConfig::from_lookup(lookup_from(&[(ENV_TIMEOUT_MS, "soon")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidVariable {
                name: ENV_TIMEOUT_MS,
                value: "soon".to_string()
            }
        );
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let err = PanelConfig::from_lookup(lookup_from(&[(ENV_POLL_INTERVAL_MS, "0")])).unwrap_err();
        assert_eq!(err, ConfigError::ZeroPollInterval);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = PanelConfig::from_toml(
            r#"
            poll_interval_ms = 1000

            [device]
            base_url = "http://rover.local"
            movement = "path"
            "#,
        )
        .unwrap();

        assert_eq!(config.poll_interval_ms, 1000);
        assert_eq!(config.feedback_capacity, DEFAULT_FEEDBACK_CAPACITY);
        assert_eq!(config.device.base_url, "http://rover.local");
        assert_eq!(config.device.timeout_ms, 5000);
        assert_eq!(config.device.movement, MovementProtocol::Path);
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = PanelConfig::from_toml("poll_interval_ms = \"fast\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
