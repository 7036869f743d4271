use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{ConfigError, MovementProtocol};

pub const DEFAULT_BASE_URL: &str = "http://192.168.0.22";
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Where the rover lives and how long to wait for it.
///
/// ```rust,ignore
/// let config = DeviceConfig::new("http://192.168.0.22".to_string(), 5000, MovementProtocol::Motors);
///
/// if let Err(e) = config.validate() {
///     println!("Configuration error: {}", e);
///     return;
/// }
///
/// let client = DeviceClient::new(config)?;
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DeviceConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub movement: MovementProtocol,
}

impl DeviceConfig {
    pub fn new(base_url: String, timeout_ms: u64, movement: MovementProtocol) -> Self {
        Self {
            base_url,
            timeout_ms,
            movement,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.parsed_url()?;
        if self.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Parses `base_url`, accepting only http and https.
    pub fn parsed_url(&self) -> Result<Url, ConfigError> {
        let raw = self.base_url.trim();
        if raw.is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }

        let url = Url::parse(raw).map_err(|e| ConfigError::InvalidBaseUrl(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(ConfigError::UnsupportedScheme(other.to_string())),
        }
        if url.host_str().is_none() {
            return Err(ConfigError::InvalidBaseUrl(format!("'{}' has no host", raw)));
        }

        Ok(url)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            movement: MovementProtocol::Motors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = DeviceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timeout(), Duration::from_millis(5000));
    }

    #[test]
    fn rejects_bad_urls() {
        let mut config = DeviceConfig::default();

        config.base_url = "   ".to_string();
        assert_eq!(config.validate(), Err(ConfigError::EmptyBaseUrl));

        config.base_url = "192.168.0.22".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidBaseUrl(_))));

        config.base_url = "ftp://192.168.0.22".to_string();
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnsupportedScheme("ftp".to_string()))
        );
    }

    #[test]
    fn rejects_zero_timeout() {
        let config = DeviceConfig {
            timeout_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroTimeout));
    }
}
