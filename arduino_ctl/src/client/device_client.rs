use tracing::{debug, warn};

use super::DeviceApi;
use crate::protocol::HttpMethod;
use crate::{
    Channel, CommandResponse, ConfigError, DeviceConfig, DeviceError, DeviceErrorKind,
    DeviceRequest, Direction, MoveCommand, StatsResponse, StatsSnapshot,
};

/// Stateless HTTP client for the rover firmware.
///
/// Every request carries the configured timeout and is attempted exactly
/// once. Cloning is cheap and shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct DeviceClient {
    config: DeviceConfig,
    http: reqwest::Client,
}

impl DeviceClient {
    pub fn new(mut config: DeviceConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        // requests are built on the same trimmed form that was validated
        config.base_url = config.base_url.trim().to_string();

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self { config, http })
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// The request `command` turns into under the configured movement
    /// protocol.
    pub fn movement_request(&self, command: MoveCommand) -> DeviceRequest {
        DeviceRequest::movement(self.config.movement, command)
    }

    async fn execute(&self, request: &DeviceRequest) -> Result<reqwest::Response, reqwest::Error> {
        let url = request.url(&self.config.base_url);

        let mut builder = match request.method {
            HttpMethod::Get => self.http.get(&url),
            HttpMethod::Post => self.http.post(&url),
        };
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!("Sending {:?} {} {:?}", request.method, url, request.body);
        builder.send().await?.error_for_status()
    }

    async fn send(&self, request: DeviceRequest) -> Result<CommandResponse, DeviceError> {
        let result: Result<CommandResponse, reqwest::Error> = async {
            let response = self.execute(&request).await?;
            response.json().await
        }
        .await;

        match result {
            Ok(response) => {
                debug!("Received {:?} for {}", response, request.path);
                Ok(response)
            }
            Err(e) => {
                let err = classify(e);
                warn!("Request to {} failed: {} ({})", request.path, err, err.kind().code());
                Err(err)
            }
        }
    }
}

impl DeviceApi for DeviceClient {
    async fn move_in(&self, direction: Direction) -> Result<CommandResponse, DeviceError> {
        self.send(self.movement_request(MoveCommand::Go(direction))).await
    }

    async fn stop(&self) -> Result<CommandResponse, DeviceError> {
        self.send(self.movement_request(MoveCommand::Stop)).await
    }

    async fn set_toggle(&self, channel: Channel, enabled: bool) -> Result<CommandResponse, DeviceError> {
        self.send(DeviceRequest::toggle(channel, enabled)).await
    }

    async fn get_stats(&self) -> StatsSnapshot {
        let request = DeviceRequest::stats();
        let result: Result<StatsResponse, reqwest::Error> = async {
            let response = self.execute(&request).await?;
            response.json().await
        }
        .await;

        match result {
            Ok(stats) => StatsSnapshot::from(stats),
            Err(e) => {
                debug!("Stats unavailable, showing none: {}", e);
                StatsSnapshot::default()
            }
        }
    }
}

/// Maps a transport failure onto the three causes the operator sees.
///
/// Timeout is checked first: a connect attempt that runs out the clock is a
/// timeout, not an unreachable device.
pub fn classify(err: reqwest::Error) -> DeviceError {
    let kind = if err.is_timeout() {
        DeviceErrorKind::Timeout
    } else if err.is_connect() {
        DeviceErrorKind::Unreachable
    } else {
        DeviceErrorKind::CommunicationFailure
    };
    DeviceError::with_source(kind, err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MovementProtocol;

    #[test]
    fn rejects_invalid_config() {
        let config = DeviceConfig::new(String::new(), 5000, MovementProtocol::Motors);
        assert_eq!(DeviceClient::new(config).unwrap_err(), ConfigError::EmptyBaseUrl);
    }

    #[test]
    fn movement_request_follows_configured_protocol() {
        let motors = DeviceClient::new(DeviceConfig::default()).unwrap();
        assert_eq!(motors.movement_request(MoveCommand::Stop).path, "/motors");

        let path = DeviceClient::new(DeviceConfig {
            movement: MovementProtocol::Path,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(path.movement_request(MoveCommand::Stop).path, "/stop");
    }

    #[test]
    fn keeps_the_trimmed_base_url() {
        let config = DeviceConfig::new(" http://127.0.0.1:8080 ".to_string(), 5000, MovementProtocol::Motors);
        let client = DeviceClient::new(config).unwrap();
        assert_eq!(client.config().base_url, "http://127.0.0.1:8080");
    }
}
