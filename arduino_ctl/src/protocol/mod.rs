mod channel;
mod movement;
mod response;

pub use channel::*;
pub use movement::*;
pub use response::*;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// The exact HTTP request the firmware expects for one logical operation.
///
/// Construction is pure: the same operation always yields an equal request,
/// which is what the client sends and what tests compare against.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DeviceRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<MotorCommands>,
}

impl DeviceRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn movement(protocol: MovementProtocol, command: MoveCommand) -> Self {
        match protocol {
            MovementProtocol::Motors => Self {
                method: HttpMethod::Post,
                path: "/motors".to_string(),
                query: Vec::new(),
                body: Some(command.motor_codes()),
            },
            MovementProtocol::Path => Self::get(format!("/{}", command.path_segment())),
        }
    }

    pub fn toggle(channel: Channel, enabled: bool) -> Self {
        let mut request = Self::get(format!("/{}", channel.path_segment()));
        request.query.push(("state".to_string(), enabled.to_string()));
        request
    }

    pub fn stats() -> Self {
        Self::get("/stats")
    }

    /// Joins the request path onto `base_url`, keeping any path prefix the
    /// base already has.
    pub fn url(&self, base_url: &str) -> String {
        format!(
            "{}/{}",
            base_url.trim().trim_end_matches('/'),
            self.path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slash() {
        let request = DeviceRequest::stats();
        assert_eq!(request.url("http://192.168.0.22"), "http://192.168.0.22/stats");
        assert_eq!(request.url("http://192.168.0.22/"), "http://192.168.0.22/stats");
        assert_eq!(request.url("http://rover.local/api/"), "http://rover.local/api/stats");
        assert_eq!(request.url(" http://192.168.0.22/ "), "http://192.168.0.22/stats");
    }

    #[test]
    fn toggle_encodes_state_as_query() {
        let request = DeviceRequest::toggle(Channel::Infrared, false);
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.path, "/IR");
        assert_eq!(request.query, vec![("state".to_string(), "false".to_string())]);
        assert!(request.body.is_none());
    }
}
