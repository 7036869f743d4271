use serde::{Deserialize, Serialize};

/// Reply to any movement or toggle request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CommandResponse {
    pub fn new(status: impl Into<String>, message: Option<String>) -> Self {
        Self {
            status: status.into(),
            message,
        }
    }

    /// The device message, if it sent a non-blank one.
    pub fn message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|message| !message.is_empty())
    }
}

/// Body of `GET /stats`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct StatsResponse {
    #[serde(default)]
    pub stats: Vec<String>,
}

/// Status lines from one poll, in device order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct StatsSnapshot(Vec<String>);

impl StatsSnapshot {
    pub fn new(lines: Vec<String>) -> Self {
        Self(lines)
    }

    pub fn lines(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<StatsResponse> for StatsSnapshot {
    fn from(response: StatsResponse) -> Self {
        Self(response.stats)
    }
}

impl From<Vec<String>> for StatsSnapshot {
    fn from(lines: Vec<String>) -> Self {
        Self(lines)
    }
}
