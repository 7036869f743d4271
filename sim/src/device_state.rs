//! Simulated rover firmware state.
//!
//! Mirrors what the real board keeps in RAM: the last code sent to each
//! wheel, which sensors are switched on, and a couple of counters that show
//! up on `/stats`.
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arduino_ctl::surface::ToggleStates;
use arduino_ctl::{Channel, MotorCommands};
use tokio::sync::Mutex;

/// What `/stats` answers with.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatsMode {
    /// Live lines built from the simulated state.
    #[default]
    Live,
    /// These exact lines, regardless of state.
    Fixed(Vec<String>),
    /// A 200 response whose body is not valid JSON.
    Malformed,
    /// A 500 response.
    Error,
}

impl FromStr for StatsMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" | "" => Ok(StatsMode::Live),
            "malformed" => Ok(StatsMode::Malformed),
            "error" => Ok(StatsMode::Error),
            other => Err(format!("unknown stats mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SimOptions {
    /// Added before every response.
    pub latency: Duration,
    pub stats_mode: StatsMode,
    /// Command and toggle replies come back as 200 with a truncated JSON
    /// body. State is still updated.
    pub garbled_replies: bool,
}

#[derive(Debug, Clone)]
pub struct DeviceState {
    pub motors: MotorCommands,
    pub sensors: ToggleStates,
    pub requests: u64,
    pub booted_at: Instant,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            motors: MotorCommands::halted(),
            sensors: ToggleStates::default(),
            requests: 0,
            booted_at: Instant::now(),
        }
    }
}

impl DeviceState {
    pub fn stats_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("uptime={}s", self.booted_at.elapsed().as_secs()),
            format!("requests={}", self.requests),
            format!("motors={}", self.motors),
        ];
        lines.extend(self.sensors.iter().map(|(channel, enabled)| {
            format!("{}={}", channel.path_segment(), if enabled { "on" } else { "off" })
        }));
        lines
    }
}

/// Handle shared by every request handler.
#[derive(Debug, Clone)]
pub struct SimDevice {
    state: Arc<Mutex<DeviceState>>,
    options: Arc<Mutex<SimOptions>>,
}

impl SimDevice {
    pub fn new(options: SimOptions) -> Self {
        Self {
            state: Arc::new(Mutex::new(DeviceState::default())),
            options: Arc::new(Mutex::new(options)),
        }
    }

    pub async fn state(&self) -> DeviceState {
        self.state.lock().await.clone()
    }

    pub async fn options(&self) -> SimOptions {
        self.options.lock().await.clone()
    }

    pub async fn set_stats_mode(&self, mode: StatsMode) {
        self.options.lock().await.stats_mode = mode;
    }

    pub async fn sensor(&self, channel: Channel) -> bool {
        self.state.lock().await.sensors.get(channel)
    }

    /// Counts the request and applies the configured latency.
    pub(crate) async fn begin_request(&self) {
        self.state.lock().await.requests += 1;
        let latency = self.options.lock().await.latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }

    pub(crate) async fn drive(&self, motors: MotorCommands) {
        self.state.lock().await.motors = motors;
    }

    pub(crate) async fn switch(&self, channel: Channel, enabled: bool) {
        self.state.lock().await.sensors.set(channel, enabled);
    }
}

impl Default for SimDevice {
    fn default() -> Self {
        Self::new(SimOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_lines_show_motors_and_sensors() {
        let mut state = DeviceState::default();
        state.requests = 3;
        state.sensors.set(Channel::Infrared, true);

        let lines = state.stats_lines();
        assert!(lines[0].starts_with("uptime="));
        assert_eq!(
            &lines[1..],
            [
                "requests=3",
                "motors=S,S,S,S",
                "ultrasonic=off",
                "magnetic=off",
                "IR=on",
                "radiowaves=off",
            ]
        );
    }

    #[test]
    fn stats_mode_names() {
        assert_eq!("Malformed".parse::<StatsMode>(), Ok(StatsMode::Malformed));
        assert_eq!("error".parse::<StatsMode>(), Ok(StatsMode::Error));
        assert_eq!("".parse::<StatsMode>(), Ok(StatsMode::Live));
        assert!("flaky".parse::<StatsMode>().is_err());
    }
}
