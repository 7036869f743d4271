use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::{info, warn};

use super::{Feedback, FeedbackLog, StatsPoller, ToggleStates};
use crate::client::DeviceApi;
use crate::{
    Channel, CommandResponse, ConfigError, DeviceError, MoveCommand, PanelConfig, StatsSnapshot,
};

/// Operator-side state for one rover: sensor toggles, the latest stats,
/// what is in flight and how recent actions went.
///
/// The device client stays stateless; everything mutable lives here. The
/// surface is meant to be shared behind an `Arc` so front-ends can fire
/// actions from spawned tasks while rendering continues.
pub struct ControlSurface<D: DeviceApi> {
    device: Arc<D>,
    toggles: Mutex<ToggleStates>,
    // one lock per channel so a channel has at most one toggle in flight
    toggle_flights: [Mutex<()>; 4],
    // every command still awaiting a reply, oldest first
    in_flight: Mutex<Vec<MoveCommand>>,
    feedback: Mutex<FeedbackLog>,
    stats: watch::Receiver<StatsSnapshot>,
    poller: Mutex<Option<StatsPoller>>,
}

impl<D: DeviceApi> ControlSurface<D> {
    /// Validates `config`, then creates the surface and starts stats
    /// polling. Must be called inside a tokio runtime.
    pub fn mount(device: Arc<D>, config: &PanelConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let (publish, stats) = watch::channel(StatsSnapshot::default());
        let poller = StatsPoller::spawn(Arc::clone(&device), config.poll_interval(), publish);

        info!("Control surface mounted");

        Ok(Self {
            device,
            toggles: Mutex::new(ToggleStates::default()),
            toggle_flights: Default::default(),
            in_flight: Mutex::new(Vec::new()),
            feedback: Mutex::new(FeedbackLog::new(config.feedback_capacity)),
            stats,
            poller: Mutex::new(Some(poller)),
        })
    }

    pub fn device(&self) -> &Arc<D> {
        &self.device
    }

    /// Flips `channel` straight away, then asks the device to match.
    ///
    /// On failure the channel goes back to what it was before the call and
    /// the error is both recorded as feedback and returned. A second toggle
    /// of the same channel waits until the first one has resolved.
    pub async fn toggle(&self, channel: Channel) -> Result<CommandResponse, DeviceError> {
        let _flight = self.toggle_flights[channel.index()].lock().await;

        let enabled = self.toggles.lock().await.flip(channel);
        info!("Toggling {} {}", channel, if enabled { "on" } else { "off" });

        match self.device.set_toggle(channel, enabled).await {
            Ok(response) => {
                let message = response.message().map(str::to_string).unwrap_or_else(|| {
                    format!("{} {}", channel, if enabled { "enabled" } else { "disabled" })
                });
                self.record(Feedback::success(message)).await;
                Ok(response)
            }
            Err(err) => {
                self.toggles.lock().await.set(channel, !enabled);
                warn!("Reverted {} after failed toggle: {}", channel, err);
                self.record(Feedback::error(format!("Failed to toggle {}: {}", channel, err)))
                    .await;
                Err(err)
            }
        }
    }

    /// Sends a movement or stop command, marking it busy while in flight.
    pub async fn command(&self, command: MoveCommand) -> Result<CommandResponse, DeviceError> {
        self.in_flight.lock().await.push(command);
        let result = self.device.command(command).await;
        {
            let mut in_flight = self.in_flight.lock().await;
            if let Some(position) = in_flight.iter().position(|c| *c == command) {
                in_flight.remove(position);
            }
        }

        match &result {
            Ok(response) => {
                let message = response
                    .message()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{} sent", command));
                self.record(Feedback::success(message)).await;
            }
            Err(err) => {
                warn!("Command {} failed: {}", command, err);
                self.record(Feedback::error(format!(
                    "Failed to send {} command: {}",
                    command, err
                )))
                .await;
            }
        }

        result
    }

    pub async fn toggles(&self) -> ToggleStates {
        *self.toggles.lock().await
    }

    pub async fn is_enabled(&self, channel: Channel) -> bool {
        self.toggles.lock().await.get(channel)
    }

    /// The most recently sent command that has not been answered yet.
    pub async fn busy(&self) -> Option<MoveCommand> {
        self.in_flight.lock().await.last().copied()
    }

    pub async fn feedback(&self) -> FeedbackLog {
        self.feedback.lock().await.clone()
    }

    /// The most recent stats poll.
    pub fn snapshot(&self) -> StatsSnapshot {
        self.stats.borrow().clone()
    }

    /// A receiver that wakes on every published poll.
    pub fn subscribe_stats(&self) -> watch::Receiver<StatsSnapshot> {
        self.stats.clone()
    }

    /// Stops stats polling. Commands and toggles keep working.
    pub async fn teardown(&self) {
        if let Some(poller) = self.poller.lock().await.take() {
            poller.teardown();
        }
    }

    pub async fn is_polling(&self) -> bool {
        self.poller
            .lock()
            .await
            .as_ref()
            .is_some_and(StatsPoller::is_running)
    }

    async fn record(&self, feedback: Feedback) {
        self.feedback.lock().await.push(feedback);
    }
}
