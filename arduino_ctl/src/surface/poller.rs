use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::client::DeviceApi;
use crate::StatsSnapshot;

/// Background task that refreshes the stats snapshot.
///
/// Fetches once as soon as it starts, then once per interval. Each result
/// replaces the published snapshot outright. Dropping the poller or calling
/// [`StatsPoller::teardown`] cancels the task; a fetch that is still in
/// flight is abandoned and nothing is published afterwards.
#[derive(Debug)]
pub struct StatsPoller {
    handle: JoinHandle<()>,
}

impl StatsPoller {
    pub fn spawn<D: DeviceApi>(
        device: Arc<D>,
        every: Duration,
        publish: watch::Sender<StatsSnapshot>,
    ) -> Self {
        info!("Polling device stats every {:?}", every);

        let handle = tokio::spawn(async move {
            let mut tick = interval(every);
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                // first tick completes immediately
                tick.tick().await;
                let snapshot = device.get_stats().await;
                debug!("Stats snapshot with {} lines", snapshot.len());
                publish.send_replace(snapshot);
            }
        });

        Self { handle }
    }

    pub fn teardown(&self) {
        if !self.handle.is_finished() {
            info!("Stopping stats polling");
        }
        self.handle.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for StatsPoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
