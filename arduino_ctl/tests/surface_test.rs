/// Control surface behaviour against a scripted device: optimistic toggles,
/// reverts, movement feedback and stats polling.
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use arduino_ctl::client::DeviceApi;
use arduino_ctl::surface::{ControlSurface, FeedbackLevel};
use arduino_ctl::{
    Channel, CommandResponse, ConfigError, DeviceError, DeviceErrorKind, Direction, MoveCommand, PanelConfig,
    StatsSnapshot,
};
use tokio::sync::Notify;

#[derive(Default)]
struct ScriptedDevice {
    toggle_failure: StdMutex<Option<DeviceErrorKind>>,
    command_failure: StdMutex<Option<DeviceErrorKind>>,
    toggle_message: StdMutex<Option<String>>,
    // when set, set_toggle waits for a notification before answering
    toggle_gate: Option<Arc<Notify>>,
    // same for move_in
    command_gate: Option<Arc<Notify>>,
    toggle_calls: StdMutex<Vec<(Channel, bool)>>,
    commands: StdMutex<Vec<MoveCommand>>,
    stats: StdMutex<Vec<String>>,
    stats_calls: AtomicUsize,
}

impl ScriptedDevice {
    fn gated(gate: Arc<Notify>) -> Self {
        Self {
            toggle_gate: Some(gate),
            ..Default::default()
        }
    }

    fn gated_commands(gate: Arc<Notify>) -> Self {
        Self {
            command_gate: Some(gate),
            ..Default::default()
        }
    }

    fn fail_toggles_with(&self, kind: DeviceErrorKind) {
        *self.toggle_failure.lock().unwrap() = Some(kind);
    }

    fn fail_commands_with(&self, kind: DeviceErrorKind) {
        *self.command_failure.lock().unwrap() = Some(kind);
    }

    fn toggle_calls(&self) -> Vec<(Channel, bool)> {
        self.toggle_calls.lock().unwrap().clone()
    }

    fn respond(&self, failure: Option<DeviceErrorKind>, message: Option<String>) -> Result<CommandResponse, DeviceError> {
        match failure {
            Some(kind) => Err(DeviceError::new(kind)),
            None => Ok(CommandResponse::new("ok", message)),
        }
    }
}

impl DeviceApi for ScriptedDevice {
    async fn move_in(&self, direction: Direction) -> Result<CommandResponse, DeviceError> {
        self.commands.lock().unwrap().push(MoveCommand::Go(direction));
        if let Some(gate) = &self.command_gate {
            gate.notified().await;
        }
        let failure = *self.command_failure.lock().unwrap();
        self.respond(failure, None)
    }

    async fn stop(&self) -> Result<CommandResponse, DeviceError> {
        self.commands.lock().unwrap().push(MoveCommand::Stop);
        let failure = *self.command_failure.lock().unwrap();
        self.respond(failure, Some("Stopped".to_string()))
    }

    async fn set_toggle(&self, channel: Channel, enabled: bool) -> Result<CommandResponse, DeviceError> {
        self.toggle_calls.lock().unwrap().push((channel, enabled));
        if let Some(gate) = &self.toggle_gate {
            gate.notified().await;
        }
        let failure = *self.toggle_failure.lock().unwrap();
        let message = self.toggle_message.lock().unwrap().clone();
        self.respond(failure, message)
    }

    async fn get_stats(&self) -> StatsSnapshot {
        self.stats_calls.fetch_add(1, Ordering::SeqCst);
        StatsSnapshot::new(self.stats.lock().unwrap().clone())
    }
}

fn config() -> PanelConfig {
    PanelConfig {
        poll_interval_ms: 2000,
        ..Default::default()
    }
}

async fn wait_for_toggle_calls(device: &ScriptedDevice, count: usize) {
    for _ in 0..1000 {
        if device.toggle_calls().len() >= count {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("device never saw {} toggle calls", count);
}

#[tokio::test]
async fn test_failed_toggle_reverts_every_channel() {
    let device = Arc::new(ScriptedDevice::default());
    device.fail_toggles_with(DeviceErrorKind::Unreachable);
    let surface = ControlSurface::mount(Arc::clone(&device), &config()).unwrap();

    for channel in Channel::ALL {
        let before = surface.is_enabled(channel).await;
        let err = surface.toggle(channel).await.unwrap_err();

        assert_eq!(err.kind(), DeviceErrorKind::Unreachable);
        assert_eq!(surface.is_enabled(channel).await, before, "{} was not reverted", channel);
    }

    // the device was asked for the flipped value each time
    assert!(device.toggle_calls().iter().all(|(_, enabled)| *enabled));
    surface.teardown().await;
}

#[tokio::test]
async fn test_failed_toggle_off_reverts_to_on() {
    let device = Arc::new(ScriptedDevice::default());
    let surface = ControlSurface::mount(Arc::clone(&device), &config()).unwrap();

    surface.toggle(Channel::Radiowaves).await.unwrap();
    assert!(surface.is_enabled(Channel::Radiowaves).await);

    device.fail_toggles_with(DeviceErrorKind::Timeout);
    let err = surface.toggle(Channel::Radiowaves).await.unwrap_err();

    assert!(err.is_timeout());
    assert!(surface.is_enabled(Channel::Radiowaves).await);
    assert_eq!(
        device.toggle_calls(),
        vec![(Channel::Radiowaves, true), (Channel::Radiowaves, false)]
    );
}

#[tokio::test]
async fn test_magnetic_shows_on_then_reverts_when_unreachable() {
    let gate = Arc::new(Notify::new());
    let device = Arc::new(ScriptedDevice::gated(Arc::clone(&gate)));
    device.fail_toggles_with(DeviceErrorKind::Unreachable);
    let surface = Arc::new(ControlSurface::mount(Arc::clone(&device), &config()).unwrap());

    let task = {
        let surface = Arc::clone(&surface);
        tokio::spawn(async move { surface.toggle(Channel::Magnetic).await })
    };

    wait_for_toggle_calls(&device, 1).await;
    assert!(
        surface.is_enabled(Channel::Magnetic).await,
        "magnetic should read On while the request is in flight"
    );

    gate.notify_one();
    let err = task.await.unwrap().unwrap_err();

    assert_eq!(err.kind(), DeviceErrorKind::Unreachable);
    assert!(!surface.is_enabled(Channel::Magnetic).await);

    let feedback = surface.feedback().await;
    let latest = feedback.latest().unwrap();
    assert_eq!(latest.level, FeedbackLevel::Error);
    assert!(latest.message.contains("magnetic"));
    assert!(latest.message.contains("unreachable"));
}

#[tokio::test]
async fn test_successful_toggle_feedback() {
    let device = Arc::new(ScriptedDevice::default());
    let surface = ControlSurface::mount(Arc::clone(&device), &config()).unwrap();

    surface.toggle(Channel::Ultrasonic).await.unwrap();
    assert_eq!(
        surface.feedback().await.latest().unwrap().message,
        "ultrasonic enabled"
    );

    *device.toggle_message.lock().unwrap() = Some("Ultrasonic sensor off".to_string());
    surface.toggle(Channel::Ultrasonic).await.unwrap();

    let feedback = surface.feedback().await;
    let latest = feedback.latest().unwrap();
    assert_eq!(latest.level, FeedbackLevel::Success);
    assert_eq!(latest.message, "Ultrasonic sensor off");
    assert!(!surface.is_enabled(Channel::Ultrasonic).await);
}

#[tokio::test]
async fn test_toggles_on_one_channel_are_serialized() {
    let gate = Arc::new(Notify::new());
    let device = Arc::new(ScriptedDevice::gated(Arc::clone(&gate)));
    let surface = Arc::new(ControlSurface::mount(Arc::clone(&device), &config()).unwrap());

    let first = {
        let surface = Arc::clone(&surface);
        tokio::spawn(async move { surface.toggle(Channel::Infrared).await })
    };
    wait_for_toggle_calls(&device, 1).await;

    let second = {
        let surface = Arc::clone(&surface);
        tokio::spawn(async move { surface.toggle(Channel::Infrared).await })
    };
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
    assert_eq!(device.toggle_calls().len(), 1, "second toggle must wait for the first");

    // another channel is not held up
    let other = {
        let surface = Arc::clone(&surface);
        tokio::spawn(async move { surface.toggle(Channel::Magnetic).await })
    };
    wait_for_toggle_calls(&device, 2).await;

    gate.notify_one();
    gate.notify_one();
    gate.notify_one();
    first.await.unwrap().unwrap();
    wait_for_toggle_calls(&device, 3).await;
    gate.notify_one();
    second.await.unwrap().unwrap();
    other.await.unwrap().unwrap();

    let infrared: Vec<bool> = device
        .toggle_calls()
        .into_iter()
        .filter(|(channel, _)| *channel == Channel::Infrared)
        .map(|(_, enabled)| enabled)
        .collect();
    assert_eq!(infrared, vec![true, false]);
    assert!(!surface.is_enabled(Channel::Infrared).await);
    assert!(surface.is_enabled(Channel::Magnetic).await);
}

#[tokio::test]
async fn test_command_feedback_and_busy() {
    let device = Arc::new(ScriptedDevice::default());
    let surface = ControlSurface::mount(Arc::clone(&device), &config()).unwrap();

    surface.command(MoveCommand::Go(Direction::Up)).await.unwrap();
    assert_eq!(surface.feedback().await.latest().unwrap().message, "up sent");

    surface.command(MoveCommand::Stop).await.unwrap();
    assert_eq!(surface.feedback().await.latest().unwrap().message, "Stopped");
    assert_eq!(surface.busy().await, None);

    device.fail_commands_with(DeviceErrorKind::CommunicationFailure);
    let err = surface.command(MoveCommand::Go(Direction::Left)).await.unwrap_err();
    assert_eq!(err.kind(), DeviceErrorKind::CommunicationFailure);

    let feedback = surface.feedback().await;
    let latest = feedback.latest().unwrap();
    assert!(latest.is_error());
    assert!(latest.message.contains("left"));
    assert_eq!(surface.busy().await, None);

    assert_eq!(
        *device.commands.lock().unwrap(),
        vec![
            MoveCommand::Go(Direction::Up),
            MoveCommand::Stop,
            MoveCommand::Go(Direction::Left)
        ]
    );
}

#[tokio::test]
async fn test_overlapping_commands_stay_busy_until_the_last_reply() {
    let gate = Arc::new(Notify::new());
    let device = Arc::new(ScriptedDevice::gated_commands(Arc::clone(&gate)));
    let surface = Arc::new(ControlSurface::mount(Arc::clone(&device), &config()).unwrap());
    let up = MoveCommand::Go(Direction::Up);

    let sends: Vec<_> = (0..2)
        .map(|_| {
            let surface = Arc::clone(&surface);
            tokio::spawn(async move { surface.command(up).await })
        })
        .collect();
    for _ in 0..1000 {
        if device.commands.lock().unwrap().len() == 2 {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(device.commands.lock().unwrap().len(), 2);
    assert_eq!(surface.busy().await, Some(up));

    gate.notify_one();
    for _ in 0..1000 {
        if surface.feedback().await.len() == 1 {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(surface.feedback().await.len(), 1);
    assert_eq!(surface.busy().await, Some(up), "second send is still in flight");

    gate.notify_one();
    for send in sends {
        send.await.unwrap().unwrap();
    }
    assert_eq!(surface.busy().await, None);
}

#[tokio::test]
async fn test_mount_rejects_zero_poll_interval() {
    let device = Arc::new(ScriptedDevice::default());
    let config = PanelConfig {
        poll_interval_ms: 0,
        ..Default::default()
    };

    let err = ControlSurface::mount(Arc::clone(&device), &config).err();
    assert_eq!(err, Some(ConfigError::ZeroPollInterval));

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(device.stats_calls.load(Ordering::SeqCst), 0, "no poller was started");
}

#[tokio::test(start_paused = true)]
async fn test_polls_immediately_then_every_interval_until_teardown() {
    let device = Arc::new(ScriptedDevice::default());
    let surface = ControlSurface::mount(Arc::clone(&device), &config()).unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(device.stats_calls.load(Ordering::SeqCst), 1, "first fetch is immediate");

    tokio::time::sleep(Duration::from_millis(2000)).await;
    assert_eq!(device.stats_calls.load(Ordering::SeqCst), 2);

    tokio::time::sleep(Duration::from_millis(2000)).await;
    assert_eq!(device.stats_calls.load(Ordering::SeqCst), 3);

    surface.teardown().await;
    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(device.stats_calls.load(Ordering::SeqCst), 3, "no fetch after teardown");
    assert!(!surface.is_polling().await);
}

#[tokio::test(start_paused = true)]
async fn test_each_poll_replaces_the_snapshot() {
    let device = Arc::new(ScriptedDevice::default());
    *device.stats.lock().unwrap() = vec!["old=1".to_string(), "older=2".to_string(), "x".to_string()];
    let surface = ControlSurface::mount(Arc::clone(&device), &config()).unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(surface.snapshot().len(), 3);

    *device.stats.lock().unwrap() = vec!["temp=22C".to_string(), "battery=81%".to_string()];
    tokio::time::sleep(Duration::from_millis(2000)).await;
    assert_eq!(surface.snapshot().lines(), ["temp=22C", "battery=81%"]);

    device.stats.lock().unwrap().clear();
    tokio::time::sleep(Duration::from_millis(2000)).await;
    assert!(surface.snapshot().is_empty());
}
