use std::future::Future;

use crate::{Channel, CommandResponse, DeviceError, Direction, MoveCommand, StatsSnapshot};

/// The operations the rover firmware supports.
///
/// `DeviceClient` is the HTTP implementation; the control surface only
/// depends on this trait.
pub trait DeviceApi: Send + Sync + 'static {
    fn move_in(
        &self,
        direction: Direction,
    ) -> impl Future<Output = Result<CommandResponse, DeviceError>> + Send;

    fn stop(&self) -> impl Future<Output = Result<CommandResponse, DeviceError>> + Send;

    fn set_toggle(
        &self,
        channel: Channel,
        enabled: bool,
    ) -> impl Future<Output = Result<CommandResponse, DeviceError>> + Send;

    /// Never fails: any problem yields an empty snapshot.
    fn get_stats(&self) -> impl Future<Output = StatsSnapshot> + Send;

    fn command(
        &self,
        command: MoveCommand,
    ) -> impl Future<Output = Result<CommandResponse, DeviceError>> + Send {
        async move {
            match command {
                MoveCommand::Go(direction) => self.move_in(direction).await,
                MoveCommand::Stop => self.stop().await,
            }
        }
    }
}
