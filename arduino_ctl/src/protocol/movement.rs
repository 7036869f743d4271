use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];
}

/// Everything the drive buttons can ask of the rover.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MoveCommand {
    Go(Direction),
    Stop,
}

impl MoveCommand {
    pub const ALL: [MoveCommand; 5] = [
        MoveCommand::Go(Direction::Up),
        MoveCommand::Go(Direction::Down),
        MoveCommand::Go(Direction::Left),
        MoveCommand::Go(Direction::Right),
        MoveCommand::Stop,
    ];

    /// Path segment used by firmware that takes `GET /{command}`.
    pub fn path_segment(&self) -> &'static str {
        match self {
            MoveCommand::Go(Direction::Up) => "up",
            MoveCommand::Go(Direction::Down) => "down",
            MoveCommand::Go(Direction::Left) => "left",
            MoveCommand::Go(Direction::Right) => "right",
            MoveCommand::Stop => "stop",
        }
    }

    /// Per-wheel codes used by firmware that takes `POST /motors`.
    ///
    /// Turning is done by slowing one side (`SF`) while the other keeps
    /// full forward.
    pub fn motor_codes(&self) -> MotorCommands {
        use MotorCode::*;

        let commands = match self {
            MoveCommand::Go(Direction::Up) => [Forward, Forward, Forward, Forward],
            MoveCommand::Go(Direction::Down) => [Backward, Backward, Backward, Backward],
            MoveCommand::Go(Direction::Left) => [SlowForward, Forward, SlowForward, Forward],
            MoveCommand::Go(Direction::Right) => [Forward, SlowForward, Forward, SlowForward],
            MoveCommand::Stop => [Stop, Stop, Stop, Stop],
        };

        MotorCommands { commands }
    }
}

impl From<Direction> for MoveCommand {
    fn from(direction: Direction) -> Self {
        MoveCommand::Go(direction)
    }
}

impl fmt::Display for MoveCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl FromStr for MoveCommand {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MoveCommand::ALL
            .into_iter()
            .find(|command| command.path_segment().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownName(s.to_string()))
    }
}

/// Motion code for a single wheel.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotorCode {
    #[serde(rename = "FF")]
    Forward,
    #[serde(rename = "SF")]
    SlowForward,
    #[serde(rename = "B")]
    Backward,
    #[serde(rename = "S")]
    Stop,
}

impl MotorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MotorCode::Forward => "FF",
            MotorCode::SlowForward => "SF",
            MotorCode::Backward => "B",
            MotorCode::Stop => "S",
        }
    }
}

impl fmt::Display for MotorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /motors`, one code per wheel.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorCommands {
    pub commands: [MotorCode; 4],
}

impl MotorCommands {
    pub fn halted() -> Self {
        MoveCommand::Stop.motor_codes()
    }
}

impl fmt::Display for MotorCommands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes: Vec<&str> = self.commands.iter().map(MotorCode::as_str).collect();
        f.write_str(&codes.join(","))
    }
}

/// Which movement encoding the firmware understands. Exactly one is active
/// per client.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MovementProtocol {
    /// `POST /motors` with per-wheel codes.
    #[default]
    Motors,
    /// `GET /{up|down|left|right|stop}`.
    Path,
}

impl fmt::Display for MovementProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovementProtocol::Motors => write!(f, "motors"),
            MovementProtocol::Path => write!(f, "path"),
        }
    }
}

impl FromStr for MovementProtocol {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "motors" => Ok(MovementProtocol::Motors),
            "path" => Ok(MovementProtocol::Path),
            _ => Err(ConfigError::UnknownName(s.to_string())),
        }
    }
}
