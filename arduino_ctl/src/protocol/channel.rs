use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One of the rover's independently switchable sensor subsystems.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Ultrasonic,
    Magnetic,
    #[serde(rename = "IR", alias = "infrared")]
    Infrared,
    Radiowaves,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::Ultrasonic,
        Channel::Magnetic,
        Channel::Infrared,
        Channel::Radiowaves,
    ];

    /// Endpoint name on the firmware. Note the infrared sensor lives at `/IR`.
    pub fn path_segment(&self) -> &'static str {
        match self {
            Channel::Ultrasonic => "ultrasonic",
            Channel::Magnetic => "magnetic",
            Channel::Infrared => "IR",
            Channel::Radiowaves => "radiowaves",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Channel::Ultrasonic => "ultrasonic",
            Channel::Magnetic => "magnetic",
            Channel::Infrared => "infrared",
            Channel::Radiowaves => "radiowaves",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Channel::Ultrasonic => 0,
            Channel::Magnetic => 1,
            Channel::Infrared => 2,
            Channel::Radiowaves => 3,
        }
    }

    pub fn from_path_segment(segment: &str) -> Option<Channel> {
        Channel::ALL
            .into_iter()
            .find(|channel| channel.path_segment() == segment)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Channel {
    type Err = ConfigError;

    /// Accepts the label or the endpoint name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Channel::ALL
            .into_iter()
            .find(|channel| {
                channel.label().eq_ignore_ascii_case(s) || channel.path_segment().eq_ignore_ascii_case(s)
            })
            .ok_or_else(|| ConfigError::UnknownName(s.to_string()))
    }
}
