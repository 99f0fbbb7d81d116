//! Labels the controller prints on its serial port.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// One line of the controller's label stream that the bridge acts on.
///
/// The digit buttons and `REPEAT LAST` are printed too but carry no player
/// meaning, so they fail to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialMessage {
    Power,
    Stop,
    VolumePlus,
    VolumeMinus,
    FastBack,
    FastForward,
    Pause,
    Down,
    Up,
    Equal,
    Repeat,
}

impl SerialMessage {
    pub const ALL: [SerialMessage; 11] = [
        SerialMessage::Power,
        SerialMessage::Stop,
        SerialMessage::VolumePlus,
        SerialMessage::VolumeMinus,
        SerialMessage::FastBack,
        SerialMessage::FastForward,
        SerialMessage::Pause,
        SerialMessage::Down,
        SerialMessage::Up,
        SerialMessage::Equal,
        SerialMessage::Repeat,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SerialMessage::Power => "POWER",
            SerialMessage::Stop => "FUNC/STOP",
            SerialMessage::VolumePlus => "VOL+",
            SerialMessage::VolumeMinus => "VOL-",
            SerialMessage::FastBack => "FAST BACK",
            SerialMessage::FastForward => "FAST FORWARD",
            SerialMessage::Pause => "PAUSE",
            SerialMessage::Down => "DOWN",
            SerialMessage::Up => "UP",
            SerialMessage::Equal => "EQ",
            SerialMessage::Repeat => "ST/REPT",
        }
    }
}

impl FromStr for SerialMessage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SerialMessage::ALL
            .into_iter()
            .find(|message| message.label() == s)
            .ok_or_else(|| Error::UnknownLabel(s.to_string()))
    }
}

impl fmt::Display for SerialMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
