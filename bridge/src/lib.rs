//! Host side of the IR power/lights controller.
//!
//! The controller prints the label of every recognised button on its USB
//! serial port. This crate reads those lines and drives whichever MPRIS
//! media player is in control: transport, volume and loop status, with UP
//! and DOWN switching between players.

pub mod command;
pub mod error;
pub mod loop_status;
pub mod message;
pub mod mpris;
pub mod players;
pub mod serial;

pub use command::{handle_line, Command, PlayerCommand};
pub use error::{Error, Result};
pub use loop_status::LoopStatus;
pub use message::SerialMessage;
pub use players::{MediaPlayer, PlayerEvent, PlayerRoster};
