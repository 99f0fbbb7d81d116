#![cfg_attr(not(test), no_std)]

//! Remote-control dispatch for the IR power/lights controller.
//!
//! Everything in here is hardware agnostic: pins and delays come in through
//! the `embedded-hal` traits, and the IR receiver through [`Receiver`]. The
//! board crate wires these up to real peripherals.

pub mod actions;
pub mod config;
pub mod console;
pub mod dispatcher;
pub mod nec;
pub mod receiver;

pub use actions::{lookup, Action, PinEffect, ACTIONS, REPEAT_CODE};
pub use dispatcher::{Dispatch, Dispatcher, LightsState};
pub use console::{LineFramer, Sink, SinkError};
pub use nec::{frame_code, NecReceiver};
pub use receiver::Receiver;

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The power button output refused a level change.
    PowerPin,
    /// The lights output refused a level change.
    LightsPin,
    /// The diagnostic log sink failed to accept a label.
    Log,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::PowerPin => f.write_str("power pin write failed"),
            Error::LightsPin => f.write_str("lights pin write failed"),
            Error::Log => f.write_str("log write failed"),
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
