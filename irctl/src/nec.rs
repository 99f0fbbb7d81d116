//! NEC frames from the `infrared` decoder, in the remote's tabulated form.
//!
//! `infrared` validates the inverted bytes and hands back the address and
//! command. The codes in [`ACTIONS`](crate::ACTIONS) are the full 32-bit
//! frame with bits in arrival order: address, inverted address, command,
//! inverted command, each byte sent LSB first. POWER (command `0x45`) is
//! therefore `0x00FFA25D`.

use infrared::protocol::nec::NecCommand;

use crate::actions::REPEAT_CODE;
use crate::receiver::Receiver;

/// Rebuilds the 32-bit frame code for a decoded command.
///
/// A repeat frame carries no data of its own and maps to [`REPEAT_CODE`].
pub fn frame_code(command: &NecCommand) -> u32 {
    if command.repeat {
        return REPEAT_CODE;
    }
    [command.addr, !command.addr, command.cmd, !command.cmd]
        .iter()
        .fold(0, |code, byte| (code << 8) | u32::from(byte.reverse_bits()))
}

/// One-frame slot between the edge interrupt and the dispatcher.
#[derive(Debug, Default)]
pub struct NecReceiver {
    frame: Option<u32>,
}

impl NecReceiver {
    pub const fn new() -> Self {
        NecReceiver { frame: None }
    }

    /// Stores the command unless an earlier frame is still waiting.
    pub fn on_command(&mut self, command: &NecCommand) {
        if self.frame.is_none() {
            self.frame = Some(frame_code(command));
        }
    }
}

impl Receiver for NecReceiver {
    fn try_decode(&mut self) -> Option<u32> {
        self.frame
    }

    fn resume(&mut self) {
        self.frame = None;
    }
}
