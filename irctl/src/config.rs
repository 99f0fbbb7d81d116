//! Timing constants.

/// How long the power output is held high to simulate a button press.
pub const POWER_PULSE_MS: u32 = 100;

/// Pause after every received frame before the receiver is re-armed.
pub const SETTLE_MS: u32 = 500;
