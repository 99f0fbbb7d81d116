//! What each remote button does to the media players.

use log::{debug, info, warn};

use crate::error::Result;
use crate::message::SerialMessage;
use crate::players::{short_name, MediaPlayer, PlayerRoster};

/// Volume change per VOL+ / VOL- press.
pub const VOLUME_STEP: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerCommand {
    Stop,
    Next,
    Previous,
    PlayPause,
    /// Relative volume change, clamped to `0.0..=1.0`.
    Volume(f64),
    CycleLoopStatus,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Sent to the player in control.
    Player(PlayerCommand),
    NextPlayer,
    PreviousPlayer,
}

impl Command {
    /// `None` for buttons the bridge leaves alone (POWER is handled by the
    /// controller itself, EQ has no MPRIS equivalent).
    pub fn for_message(message: SerialMessage) -> Option<Command> {
        let command = match message {
            SerialMessage::Power | SerialMessage::Equal => return None,
            SerialMessage::Stop => Command::Player(PlayerCommand::Stop),
            SerialMessage::VolumePlus => Command::Player(PlayerCommand::Volume(VOLUME_STEP)),
            SerialMessage::VolumeMinus => Command::Player(PlayerCommand::Volume(-VOLUME_STEP)),
            SerialMessage::FastBack => Command::Player(PlayerCommand::Previous),
            SerialMessage::FastForward => Command::Player(PlayerCommand::Next),
            SerialMessage::Pause => Command::Player(PlayerCommand::PlayPause),
            SerialMessage::Repeat => Command::Player(PlayerCommand::CycleLoopStatus),
            SerialMessage::Down => Command::PreviousPlayer,
            SerialMessage::Up => Command::NextPlayer,
        };
        Some(command)
    }
}

pub fn execute<P: MediaPlayer>(command: Command, roster: &mut PlayerRoster<P>) -> Result<()> {
    match command {
        Command::Player(command) => match roster.current() {
            Some(player) => run(command, player),
            None => {
                debug!("no player for {:?}", command);
                Ok(())
            }
        },
        Command::NextPlayer => {
            roster.select_next();
            announce(roster);
            Ok(())
        }
        Command::PreviousPlayer => {
            roster.select_previous();
            announce(roster);
            Ok(())
        }
    }
}

fn announce<P: MediaPlayer>(roster: &PlayerRoster<P>) {
    if let Some(player) = roster.current() {
        info!("controlling {}", short_name(player.bus_name()));
    }
}

fn run<P: MediaPlayer>(command: PlayerCommand, player: &P) -> Result<()> {
    debug!("{:?} -> {}", command, short_name(player.bus_name()));
    match command {
        PlayerCommand::Stop => player.stop(),
        PlayerCommand::Next => player.next(),
        PlayerCommand::Previous => player.previous(),
        PlayerCommand::PlayPause => player.play_pause(),
        PlayerCommand::Volume(delta) => {
            let volume = (player.volume()? + delta).clamp(0.0, 1.0);
            player.set_volume(volume)
        }
        PlayerCommand::CycleLoopStatus => {
            let status = player.loop_status()?.next();
            player.set_loop_status(status)
        }
    }
}

/// Handles one line from the controller. Lines that are not a known label
/// (digits, `REPEAT LAST`, a label cut short by a full endpoint) are skipped.
pub fn handle_line<P: MediaPlayer>(line: &str, roster: &mut PlayerRoster<P>) -> Result<()> {
    let message = match line.parse::<SerialMessage>() {
        Ok(message) => message,
        Err(e) => {
            if !line.is_empty() {
                warn!("ignoring line: {}", e);
            }
            return Ok(());
        }
    };

    match Command::for_message(message) {
        Some(command) => execute(command, roster),
        None => {
            debug!("{} has no player command", message);
            Ok(())
        }
    }
}
