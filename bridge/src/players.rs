//! The set of MPRIS players on the session bus and which one the remote drives.

use crate::error::Result;
use crate::loop_status::LoopStatus;

pub const MPRIS_PREFIX: &str = "org.mpris.MediaPlayer2.";

pub fn is_player_name(name: &str) -> bool {
    name.starts_with(MPRIS_PREFIX)
}

/// `org.mpris.MediaPlayer2.vlc` -> `vlc`.
pub fn short_name(name: &str) -> &str {
    name.strip_prefix(MPRIS_PREFIX).unwrap_or(name)
}

/// The `org.mpris.MediaPlayer2.Player` calls the bridge makes.
pub trait MediaPlayer {
    /// Well-known bus name, e.g. `org.mpris.MediaPlayer2.spotify`.
    fn bus_name(&self) -> &str;

    fn next(&self) -> Result<()>;
    fn previous(&self) -> Result<()>;
    fn play_pause(&self) -> Result<()>;
    fn stop(&self) -> Result<()>;

    fn volume(&self) -> Result<f64>;
    fn set_volume(&self, value: f64) -> Result<()>;

    fn loop_status(&self) -> Result<LoopStatus>;
    fn set_loop_status(&self, value: LoopStatus) -> Result<()>;
}

/// A player appeared on or left the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
    Added(String),
    Removed(String),
}

/// Interprets a `NameOwnerChanged` signal. Owners are `None` when empty.
///
/// A name that only changes hands is neither added nor removed.
pub fn owner_change(
    name: &str,
    old_owner: Option<&str>,
    new_owner: Option<&str>,
) -> Option<PlayerEvent> {
    if !is_player_name(name) {
        return None;
    }
    match (old_owner, new_owner) {
        (None, Some(_)) => Some(PlayerEvent::Added(name.to_string())),
        (Some(_), None) => Some(PlayerEvent::Removed(name.to_string())),
        _ => None,
    }
}

/// Players sorted by bus name, plus a cursor for the one in control.
///
/// The cursor is an index, so it can land on a different player when the
/// list changes underneath it. Removing a player at or before the cursor
/// steps it back by one.
#[derive(Debug)]
pub struct PlayerRoster<P> {
    players: Vec<P>,
    current: usize,
}

impl<P: MediaPlayer> PlayerRoster<P> {
    pub fn new(players: Vec<P>) -> Self {
        let mut roster = PlayerRoster {
            players,
            current: 0,
        };
        roster.sort();
        roster
    }

    fn sort(&mut self) {
        self.players.sort_by(|a, b| a.bus_name().cmp(b.bus_name()));
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.players.iter().any(|p| p.bus_name() == name)
    }

    /// Adds a player. A name already present is ignored.
    pub fn add(&mut self, player: P) {
        if self.contains(player.bus_name()) {
            return;
        }
        self.players.push(player);
        self.sort();
    }

    pub fn remove(&mut self, name: &str) -> Option<P> {
        let index = self.players.iter().position(|p| p.bus_name() == name)?;
        let player = self.players.remove(index);
        if index <= self.current {
            self.select_previous();
        }
        Some(player)
    }

    /// The player remote commands go to; `None` when no player is running.
    pub fn current(&self) -> Option<&P> {
        self.players.get(self.current)
    }

    pub fn select_next(&mut self) {
        let len = self.players.len().max(1);
        self.current = (self.current + 1) % len;
    }

    pub fn select_previous(&mut self) {
        let len = self.players.len().max(1);
        self.current = (self.current + len - 1) % len;
    }
}
