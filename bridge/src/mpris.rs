//! MPRIS players over the D-Bus session bus.
//!
//! See <https://specifications.freedesktop.org/mpris-spec/latest/>.

use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use log::{debug, error};
use zbus::blocking::fdo::DBusProxy;
use zbus::blocking::Connection;
use zbus::proxy::CacheProperties;

use crate::error::Result;
use crate::loop_status::LoopStatus;
use crate::players::{is_player_name, owner_change, MediaPlayer, PlayerEvent};

#[zbus::proxy(
    interface = "org.mpris.MediaPlayer2.Player",
    default_path = "/org/mpris/MediaPlayer2"
)]
trait Player {
    fn next(&self) -> zbus::Result<()>;
    fn previous(&self) -> zbus::Result<()>;
    fn play_pause(&self) -> zbus::Result<()>;
    fn stop(&self) -> zbus::Result<()>;

    #[zbus(property)]
    fn volume(&self) -> zbus::Result<f64>;
    #[zbus(property)]
    fn set_volume(&self, value: f64) -> zbus::Result<()>;

    #[zbus(property)]
    fn loop_status(&self) -> zbus::Result<String>;
    #[zbus(property)]
    fn set_loop_status(&self, value: &str) -> zbus::Result<()>;
}

pub struct MprisPlayer {
    name: String,
    proxy: PlayerProxyBlocking<'static>,
}

impl MprisPlayer {
    pub fn connect(conn: &Connection, name: String) -> Result<Self> {
        // Volume and loop status are read right before writing them back.
        let proxy = PlayerProxyBlocking::builder(conn)
            .destination(name.clone())?
            .cache_properties(CacheProperties::No)
            .build()?;
        Ok(MprisPlayer { name, proxy })
    }
}

impl MediaPlayer for MprisPlayer {
    fn bus_name(&self) -> &str {
        &self.name
    }

    fn next(&self) -> Result<()> {
        Ok(self.proxy.next()?)
    }

    fn previous(&self) -> Result<()> {
        Ok(self.proxy.previous()?)
    }

    fn play_pause(&self) -> Result<()> {
        Ok(self.proxy.play_pause()?)
    }

    fn stop(&self) -> Result<()> {
        Ok(self.proxy.stop()?)
    }

    fn volume(&self) -> Result<f64> {
        Ok(self.proxy.volume()?)
    }

    fn set_volume(&self, value: f64) -> Result<()> {
        Ok(self.proxy.set_volume(value)?)
    }

    fn loop_status(&self) -> Result<LoopStatus> {
        self.proxy.loop_status()?.parse()
    }

    fn set_loop_status(&self, value: LoopStatus) -> Result<()> {
        Ok(self.proxy.set_loop_status(value.as_str())?)
    }
}

/// Players already on the bus at startup.
pub fn list_players(conn: &Connection) -> Result<Vec<MprisPlayer>> {
    let dbus = DBusProxy::new(conn)?;
    dbus.list_names()?
        .into_iter()
        .map(|name| name.to_string())
        .filter(|name| is_player_name(name))
        .map(|name| MprisPlayer::connect(conn, name))
        .collect()
}

/// Forwards players appearing and leaving to `events` from a background
/// thread. The thread ends when the receiving side hangs up.
pub fn watch_players(conn: Connection, events: Sender<PlayerEvent>) -> JoinHandle<()> {
    thread::spawn(move || {
        if let Err(e) = forward_owner_changes(&conn, &events) {
            error!("player watch stopped: {}", e);
        }
    })
}

fn forward_owner_changes(conn: &Connection, events: &Sender<PlayerEvent>) -> Result<()> {
    let dbus = DBusProxy::new(conn)?;
    for signal in dbus.receive_name_owner_changed()? {
        let args = signal.args()?;
        let old_owner = Option::as_ref(args.old_owner()).map(|owner| owner.as_str());
        let new_owner = Option::as_ref(args.new_owner()).map(|owner| owner.as_str());

        let Some(event) = owner_change(args.name().as_str(), old_owner, new_owner) else {
            continue;
        };
        debug!("{:?}", event);
        if events.send(event).is_err() {
            break;
        }
    }
    Ok(())
}
