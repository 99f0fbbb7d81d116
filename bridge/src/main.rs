use std::sync::mpsc;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn, LevelFilter};
use zbus::blocking::Connection;

use ir_mpris_bridge::mpris::{self, MprisPlayer};
use ir_mpris_bridge::players::short_name;
use ir_mpris_bridge::serial::{self, LineReader, DEFAULT_BAUD};
use ir_mpris_bridge::{handle_line, PlayerEvent, PlayerRoster};

/// Drives MPRIS media players from the IR controller's serial labels
#[derive(Parser)]
#[command(name = "ir-mpris-bridge")]
#[command(version, about)]
struct Cli {
    /// Serial port of the controller (e.g. /dev/ttyACM0)
    #[arg(short, long, env = "TTY_PATH")]
    port: String,

    /// Baud rate
    #[arg(short, long, default_value_t = DEFAULT_BAUD)]
    baud: u32,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new().filter_level(level).init();

    let conn = Connection::session().context("Failed to connect to the D-Bus session bus")?;
    let mut roster = PlayerRoster::new(mpris::list_players(&conn).context("Failed to list players")?);
    info!("{} player(s) on the bus", roster.len());

    let (events, player_events) = mpsc::channel();
    mpris::watch_players(conn.clone(), events);

    let port = serial::open(&cli.port, cli.baud)
        .with_context(|| format!("Failed to open serial port: {}", cli.port))?;
    let mut lines = LineReader::new(port);
    info!("listening on {}", cli.port);

    loop {
        for event in player_events.try_iter() {
            apply(&conn, &mut roster, event);
        }

        let Some(line) = lines
            .next_line()
            .context("Failed to read from serial port")?
        else {
            continue;
        };

        if let Err(e) = handle_line(&line, &mut roster) {
            warn!("{}: {}", line, e);
        }
    }
}

fn apply(conn: &Connection, roster: &mut PlayerRoster<MprisPlayer>, event: PlayerEvent) {
    match event {
        PlayerEvent::Added(name) => match MprisPlayer::connect(conn, name.clone()) {
            Ok(player) => {
                info!("player added: {}", short_name(&name));
                roster.add(player);
            }
            Err(e) => warn!("player {}: {}", name, e),
        },
        PlayerEvent::Removed(name) => {
            if roster.remove(&name).is_some() {
                info!("player removed: {}", short_name(&name));
            }
        }
    }
}
