use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown label {0:?}")]
    UnknownLabel(String),

    #[error("unknown loop status {0:?}")]
    UnknownLoopStatus(String),

    #[error("D-Bus error: {0}")]
    DBus(#[from] zbus::Error),

    #[error("D-Bus error: {0}")]
    Fdo(#[from] zbus::fdo::Error),

    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
