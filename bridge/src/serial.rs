//! Serial connection to the controller.

use std::io::{self, Read};
use std::time::Duration;

use serialport::SerialPort;

use crate::error::Result;

/// The controller's CDC port ignores the baud rate; 9600 matches the
/// original sketch's `Serial.begin`.
pub const DEFAULT_BAUD: u32 = 9600;

/// How long a read waits before the caller gets to service player events.
pub const READ_TIMEOUT: Duration = Duration::from_millis(100);

pub fn open(path: &str, baud: u32) -> Result<Box<dyn SerialPort>> {
    let port = serialport::new(path, baud).timeout(READ_TIMEOUT).open()?;
    Ok(port)
}

/// Splits a byte stream into `\r\n` terminated lines.
///
/// Partial lines survive read timeouts and are completed by later reads.
pub struct LineReader<R> {
    inner: R,
    pending: Vec<u8>,
}

impl<R: Read> LineReader<R> {
    pub fn new(inner: R) -> Self {
        LineReader {
            inner,
            pending: Vec::new(),
        }
    }

    /// Returns the next complete line without its terminator, or `None` if
    /// none arrived before the read timed out.
    pub fn next_line(&mut self) -> io::Result<Option<String>> {
        loop {
            if let Some(end) = self.pending.iter().position(|&b| b == b'\n') {
                let mut line: Vec<u8> = self.pending.drain(..=end).collect();
                line.pop();
                // Handle carriage returns
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
            }

            let mut chunk = [0u8; 64];
            match self.inner.read(&mut chunk) {
                Ok(0) => return Ok(None),
                Ok(count) => self.pending.extend_from_slice(&chunk[..count]),
                Err(ref e) if e.kind() == io::ErrorKind::TimedOut => return Ok(None),
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }
}
