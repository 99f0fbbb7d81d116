//! Line framing for the label stream.
//!
//! The USB endpoint accepts whatever fits and reports "full" for the rest.
//! A label cut off mid-line would otherwise run into the next one, so the
//! framer remembers the cut and terminates it before the next line goes out.

/// Why a [`Sink`] did not take the bytes offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SinkError {
    /// No room right now. Nothing was written by this call.
    Full,
    /// The transport failed.
    Failed,
}

/// Non-blocking byte transport, such as a CDC serial port.
pub trait Sink {
    /// Writes a prefix of `data` and returns its length.
    fn try_write(&mut self, data: &[u8]) -> Result<usize, SinkError>;
}

#[derive(Debug, Default)]
pub struct LineFramer {
    cut: bool,
}

impl LineFramer {
    pub const fn new() -> Self {
        LineFramer { cut: false }
    }

    /// True while the last line went out partially and is still unterminated.
    pub fn is_cut(&self) -> bool {
        self.cut
    }

    /// Sends one line, dropping whatever does not fit.
    ///
    /// After a partial write the next call first sends `\r\n`. If even that
    /// does not fit, the new line is dropped whole.
    pub fn write_line<S: Sink>(&mut self, sink: &mut S, line: &[u8]) -> Result<(), SinkError> {
        if self.cut {
            if write_some(sink, b"\r\n")? < 2 {
                return Ok(());
            }
            self.cut = false;
        }

        let written = write_some(sink, line)?;
        self.cut = written > 0 && written < line.len();
        Ok(())
    }
}

fn write_some<S: Sink>(sink: &mut S, data: &[u8]) -> Result<usize, SinkError> {
    let mut written = 0;
    while written < data.len() {
        match sink.try_write(&data[written..]) {
            Ok(0) | Err(SinkError::Full) => break,
            Ok(count) => written += count,
            Err(SinkError::Failed) => return Err(SinkError::Failed),
        }
    }
    Ok(written)
}
