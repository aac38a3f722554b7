use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Inbound payload did not parse as a decimal integer. Recovered per
    /// message: the reading is dropped and no serial I/O happens.
    #[error("payload is not a decimal integer: {0:?}")]
    MalformedReading(String),

    /// The serial device could not be opened at startup. Fatal for the
    /// hosting process; restarting is an operator concern.
    #[error("serial port unavailable: {0}")]
    PortUnavailable(#[source] serialport::Error),

    /// Write or read failed on an already open serial handle. Aborts the
    /// current exchange, no retry.
    #[error("serial i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
