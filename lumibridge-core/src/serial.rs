use std::io::Read;
use std::thread;
use std::time::Duration;

use serialport::SerialPort;

use crate::error::{Error, Result};

/// Pause before checking for a reply, so the device has time to answer.
pub const SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Pause after opening a port. The microcontroller resets on DTR toggle
/// and drops anything written while its bootloader is still running.
pub const PORT_WARMUP: Duration = Duration::from_secs(2);

/// Byte-oriented channel to a microcontroller: fire-and-forget single-byte
/// writes, plus a bounded check for one line of reply.
pub trait SerialLink {
    fn write_byte(&mut self, byte: u8) -> Result<()>;

    /// Wait out the settle delay, then read one newline-terminated line if
    /// the device produced any bytes. Returns `None` when it stayed silent.
    fn try_read_line(&mut self) -> Result<Option<String>>;
}

/// `SerialLink` over a real UART via the `serialport` crate.
pub struct UartLink {
    port: Box<dyn SerialPort>,
    settle: Duration,
}

impl UartLink {
    /// Open failures are fatal for the hosting process; there is no retry
    /// loop here.
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        tracing::debug!("connect to port: {}", path);

        let port = serialport::new(path, baud_rate)
            .timeout(Duration::from_millis(500))
            .open()
            .map_err(Error::PortUnavailable)?;

        Ok(Self {
            port,
            settle: SETTLE_DELAY,
        })
    }
}

impl SerialLink for UartLink {
    fn write_byte(&mut self, byte: u8) -> Result<()> {
        use std::io::Write;

        self.port.write_all(&[byte])?;
        self.port.flush()?;

        Ok(())
    }

    fn try_read_line(&mut self) -> Result<Option<String>> {
        thread::sleep(self.settle);

        if self.port.bytes_to_read()? == 0 {
            return Ok(None);
        }

        let mut raw = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            match self.port.read(&mut byte) {
                Ok(0) => break,
                Ok(_) if byte[0] == b'\n' => break,
                Ok(_) => raw.push(byte[0]),
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => break,
                Err(e) => return Err(e.into()),
            }
        }

        let line = String::from_utf8_lossy(&raw).trim().to_string();

        Ok((!line.is_empty()).then_some(line))
    }
}
