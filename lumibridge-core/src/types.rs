/// Last-known state of the LED, owned exclusively by the controller.
/// `Unknown` only exists between construction and the startup reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedStatus {
    On,
    Off,
    Unknown,
}

/// Single-byte command understood by the actuator firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Turn the LED on.
    Raise,
    /// Turn the LED off.
    Lower,
}

impl Command {
    pub fn wire_byte(self) -> u8 {
        match self {
            Command::Raise => b'u',
            Command::Lower => b'd',
        }
    }
}

/// Poll request byte understood by the sensor firmware.
pub const POLL_BYTE: u8 = b'p';

/// Marker preceding the integer reading in the sensor's reply line.
pub const DATA_MARKER: &str = "DATA:";

/// Substrings the monitor looks for in a state report.
pub const REPORT_ON: &str = "LED_ON";
pub const REPORT_OFF: &str = "LED_OFF";
