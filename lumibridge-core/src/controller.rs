use crate::error::{Error, Result};
use crate::serial::SerialLink;
use crate::types::{Command, LedStatus};

/// Decides on every luminosity reading whether the LED must change state,
/// and talks to the actuator device when it must.
///
/// Owns the only copy of the LED status in the process. Readings are
/// expected to arrive one at a time, in bus order, so there is no locking
/// here; the hosting loop must not call into the controller concurrently.
pub struct LightController<L: SerialLink> {
    link: L,
    threshold: i64,
    status: LedStatus,
}

impl<L: SerialLink> LightController<L> {
    pub fn new(link: L, threshold: i64) -> Self {
        Self {
            link,
            threshold,
            status: LedStatus::Unknown,
        }
    }

    pub fn status(&self) -> LedStatus {
        self.status
    }

    /// Force the device into a known state before accepting any readings.
    /// Issues one unconditional LOWER; on success the status is `Off`.
    pub fn reset(&mut self) -> Result<()> {
        self.link.write_byte(Command::Lower.wire_byte())?;
        self.status = LedStatus::Off;

        Ok(())
    }

    /// Handle one raw payload from the luminosity topic.
    ///
    /// Returns the device's state report when a command was issued and the
    /// device answered within the settle window, `None` when nothing needed
    /// to change or the device stayed silent. A reading on the same side of
    /// the threshold as the current status is a no-op: no write, no read.
    ///
    /// The status only advances after a successful write. A failed write
    /// aborts this reading and leaves the status as it was; a failed or
    /// silent read after a successful write does not roll anything back,
    /// the command is assumed to have taken effect.
    pub fn handle_reading(&mut self, payload: &[u8]) -> Result<Option<String>> {
        let text = String::from_utf8_lossy(payload);
        let value: i64 = text
            .trim()
            .parse()
            .map_err(|_| Error::MalformedReading(text.to_string()))?;

        let desired = if value < self.threshold {
            LedStatus::On
        } else {
            LedStatus::Off
        };

        if desired == self.status {
            tracing::debug!("reading {} leaves led {:?}", value, self.status);
            return Ok(None);
        }

        let command = match desired {
            LedStatus::On => Command::Raise,
            _ => Command::Lower,
        };

        tracing::debug!("reading {} -> {:?}", value, command);

        self.link.write_byte(command.wire_byte())?;
        self.status = desired;

        self.link.try_read_line()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::ScriptedLink;

    const THRESHOLD: i64 = 40;

    fn controller_at(status: LedStatus, link: ScriptedLink) -> LightController<ScriptedLink> {
        let mut controller = LightController::new(link, THRESHOLD);
        if status == LedStatus::Off {
            controller.reset().unwrap();
            controller.link.written.lock().unwrap().clear();
        }
        controller
    }

    #[test]
    fn test_starts_unknown_and_reset_forces_off() {
        let link = ScriptedLink::new();
        let mut controller = LightController::new(link.clone(), THRESHOLD);
        assert_eq!(controller.status(), LedStatus::Unknown);

        controller.reset().unwrap();

        assert_eq!(controller.status(), LedStatus::Off);
        assert_eq!(link.written_bytes(), vec![b'd']);
    }

    #[test]
    fn test_dark_reading_raises_once() {
        let link = ScriptedLink::new();
        let mut controller = controller_at(LedStatus::Off, link.clone());

        // Repeated sub-threshold readings must not re-trigger the command.
        controller.handle_reading(b"10").unwrap();
        controller.handle_reading(b"15").unwrap();
        controller.handle_reading(b"0").unwrap();

        assert_eq!(controller.status(), LedStatus::On);
        assert_eq!(link.written_bytes(), vec![b'u']);
    }

    #[test]
    fn test_threshold_value_counts_as_light() {
        let link = ScriptedLink::new();
        let mut controller = controller_at(LedStatus::Off, link.clone());
        controller.handle_reading(b"10").unwrap();

        // Exactly T is "sufficient light", so the LED goes off again.
        controller.handle_reading(b"40").unwrap();

        assert_eq!(controller.status(), LedStatus::Off);
        assert_eq!(link.written_bytes(), vec![b'u', b'd']);
    }

    #[test]
    fn test_no_change_means_no_io_and_no_report() {
        let link = ScriptedLink::new().with_reply("LED_OFF");
        let mut controller = controller_at(LedStatus::Off, link.clone());

        let report = controller.handle_reading(b"55").unwrap();

        assert_eq!(report, None);
        assert!(link.written_bytes().is_empty());
    }

    #[test]
    fn test_crossing_scenario() {
        let link = ScriptedLink::new();
        let mut controller = controller_at(LedStatus::Off, link.clone());

        for payload in [b"10".as_slice(), b"15", b"50", b"5"] {
            controller.handle_reading(payload).unwrap();
        }

        assert_eq!(controller.status(), LedStatus::On);
        assert_eq!(link.written_bytes(), vec![b'u', b'd', b'u']);
    }

    #[test]
    fn test_malformed_payload_is_dropped() {
        let link = ScriptedLink::new();
        let mut controller = controller_at(LedStatus::Off, link.clone());

        let result = controller.handle_reading(b"abc");

        assert!(matches!(result, Err(Error::MalformedReading(_))));
        assert_eq!(controller.status(), LedStatus::Off);
        assert!(link.written_bytes().is_empty());

        // The next well-formed reading goes through untouched.
        controller.handle_reading(b"12").unwrap();
        assert_eq!(controller.status(), LedStatus::On);
    }

    #[test]
    fn test_report_republished_when_device_answers() {
        let link = ScriptedLink::new().with_reply("STATUS:LED_ON");
        let mut controller = controller_at(LedStatus::Off, link);

        let report = controller.handle_reading(b"3").unwrap();

        assert_eq!(report.as_deref(), Some("STATUS:LED_ON"));
    }

    #[test]
    fn test_silent_device_still_updates_status() {
        let link = ScriptedLink::new();
        let mut controller = controller_at(LedStatus::Off, link);

        let report = controller.handle_reading(b"3").unwrap();

        assert_eq!(report, None);
        assert_eq!(controller.status(), LedStatus::On);
    }

    #[test]
    fn test_failed_write_leaves_status_unchanged() {
        let link = ScriptedLink::new().failing_writes();
        let mut controller = LightController::new(link, THRESHOLD);
        controller.status = LedStatus::Off;

        let result = controller.handle_reading(b"3");

        assert!(matches!(result, Err(Error::Io(_))));
        assert_eq!(controller.status(), LedStatus::Off);
    }
}
