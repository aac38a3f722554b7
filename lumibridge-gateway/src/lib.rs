use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use rumqttc::{AsyncClient, MqttOptions, QoS};

use lumibridge_core::serial::PORT_WARMUP;
use lumibridge_core::settings::{Settings, client_id};
use lumibridge_core::types::{DATA_MARKER, POLL_BYTE};
use lumibridge_core::{SerialLink, UartLink};

/// Extract the integer reading from a sensor reply line. The firmware
/// prints free-form text around the marker, so anything before it is
/// ignored and anything after it must parse as the value.
pub fn parse_sensor_line(line: &str) -> Option<i64> {
    let (_, rest) = line.split_once(DATA_MARKER)?;

    rest.trim().parse().ok()
}

/// One poll exchange: poll byte out, then one reply line if the sensor
/// answered in time. `None` when it stayed silent or the line had no
/// usable reading.
pub fn poll_once<L: SerialLink>(link: &mut L) -> Result<Option<i64>, lumibridge_core::Error> {
    link.write_byte(POLL_BYTE)?;

    match link.try_read_line()? {
        Some(line) => {
            let value = parse_sensor_line(&line);
            if value.is_none() {
                tracing::warn!("unrecognized sensor line: {:?}", line);
            }
            Ok(value)
        }
        None => Ok(None),
    }
}

/// Run the gateway node until Ctrl-C: poll the sensor on a fixed cadence
/// and publish every reading as its decimal string.
pub async fn run(settings: Arc<Settings>) -> Result<(), Box<dyn Error>> {
    let mut link = UartLink::open(&settings.gateway.port_path, settings.gateway.baud_rate)?;
    tokio::time::sleep(PORT_WARMUP).await;

    let mut options = MqttOptions::new(
        client_id("gateway"),
        &settings.broker.host,
        settings.broker.port,
    );
    options.set_keep_alive(Duration::from_secs(5));

    let (client, mut event_loop) = AsyncClient::new(options, 10);

    // The gateway only publishes; a background task keeps the connection
    // alive and absorbs acks.
    tokio::spawn(async move {
        loop {
            if let Err(e) = event_loop.poll().await {
                tracing::error!("mqtt error: {}", e);
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    });

    let mut interval =
        tokio::time::interval(Duration::from_secs(settings.gateway.poll_interval_secs));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupt received, shutting down");
                break;
            }
            _ = interval.tick() => match poll_once(&mut link) {
                Ok(Some(value)) => {
                    tracing::debug!("publishing reading: {}", value);

                    if let Err(e) = client
                        .publish(
                            &settings.topics.luminosity,
                            QoS::AtLeastOnce,
                            false,
                            value.to_string(),
                        )
                        .await
                    {
                        tracing::error!("failed to publish reading: {}", e);
                    }
                }
                Ok(None) => {}
                Err(e) => tracing::error!("sensor poll failed: {}", e),
            }
        }
    }

    client.disconnect().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumibridge_core::mock::ScriptedLink;

    #[test]
    fn test_parse_sensor_line() {
        assert_eq!(parse_sensor_line("DATA:42"), Some(42));
        assert_eq!(parse_sensor_line("lux DATA: 7"), Some(7));
        assert_eq!(parse_sensor_line("DATA:"), None);
        assert_eq!(parse_sensor_line("DATA:4x2"), None);
        assert_eq!(parse_sensor_line("noise"), None);
    }

    #[test]
    fn test_poll_once_sends_poll_byte_and_parses_reply() {
        let mut link = ScriptedLink::new().with_reply("DATA:33");

        let value = poll_once(&mut link).unwrap();

        assert_eq!(value, Some(33));
        assert_eq!(link.written_bytes(), vec![b'p']);
    }

    #[test]
    fn test_poll_once_on_silent_sensor() {
        let mut link = ScriptedLink::new();

        assert_eq!(poll_once(&mut link).unwrap(), None);
    }
}
