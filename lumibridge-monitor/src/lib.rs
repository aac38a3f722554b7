use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};

use lumibridge_core::settings::{Settings, client_id};
use lumibridge_core::types::{REPORT_OFF, REPORT_ON};

/// Human line for a luminosity reading: the raw value and which side of
/// the threshold it falls on.
pub fn describe_reading(value: i64, threshold: i64) -> String {
    if value < threshold {
        format!("sensor: {value} (dark, < {threshold}) -> expecting led on")
    } else {
        format!("sensor: {value} (light, >= {threshold}) -> expecting led off")
    }
}

/// Human line for a state report, if it carries one of the conventional
/// markers. Reports are free text, so anything else is ignored.
pub fn describe_report(report: &str) -> Option<&'static str> {
    if report.contains(REPORT_ON) {
        Some("led is ON")
    } else if report.contains(REPORT_OFF) {
        Some("led is OFF")
    } else {
        None
    }
}

/// Run the monitor until Ctrl-C. Display-only: subscribes to both topics
/// and never feeds anything back into the system.
pub async fn run(settings: Arc<Settings>) -> Result<(), Box<dyn Error>> {
    let mut options = MqttOptions::new(
        client_id("monitor"),
        &settings.broker.host,
        settings.broker.port,
    );
    options.set_keep_alive(Duration::from_secs(5));

    let (client, mut event_loop) = AsyncClient::new(options, 10);
    let topics = [
        settings.topics.luminosity.clone(),
        settings.topics.led_state.clone(),
    ];
    for topic in &topics {
        client.subscribe(topic, QoS::AtLeastOnce).await?;
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupt received, shutting down");
                break;
            }
            event = event_loop.poll() => match event {
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    display(&settings, &publish.topic, &publish.payload);
                }
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    if !ack.session_present {
                        for topic in &topics {
                            client.subscribe(topic, QoS::AtLeastOnce).await?;
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!("mqtt error: {}", e);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }

    client.disconnect().await?;

    Ok(())
}

fn display(settings: &Settings, topic: &str, payload: &[u8]) {
    let text = String::from_utf8_lossy(payload);

    if topic == settings.topics.luminosity {
        match text.trim().parse::<i64>() {
            Ok(value) => println!("{}", describe_reading(value, settings.actuator.threshold)),
            Err(_) => tracing::warn!("unreadable sensor payload: {:?}", text),
        }
    } else if topic == settings.topics.led_state {
        if let Some(label) = describe_report(&text) {
            println!("{label}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_reading_sides() {
        assert!(describe_reading(10, 40).contains("dark"));
        assert!(describe_reading(50, 40).contains("light"));
        // Exactly the threshold counts as light.
        assert!(describe_reading(40, 40).contains("light"));
    }

    #[test]
    fn test_describe_report_markers() {
        assert_eq!(describe_report("STATUS:LED_ON"), Some("led is ON"));
        assert_eq!(describe_report("ack LED_OFF ok"), Some("led is OFF"));
        assert_eq!(describe_report("garbage"), None);
    }
}
