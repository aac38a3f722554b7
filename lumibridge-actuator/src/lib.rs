use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};

use lumibridge_core::serial::PORT_WARMUP;
use lumibridge_core::settings::{Settings, client_id};
use lumibridge_core::{Error as CoreError, LightController, UartLink};

/// Run the actuator node until Ctrl-C.
///
/// Readings are handled inline in the event loop task, one at a time, so
/// the controller never sees concurrent invocations; anything the broker
/// delivers during a serial exchange just waits in rumqttc's queue.
pub async fn run(settings: Arc<Settings>) -> Result<(), Box<dyn Error>> {
    let link = UartLink::open(&settings.actuator.port_path, settings.actuator.baud_rate)?;
    tokio::time::sleep(PORT_WARMUP).await;

    let mut controller = LightController::new(link, settings.actuator.threshold);
    controller.reset()?;
    tracing::info!("led forced off, accepting readings");

    let mut options = MqttOptions::new(
        client_id("actuator"),
        &settings.broker.host,
        settings.broker.port,
    );
    options.set_keep_alive(Duration::from_secs(5));

    let (client, mut event_loop) = AsyncClient::new(options, 10);
    client
        .subscribe(&settings.topics.luminosity, QoS::AtLeastOnce)
        .await?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupt received, shutting down");
                break;
            }
            event = event_loop.poll() => match event {
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    handle_publish(&settings, &client, &mut controller, &publish.payload).await;
                }
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    // rumqttc reconnects on its own, but a fresh session
                    // comes back without our subscription.
                    if !ack.session_present {
                        client
                            .subscribe(&settings.topics.luminosity, QoS::AtLeastOnce)
                            .await?;
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

async fn handle_publish<L: lumibridge_core::SerialLink>(
    settings: &Settings,
    client: &AsyncClient,
    controller: &mut LightController<L>,
    payload: &[u8],
) {
    match controller.handle_reading(payload) {
        Ok(Some(report)) => {
            tracing::debug!("device report: {}", report);

            if let Err(e) = client
                .publish(&settings.topics.led_state, QoS::AtLeastOnce, false, report)
                .await
            {
                tracing::error!("failed to publish state report: {}", e);
            }
        }
        // Either no state change or the device stayed silent; nothing to
        // publish for this reading.
        Ok(None) => {}
        Err(CoreError::MalformedReading(payload)) => {
            tracing::warn!("dropping malformed reading: {:?}", payload);
        }
        Err(e) => tracing::error!("serial exchange failed: {}", e),
    }
}
