use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::time;

use lumibridge_core::settings::{Mock, Settings};

use crate::broker::MockBroker;
use crate::simulate::simulated_luminosity;

pub mod broker;
pub mod simulate;

/// Start an in-process broker and publish simulated luminosity readings
/// to the configured topic until Ctrl-C. Stands in for the gateway node
/// plus its sensor hardware during local runs.
pub async fn run(settings: Arc<Settings>) -> Result<(), Box<dyn Error>> {
    let mock = settings.mock.clone().unwrap_or(Mock {
        publish_interval_secs: 2,
        day_cycle_secs: 120,
    });

    let broker = MockBroker::new(&settings.broker)?;
    broker.start();

    let mut link_tx = broker.link("mock-sensor")?;

    let mut interval = time::interval(Duration::from_secs(mock.publish_interval_secs));
    let mut tick: u64 = 0;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupt received, shutting down");
                break;
            }
            _ = interval.tick() => {
                let elapsed = tick * mock.publish_interval_secs;
                let day_fraction = (elapsed % mock.day_cycle_secs) as f64 / mock.day_cycle_secs as f64;

                let jitter = rand::rng().random_range(-2..=2);
                let value = (simulated_luminosity(day_fraction) + jitter).clamp(0, 100);

                tracing::debug!("publishing simulated reading: {}", value);
                link_tx.publish(settings.topics.luminosity.clone(), value.to_string())?;

                tick += 1;
            }
        }
    }

    Ok(())
}
