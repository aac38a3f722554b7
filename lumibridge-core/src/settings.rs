use std::env;
use std::time::{SystemTime, UNIX_EPOCH};

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Broker {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topics {
    pub luminosity: String,
    pub led_state: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actuator {
    pub port_path: String,
    pub baud_rate: u32,
    pub threshold: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gateway {
    pub port_path: String,
    pub baud_rate: u32,
    pub poll_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mock {
    pub publish_interval_secs: u64,
    /// Length of one simulated day, compressed so a full light cycle fits
    /// in a demo session.
    pub day_cycle_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub logger: Logger,
    pub broker: Broker,
    pub topics: Topics,
    pub actuator: Actuator,
    pub gateway: Gateway,
    pub mock: Option<Mock>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        Config::builder()
            .add_source(File::with_name("configs/default"))
            .add_source(File::with_name(&format!("configs/{run_mode}")).required(false))
            .add_source(Environment::default().separator("__"))
            .build()?
            .try_deserialize()
    }
}

/// Client ids must be unique per broker session, so each node tags its role
/// prefix with a millisecond timestamp.
pub fn client_id(prefix: &str) -> String {
    let since_epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();

    format!("{prefix}-{}", since_epoch.as_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_deserialize_from_toml() {
        let raw = r#"
            [logger]
            level = "debug"

            [broker]
            host = "broker.emqx.io"
            port = 1883

            [topics]
            luminosity = "lumibridge/luminosity"
            led_state = "lumibridge/led_state"

            [actuator]
            port_path = "/dev/ttyUSB0"
            baud_rate = 9600
            threshold = 40

            [gateway]
            port_path = "/dev/ttyUSB1"
            baud_rate = 9600
            poll_interval_secs = 2
        "#;

        let settings: Settings = Config::builder()
            .add_source(File::from_str(raw, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.actuator.threshold, 40);
        assert_eq!(settings.topics.luminosity, "lumibridge/luminosity");
        assert!(settings.mock.is_none());
    }

    #[test]
    fn test_client_ids_carry_role_prefix() {
        let id = client_id("actuator");

        assert!(id.starts_with("actuator-"));
        assert!(id.len() > "actuator-".len());
    }
}
