use std::collections::HashMap;
use std::error::Error;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::thread;

use rumqttd::local::LinkTx;
use rumqttd::{Broker, Config, ConnectionSettings, RouterConfig, ServerSettings};

use lumibridge_core::settings::Broker as BrokerSettings;

/// In-process MQTT v4 broker the nodes can point at instead of a public
/// one. Listens on the address from the `[broker]` settings section.
pub struct MockBroker {
    broker: Arc<Mutex<Broker>>,
}

impl MockBroker {
    pub fn new(settings: &BrokerSettings) -> Result<Self, Box<dyn Error>> {
        let broker = Broker::new(Config {
            id: 0,
            router: RouterConfig {
                max_connections: 100,
                max_outgoing_packet_count: 200,
                max_segment_size: 104857600,
                max_segment_count: 10,
                custom_segment: None,
                initialized_filters: None,
                shared_subscriptions_strategy: Default::default(),
            },
            v4: Some(HashMap::from([(
                1.to_string(),
                ServerSettings {
                    name: "v4-1".to_string(),
                    listen: (settings.host.parse::<IpAddr>()?, settings.port).into(),
                    tls: None,
                    next_connection_delay_ms: 10,
                    connections: ConnectionSettings {
                        connection_timeout_ms: 60000,
                        max_payload_size: 20480,
                        max_inflight_count: 100,
                        auth: None,
                        external_auth: None,
                        dynamic_filters: true,
                    },
                },
            )])),
            v5: None,
            ws: None,
            cluster: None,
            console: None,
            bridge: None,
            prometheus: None,
            metrics: None,
        });

        Ok(Self {
            broker: Arc::new(Mutex::new(broker)),
        })
    }

    pub fn start(&self) {
        let broker = Arc::clone(&self.broker);

        thread::spawn(move || broker.lock().unwrap().start().unwrap());
    }

    /// Local publishing handle into the router, bypassing the socket.
    pub fn link(&self, client_id: &str) -> Result<LinkTx, Box<dyn Error>> {
        let (link_tx, mut link_rx) = self.broker.lock().unwrap().link(client_id)?;

        // Drain router notifications so the link's queue never fills up.
        thread::spawn(move || {
            while let Ok(notification) = link_rx.recv() {
                if let Some(notification) = notification {
                    tracing::trace!("router: {:?}", notification);
                }
            }
        });

        Ok(link_tx)
    }
}
