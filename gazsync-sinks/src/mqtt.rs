//! MQTT adapter.
//!
//! Publishes records at QoS 0, fire-and-forget. The broker connection is
//! established once per process; the event loop runs in a background task.

use std::time::Duration;

use async_trait::async_trait;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use tracing::{debug, warn};

use crate::error::BusPublishError;
use crate::ports::MessageBusSink;

/// Client identifier announced to the broker
const CLIENT_ID: &str = "gazsyncd";

/// Event loop channel capacity
const EVENT_CAPACITY: usize = 10;

/// MQTT message bus sink.
pub struct MqttSink {
    client: AsyncClient,
}

impl MqttSink {
    /// Connect to the broker.
    ///
    /// Waits for the broker's ConnAck so that an unreachable broker surfaces
    /// here, at startup, rather than on the first publish. The event loop is
    /// then handed off to a background task that keeps the connection alive.
    pub async fn connect(
        host: &str,
        port: u16,
        keepalive_secs: u64,
    ) -> Result<Self, BusPublishError> {
        let mut options = MqttOptions::new(CLIENT_ID, host, port);
        options.set_keep_alive(Duration::from_secs(keepalive_secs));

        let (client, mut event_loop) = AsyncClient::new(options, EVENT_CAPACITY);

        // Drive the loop until the broker acknowledges the connection
        loop {
            match event_loop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => break,
                Ok(_) => continue,
                Err(e) => return Err(BusPublishError::Connection(e.to_string())),
            }
        }
        debug!(host, port, "connected to message bus");

        tokio::spawn(async move {
            loop {
                if let Err(e) = event_loop.poll().await {
                    warn!(error = %e, "message bus event loop stopped");
                    break;
                }
            }
        });

        Ok(Self { client })
    }
}

#[async_trait]
impl MessageBusSink for MqttSink {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), BusPublishError> {
        self.client
            .publish(topic, QoS::AtMostOnce, false, payload.to_vec())
            .await
            .map_err(|e| BusPublishError::Publish(e.to_string()))
    }
}
