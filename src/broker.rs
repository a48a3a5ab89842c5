//! ==============================================================================
//! broker.rs - mqtt broker client
//! ==============================================================================
//!
//! purpose:
//!     owns the single connection to the mqtt broker. two tasks:
//!
//! ```text
//!     - ingest loop: drives the rumqttc event loop, subscribes to the sensor
//!       topic on every (re)connect, and feeds each inbound publish through
//!       the decoder into the state store. connection loss is never fatal:
//!       the loop marks the store offline, sleeps with doubling backoff, and
//!       keeps polling until the broker comes back.
//!
//!     - command publisher: drains the bounded channel fed by the state store
//!       and publishes "pump_on"/"pump_off" to the control topic. sends are
//!       fire-and-forget; a failure is logged and the actuator state already
//!       applied stays as-is.
//! ```
//!
//! relationships:
//!     - uses: telemetry.rs (decode), state.rs (apply_reading/set_online)
//!     - receives: domain::PumpCommand from state.rs
//!
//! ==============================================================================

use std::time::Duration;

use log::{debug, info, warn};
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use tokio::sync::mpsc;

use crate::config::HubConfig;
use crate::domain::PumpCommand;
use crate::error::HubError;
use crate::state::StateStore;
use crate::telemetry;

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// spawn the ingest loop and the command publisher.
/// returns immediately; both tasks run for the life of the process.
pub fn start(config: &HubConfig, store: StateStore, commands: mpsc::Receiver<PumpCommand>) {
    let mut options = MqttOptions::new(
        config.broker.client_id.clone(),
        config.broker.host.clone(),
        config.broker.port,
    );
    options.set_keep_alive(Duration::from_secs(config.broker.keep_alive_seconds));

    let (client, eventloop) = AsyncClient::new(options, 16);

    tokio::spawn(publish_commands(
        client.clone(),
        config.topics.control.clone(),
        commands,
    ));
    tokio::spawn(ingest_loop(
        client,
        eventloop,
        config.topics.sensors.clone(),
        store,
    ));
}

async fn ingest_loop(
    client: AsyncClient,
    mut eventloop: rumqttc::EventLoop,
    sensor_topic: String,
    store: StateStore,
) {
    let mut backoff = INITIAL_BACKOFF;
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                backoff = INITIAL_BACKOFF;
                info!("connected to broker, subscribing to {}", sensor_topic);
                store.set_online(true).await;
                if let Err(e) = client.subscribe(sensor_topic.as_str(), QoS::AtMostOnce).await {
                    warn!("subscribe to {} failed: {}", sensor_topic, e);
                }
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                backoff = INITIAL_BACKOFF;
                ingest_frame(&store, &publish.payload).await;
            }
            Ok(_) => {
                // pings, acks, outgoing traffic
                backoff = INITIAL_BACKOFF;
            }
            Err(e) => {
                store.set_online(false).await;
                let err = HubError::Connection(e.to_string());
                warn!("{}; retrying in {:?}", err, backoff);
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(MAX_BACKOFF);
            }
        }
    }
}

/// exactly one decode attempt per inbound message. a malformed frame is
/// logged and dropped; the store is only touched by frames that decode whole.
pub async fn ingest_frame(store: &StateStore, payload: &[u8]) {
    match telemetry::decode(payload) {
        Ok(reading) => {
            debug!("applying telemetry frame: {:?}", reading);
            store.apply_reading(reading).await;
        }
        Err(e) => warn!("dropping telemetry frame: {}", e),
    }
}

async fn publish_commands(
    client: AsyncClient,
    control_topic: String,
    mut commands: mpsc::Receiver<PumpCommand>,
) {
    while let Some(cmd) = commands.recv().await {
        info!("publishing {} to {}", cmd.payload(), control_topic);
        if let Err(e) = client
            .publish(control_topic.as_str(), QoS::AtLeastOnce, false, cmd.payload())
            .await
        {
            // best-effort: the actuator mutation is already applied and stays
            let err = HubError::Publish(e.to_string());
            warn!("{}", err);
        }
    }
}
