//! ==============================================================================
//! state.rs - authoritative device state store
//! ==============================================================================
//!
//! purpose:
//!     owns the single in-memory DeviceSnapshot plus the bounded history ring.
//!     all mutation goes through this module under one write lock, so a
//!     snapshot never mixes sensors from one reading with warnings from
//!     another. readers clone the state under the read lock and can run
//!     concurrently with each other.
//!
//! writers:
//!     - broker ingest task: apply_reading / set_online
//!     - api pump handler:   apply_command
//!
//! the store is a cheap clone (arc inside) so it can be handed to the broker
//! tasks and the router at the same time, and so tests can build isolated
//! instances instead of sharing a process-global.
//!
//! relationships:
//!     - uses: thresholds.rs (warning recomputation per reading)
//!     - sends: domain::PumpCommand to broker.rs via a bounded channel
//!
//! ==============================================================================

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use log::warn;
use tokio::sync::mpsc;
use tokio::sync::RwLock;

use crate::domain::{
    ActuatorState, DeviceSnapshot, HistoryRecord, PumpCommand, SensorReading, SystemStatus,
};
use crate::error::HubError;
use crate::thresholds;

#[derive(Clone)]
pub struct StateStore {
    inner: Arc<Inner>,
}

struct Inner {
    started: Instant,
    retention: usize,
    /// outbound path to the broker's command publisher task
    commands: mpsc::Sender<PumpCommand>,
    shared: RwLock<Shared>,
}

struct Shared {
    snapshot: DeviceSnapshot,
    history: VecDeque<HistoryRecord>,
}

impl StateStore {
    /// create a store with zeroed default channels, mirroring the device's
    /// telemetry frame before the first reading arrives.
    pub fn new(device_id: &str, retention: usize, commands: mpsc::Sender<PumpCommand>) -> Self {
        let sensors: BTreeMap<String, f64> = ["temperature", "humidity", "ph", "turbidity"]
            .into_iter()
            .map(|c| (c.to_string(), 0.0))
            .collect();

        let snapshot = DeviceSnapshot {
            device_id: device_id.to_string(),
            timestamp: Utc::now(),
            sensors,
            actuators: ActuatorState {
                pump_status: false,
                last_activation: None,
            },
            system_status: SystemStatus {
                is_online: true,
                uptime: 0,
                warnings: Vec::new(),
            },
        };

        Self {
            inner: Arc::new(Inner {
                started: Instant::now(),
                retention,
                commands,
                shared: RwLock::new(Shared {
                    snapshot,
                    history: VecDeque::new(),
                }),
            }),
        }
    }

    /// apply one accepted telemetry frame: replace the sensor channels
    /// wholesale, stamp the time, recompute warnings from the new values,
    /// and append to the history ring (evicting the oldest past retention).
    pub async fn apply_reading(&self, reading: SensorReading) {
        let channels = reading.into_channels();
        let now = Utc::now();

        let mut shared = self.inner.shared.write().await;
        shared.snapshot.sensors = channels;
        shared.snapshot.timestamp = now;
        shared.snapshot.system_status.warnings = thresholds::evaluate(&shared.snapshot.sensors);

        let record = HistoryRecord {
            timestamp: now,
            sensors: shared.snapshot.sensors.clone(),
        };
        shared.history.push_back(record);
        while shared.history.len() > self.inner.retention {
            shared.history.pop_front();
        }
    }

    /// apply a pump command: mutate actuator state, then hand the command to
    /// the broker task. the send is fire-and-forget; if it fails the mutation
    /// stays applied, because actuator state tracks *requested* intent, not
    /// confirmed device action.
    pub async fn apply_command(&self, cmd: PumpCommand) {
        {
            let mut shared = self.inner.shared.write().await;
            shared.snapshot.actuators.pump_status = cmd.status;
            shared.snapshot.actuators.last_activation = Some(Utc::now());
        }

        if let Err(e) = self.inner.commands.try_send(cmd) {
            let err = HubError::Publish(format!("pump command not queued: {}", e));
            warn!("{}", err);
        }
    }

    /// broker connectivity, reflected in system_status.is_online
    pub async fn set_online(&self, online: bool) {
        let mut shared = self.inner.shared.write().await;
        shared.snapshot.system_status.is_online = online;
    }

    /// defensive copy of the current snapshot with uptime filled in.
    /// callers can never mutate the store through the returned value.
    pub async fn snapshot(&self) -> DeviceSnapshot {
        let shared = self.inner.shared.read().await;
        let mut snapshot = shared.snapshot.clone();
        snapshot.system_status.uptime = self.inner.started.elapsed().as_secs();
        snapshot
    }

    /// retained history, oldest first. may be empty before the first reading.
    pub async fn history(&self) -> Vec<HistoryRecord> {
        let shared = self.inner.shared.read().await;
        shared.history.iter().cloned().collect()
    }

    pub async fn device_id(&self) -> String {
        let shared = self.inner.shared.read().await;
        shared.snapshot.device_id.clone()
    }
}
