//! ==============================================================================
//! domain.rs - shared data model
//! ==============================================================================
//!
//! purpose:
//!     defines the wire-facing types: the device snapshot served by the api,
//!     the bounded history record, and the transient telemetry reading that
//!     flows from the decoder into the state store.
//!
//! relationships:
//!     - produced by: telemetry.rs (SensorReading), state.rs (DeviceSnapshot)
//!     - consumed by: api.rs (serialized to json), broker.rs (PumpCommand)
//!
//! ==============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// current state of a single hydroponic device.
/// this is the full shape returned by GET /api/status.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    /// stable device identifier (e.g., "hydro_001")
    pub device_id: String,
    /// time of the last applied reading
    pub timestamp: DateTime<Utc>,
    /// named sensor channels -> current value
    /// examples: {"temperature": 22.5, "humidity": 45.0, "ph": 6.1, "turbidity": 0.8}
    /// a btree map so serialization order is stable across snapshots
    pub sensors: BTreeMap<String, f64>,
    pub actuators: ActuatorState,
    pub system_status: SystemStatus,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActuatorState {
    pub pump_status: bool,
    /// when the pump was last commanded, not when the device confirmed it
    pub last_activation: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SystemStatus {
    /// broker connectivity, flipped by the mqtt event loop
    pub is_online: bool,
    /// seconds since process start
    pub uptime: u64,
    /// warnings for the *current* sensors only, replaced wholesale per reading
    pub warnings: Vec<String>,
}

/// one retained telemetry frame. serialized flattened so each history entry
/// reads {"timestamp": ..., "temperature": ..., "ph": ...} on the wire.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub sensors: BTreeMap<String, f64>,
}

/// shape of GET /api/history
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub device_id: String,
    pub data_points: Vec<HistoryRecord>,
}

/// a validated telemetry frame, produced by the decoder and consumed once
/// by the state store. carries no identity of its own.
#[derive(Clone, Debug, PartialEq)]
pub struct SensorReading(pub BTreeMap<String, f64>);

impl SensorReading {
    pub fn into_channels(self) -> BTreeMap<String, f64> {
        self.0
    }
}

/// requested pump state, forwarded to the control topic as a literal token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PumpCommand {
    pub status: bool,
}

impl PumpCommand {
    /// wire token published on the control topic
    pub fn payload(self) -> &'static str {
        if self.status { "pump_on" } else { "pump_off" }
    }
}
