//! ==============================================================================
//! telemetry.rs - inbound frame decoder
//! ==============================================================================
//!
//! purpose:
//!     turns a raw broker payload into a validated SensorReading, or rejects
//!     it with a decode error. the device publishes full telemetry frames as
//!     a json object of numeric channels:
//!
//! ```text
//!         {"temperature": 22.5, "humidity": 45.0, "ph": 6.1, "turbidity": 0.8}
//!
//!     validation is explicit rather than trusting whatever json parses:
//!     the frame must be an object, must carry at least one channel, and
//!     every value must be a finite number. a frame either decodes whole or
//!     not at all, so the state store never sees a partial reading.
//! ```
//!
//! relationships:
//!     - called by: broker.rs (once per inbound publish)
//!     - produces: domain::SensorReading
//!
//! ==============================================================================

use std::collections::BTreeMap;

use crate::domain::SensorReading;
use crate::error::HubError;

/// decode one raw payload into a validated reading.
pub fn decode(payload: &[u8]) -> Result<SensorReading, HubError> {
    let value: serde_json::Value = serde_json::from_slice(payload)
        .map_err(|e| HubError::decode(format!("payload is not valid json: {}", e)))?;

    let object = value
        .as_object()
        .ok_or_else(|| HubError::decode("telemetry frame must be a json object"))?;

    if object.is_empty() {
        return Err(HubError::decode("telemetry frame carries no channels"));
    }

    let mut channels = BTreeMap::new();
    for (name, raw) in object {
        let number = raw.as_f64().ok_or_else(|| {
            HubError::decode(format!("channel '{}' is not numeric: {}", name, raw))
        })?;
        if !number.is_finite() {
            return Err(HubError::decode(format!(
                "channel '{}' is not a finite number",
                name
            )));
        }
        channels.insert(name.clone(), number);
    }

    Ok(SensorReading(channels))
}
