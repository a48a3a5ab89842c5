//! error taxonomy for the telemetry pipeline.
//!
//! every variant is contained at the boundary where it occurs: a bad frame is
//! dropped, a lost connection is retried, a bad api request becomes a 400,
//! and a failed command publish is logged without touching actuator state.
//! none of them terminate the process.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HubError {
    /// inbound payload was not a well-formed telemetry frame
    #[error("decode error: {0}")]
    Decode(String),

    /// broker unreachable or the event loop errored; retried with backoff
    #[error("connection error: {0}")]
    Connection(String),

    /// malformed api request; surfaced to the caller, no state mutation
    #[error("validation error: {0}")]
    Validation(String),

    /// outbound command send failed; the actuator mutation stays applied
    #[error("publish error: {0}")]
    Publish(String),
}

impl HubError {
    pub fn decode(msg: impl Into<String>) -> Self {
        HubError::Decode(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        HubError::Validation(msg.into())
    }
}
