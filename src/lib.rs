//! hydro-hub: telemetry hub for a single hydroponic device.
//!
//! ingests full telemetry frames from an mqtt broker, keeps the latest
//! snapshot plus a bounded history ring, evaluates warning thresholds, and
//! exposes the state and a pump-control path over an http/json api.

pub mod api;
pub mod broker;
pub mod config;
pub mod domain;
pub mod error;
pub mod state;
pub mod telemetry;
pub mod thresholds;
