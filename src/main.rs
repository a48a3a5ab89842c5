//! ==============================================================================
//! main.rs - hydro-hub entry point
//! ==============================================================================
//!
//! purpose:
//!     wires the pipeline together and runs it for the life of the process.
//!
//! responsibilities:
//!     - init logging and load configuration
//!     - build the state store (the single authoritative device snapshot)
//!     - spawn the mqtt ingest loop and command publisher
//!     - serve the http api in the foreground
//!
//! architecture:
//!
//!     ┌──────────────────────────────────────────────────────────┐
//!     │                      hydro-hub                           │
//!     │  ┌─────────────┐   ┌─────────────┐   ┌───────────────┐   │
//!     │  │ mqtt ingest │   │ http api    │   │ cmd publisher │   │
//!     │  │ (broker.rs) │   │ (api.rs)    │   │ (broker.rs)   │   │
//!     │  └──────┬──────┘   └──────┬──────┘   └───────▲───────┘   │
//!     │         │ apply_reading   │ snapshot         │ channel   │
//!     │         ▼                 ▼ apply_command    │           │
//!     │               ┌───────────────────┐          │           │
//!     │               │    state store    │──────────┘           │
//!     │               └───────────────────┘                      │
//!     └──────────────────────────────────────────────────────────┘
//!
//! data flow: broker -> decoder -> state store -> (warnings, history);
//! api reads the store; pump commands mutate the store and flow back out
//! to the broker's control topic.
//!
//! ==============================================================================

use anyhow::Result;
use tokio::sync::mpsc;

use hydro_hub::{api, broker, config::HubConfig, state::StateStore};

/// bound on queued-but-unsent pump commands; sends past it are dropped
/// (and logged) rather than blocking the api handler
const COMMAND_QUEUE_DEPTH: usize = 16;

#[tokio::main]
async fn main() -> Result<()> {
    let config = HubConfig::load_or_default();

    env_logger::Builder::new()
        .parse_filters(&config.logging.level)
        .init();
    config.log_summary();

    let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
    let store = StateStore::new(&config.device.id, config.history.retention, command_tx);

    broker::start(&config, store.clone(), command_rx);

    api::serve(store, &config.http.bind).await
}
