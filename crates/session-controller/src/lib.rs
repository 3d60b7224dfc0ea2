//! Session controller
//!
//! Owns all live monitor state and wires the components together: per-frame
//! EAR ingestion feeds the focus tracker, the 1 s tick drives the session
//! timers and duration alerts, a 100 ms task publishes live EAR values over
//! the transport, and every state change re-syncs the alert presenter.

pub mod config;
pub mod controller;
pub mod trace;

pub use config::MonitorConfig;
pub use controller::{MonitorSnapshot, MonitorStatus, SessionController};

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Initialize logging
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}
