//! Telemetry ports
//!
//! External collaborator boundaries of the focus monitor:
//! - [`MonitorTransport`]: ships live EAR values to the remote collector
//!   and confirms connectivity before a session may start
//! - [`TripSink`]: receives the trip summary when a session stops
//!
//! Both are traits so the controller and tests can swap implementations;
//! the crate provides an in-process channel transport and an HTTP sink.

mod sink;
mod transport;

pub use sink::{HttpTripSink, MemoryTripSink, TripSink};
pub use transport::{ChannelTransport, EarMessage, MonitorTransport, EAR_PUBLISH_INTERVAL_MS};

use thiserror::Error;

/// Telemetry error types
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Transport unavailable: {0}")]
    Transport(String),

    #[error("Trip submission failed: {0}")]
    Sink(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}
