//! Session timer
//!
//! Driving/break session state machine:
//! - Idle -> Recording -> RecordingOnBreak transitions
//! - per-second elapsed / break / time-since-break counters
//! - immutable break-interval history and trip summary assembly
//!
//! The machine is driven entirely by explicit epoch-millisecond stamps, so
//! the owning controller (and tests) decide what "now" means.

pub mod state;
pub mod trip;

pub use state::{BreakInterval, BreakTransition, SessionPhase, SessionState};
pub use trip::{TripBreak, TripSummary};
