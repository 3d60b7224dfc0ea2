//! Alerting System
//!
//! Turns focus readings and session durations into prioritized,
//! de-duplicated alert records: 30 s cooldown classes for the focus
//! thresholds, one-shot latches for the session-length and no-break rules,
//! and a recording/break gate that only forced alerts bypass.

mod engine;
mod event;

pub use engine::{AlertConfig, AlertEngine, SessionGate};
pub use event::{AlertEvent, Severity};
