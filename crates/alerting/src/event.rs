//! Alert event records

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    /// Duration-rule notices (session length, missed breaks).
    Alert,
    Critical,
}

impl Severity {
    /// Whether this severity competes for the single central display slot.
    pub fn is_center_class(&self) -> bool {
        !matches!(self, Severity::Info)
    }
}

/// An emitted alert. Immutable once created; appended to the append-only
/// alert list and mirrored into the combined event history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub id: Uuid,
    pub timestamp_ms: u64,
    pub message: String,
    pub severity: Severity,
    /// Forced alerts bypass the "recording and not on break" gate
    /// (start/stop/break boundary notices and the eyes-closed signal).
    pub forced: bool,
}

impl AlertEvent {
    pub fn new(message: impl Into<String>, severity: Severity, forced: bool, now_ms: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp_ms: now_ms,
            message: message.into(),
            severity,
            forced,
        }
    }
}
