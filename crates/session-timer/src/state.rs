//! Session state tracking

use crate::trip::TripSummary;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Phase of the driving session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionPhase {
    #[default]
    Idle,
    Recording,
    RecordingOnBreak,
}

/// A completed break. Never mutated after being appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakInterval {
    pub start_ms: u64,
    pub end_ms: u64,
}

/// Result of a break toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakTransition {
    Started,
    Ended(BreakInterval),
    /// Not recording, or a break-end with no recorded start. State
    /// unchanged.
    Ignored,
}

/// Live session state (created on start, reset on stop).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    pub is_recording: bool,
    pub is_on_break: bool,
    /// Epoch ms of session start; 0 means never started. Kept after stop
    /// for the "last known session" display.
    pub started_at_ms: u64,
    /// Driving seconds (excludes breaks).
    pub elapsed_seconds: u64,
    /// Seconds spent in the current break.
    pub break_seconds: u64,
    /// Epoch ms the last break ended; 0 while on break (display suspended)
    /// or before any break.
    pub last_break_ended_at_ms: u64,
    pub time_since_last_break_seconds: u64,
    /// Completed breaks of the current session, in order.
    pub breaks: Vec<BreakInterval>,
    /// Start stamp of an in-progress break.
    current_break_start_ms: Option<u64>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        match (self.is_recording, self.is_on_break) {
            (false, _) => SessionPhase::Idle,
            (true, false) => SessionPhase::Recording,
            (true, true) => SessionPhase::RecordingOnBreak,
        }
    }

    /// Begin a new recording session. Resets every live counter and the
    /// break history; the no-break clock starts counting from now.
    pub fn begin(&mut self, now_ms: u64) {
        self.is_recording = true;
        self.is_on_break = false;
        self.started_at_ms = now_ms;
        self.elapsed_seconds = 0;
        self.break_seconds = 0;
        self.breaks.clear();
        self.current_break_start_ms = None;
        self.last_break_ended_at_ms = now_ms;
        self.time_since_last_break_seconds = 0;
        info!(started_at_ms = now_ms, "session started");
    }

    /// Toggle the break state. Only legal while recording; ending a break
    /// that has no recorded start logs and leaves the state unchanged.
    pub fn toggle_break(&mut self, now_ms: u64) -> BreakTransition {
        if !self.is_recording {
            warn!("toggle_break ignored: not recording");
            return BreakTransition::Ignored;
        }

        if self.is_on_break {
            let Some(start_ms) = self.current_break_start_ms.take() else {
                warn!("toggle_break: in-progress break has no start stamp");
                return BreakTransition::Ignored;
            };
            self.is_on_break = false;
            let interval = BreakInterval {
                start_ms,
                end_ms: now_ms,
            };
            self.breaks.push(interval);
            self.last_break_ended_at_ms = now_ms;
            self.time_since_last_break_seconds = 0;
            info!(start_ms, end_ms = now_ms, "break ended");
            BreakTransition::Ended(interval)
        } else {
            self.break_seconds = 0;
            self.current_break_start_ms = Some(now_ms);
            self.is_on_break = true;
            // suspend the "time since last break" display while on break
            self.last_break_ended_at_ms = 0;
            info!(start_ms = now_ms, "break started");
            BreakTransition::Started
        }
    }

    /// Stop the session, finalizing any in-progress break. Returns the
    /// trip summary to persist, or `None` when already idle (idempotent).
    /// `started_at_ms` survives the reset.
    pub fn finish(&mut self, now_ms: u64) -> Option<TripSummary> {
        if !self.is_recording {
            return None;
        }

        if self.is_on_break {
            match self.current_break_start_ms.take() {
                Some(start_ms) => {
                    self.breaks.push(BreakInterval {
                        start_ms,
                        end_ms: now_ms,
                    });
                    info!(start_ms, end_ms = now_ms, "finalized in-progress break");
                }
                None => warn!("finish: in-progress break had no start stamp"),
            }
        }

        let summary = TripSummary::new(self.started_at_ms, now_ms, &self.breaks);

        self.is_recording = false;
        self.is_on_break = false;
        self.elapsed_seconds = 0;
        self.break_seconds = 0;
        self.breaks.clear();
        self.current_break_start_ms = None;
        self.last_break_ended_at_ms = 0;
        self.time_since_last_break_seconds = 0;
        info!(ended_at_ms = now_ms, "session stopped");

        Some(summary)
    }

    /// Per-second tick. Active only while recording: driving time counts
    /// outside breaks, break time inside, and the no-break clock tracks
    /// wall time since the last break ended.
    pub fn tick(&mut self, now_ms: u64) {
        if !self.is_recording {
            return;
        }

        if self.is_on_break {
            self.break_seconds += 1;
        } else {
            self.elapsed_seconds += 1;
            if self.last_break_ended_at_ms > 0 {
                self.time_since_last_break_seconds =
                    now_ms.saturating_sub(self.last_break_ended_at_ms) / 1000;
            }
        }
    }
}
