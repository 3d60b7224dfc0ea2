//! Alert engine implementation

use crate::event::{AlertEvent, Severity};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Alert thresholds and cooldowns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Focus percentage at or below which a critical alert fires.
    pub critical_focus_percent: u8,
    /// Focus percentage at or below which a warning fires.
    pub warning_focus_percent: u8,
    /// Cooldown between focus alerts of the same class (seconds).
    pub focus_cooldown_seconds: u64,
    /// Driving time that triggers the one-shot session alert (seconds).
    pub session_limit_seconds: u64,
    /// Time since last break that triggers the one-shot alert (seconds).
    pub no_break_limit_seconds: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            critical_focus_percent: 25,
            warning_focus_percent: 50,
            focus_cooldown_seconds: 30,
            session_limit_seconds: 4 * 3600,
            no_break_limit_seconds: 2 * 3600,
        }
    }
}

impl AlertConfig {
    /// Stricter thresholds for fleet policies that mandate shorter shifts.
    pub fn strict() -> Self {
        Self {
            session_limit_seconds: 2 * 3600,
            no_break_limit_seconds: 3600,
            ..Default::default()
        }
    }
}

/// Whether the session currently accepts non-forced alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionGate {
    pub is_recording: bool,
    pub is_on_break: bool,
}

impl SessionGate {
    pub fn allows(&self, forced: bool) -> bool {
        forced || (self.is_recording && !self.is_on_break)
    }
}

/// Alert generation engine with cooldown and latch state.
pub struct AlertEngine {
    config: AlertConfig,
    /// Append-only alert list for the current session.
    alerts: Vec<AlertEvent>,
    /// Events + alerts, newest first. Unbounded; the presentation layer
    /// windows it.
    event_history: Vec<AlertEvent>,
    last_critical_focus_ms: Option<u64>,
    last_warning_focus_ms: Option<u64>,
    last_eyes_closed_ms: Option<u64>,
    session_limit_fired: bool,
    no_break_fired: bool,
}

impl AlertEngine {
    pub fn new(config: AlertConfig) -> Self {
        Self {
            config,
            alerts: Vec::new(),
            event_history: Vec::new(),
            last_critical_focus_ms: None,
            last_warning_focus_ms: None,
            last_eyes_closed_ms: None,
            session_limit_fired: false,
            no_break_fired: false,
        }
    }

    /// Append an alert, mirrored into the event history. Suppressed unless
    /// recording and not on break, or `forced`.
    pub fn add_alert(
        &mut self,
        message: &str,
        severity: Severity,
        forced: bool,
        gate: SessionGate,
        now_ms: u64,
    ) -> Option<AlertEvent> {
        if !gate.allows(forced) {
            debug!(message, "alert ignored: recording inactive or on break");
            return None;
        }

        let alert = AlertEvent::new(message, severity, forced, now_ms);
        info!(message, ?severity, "alert");
        self.alerts.push(alert.clone());
        self.event_history.insert(0, alert.clone());
        Some(alert)
    }

    /// Append an event to the history only (no popup/audio path). Same
    /// gate as alerts.
    pub fn add_event(
        &mut self,
        message: &str,
        severity: Severity,
        forced: bool,
        gate: SessionGate,
        now_ms: u64,
    ) -> Option<AlertEvent> {
        if !gate.allows(forced) {
            debug!(message, "event ignored: recording inactive or on break");
            return None;
        }

        let event = AlertEvent::new(message, severity, forced, now_ms);
        self.event_history.insert(0, event.clone());
        Some(event)
    }

    /// Evaluate the focus-threshold rules for a new reading. The critical
    /// check precedes the warning check and at most one alert fires per
    /// reading; a critical stamps both cooldown clocks so a warning cannot
    /// immediately follow it for the same dip.
    pub fn on_focus_reading(
        &mut self,
        percent: u8,
        gate: SessionGate,
        now_ms: u64,
    ) -> Option<AlertEvent> {
        if !gate.allows(false) {
            return None;
        }

        let cooldown_ms = self.config.focus_cooldown_seconds * 1000;

        if percent <= self.config.critical_focus_percent {
            if elapsed(self.last_critical_focus_ms, now_ms) >= cooldown_ms {
                self.last_critical_focus_ms = Some(now_ms);
                self.last_warning_focus_ms = Some(now_ms);
                return self.add_alert(
                    "Focus dropped below 25%",
                    Severity::Critical,
                    false,
                    gate,
                    now_ms,
                );
            }
        } else if percent <= self.config.warning_focus_percent
            && elapsed(self.last_warning_focus_ms, now_ms) >= cooldown_ms
        {
            self.last_warning_focus_ms = Some(now_ms);
            return self.add_alert(
                "Focus dropped below 50%",
                Severity::Warning,
                false,
                gate,
                now_ms,
            );
        }

        None
    }

    /// Immediate eyes-closed signal from the per-frame path. Forced
    /// (reaches the history even mid-break), but rate-limited by the focus
    /// cooldown so frame-rate repetition does not flood the history.
    pub fn on_eyes_closed(&mut self, gate: SessionGate, now_ms: u64) -> Option<AlertEvent> {
        let cooldown_ms = self.config.focus_cooldown_seconds * 1000;
        if elapsed(self.last_eyes_closed_ms, now_ms) < cooldown_ms {
            return None;
        }
        self.last_eyes_closed_ms = Some(now_ms);
        self.add_event("Eyes closed detected", Severity::Warning, true, gate, now_ms)
    }

    /// Evaluate the one-shot duration rules. Each fires at most once per
    /// session; the no-break latch additionally clears on break end.
    pub fn on_durations(
        &mut self,
        elapsed_seconds: u64,
        time_since_last_break_seconds: u64,
        gate: SessionGate,
        now_ms: u64,
    ) {
        if !gate.is_recording {
            return;
        }

        if elapsed_seconds >= self.config.session_limit_seconds && !self.session_limit_fired {
            self.session_limit_fired = true;
            self.add_alert(
                "Driving session exceeded 4 hours",
                Severity::Alert,
                false,
                gate,
                now_ms,
            );
        }

        if time_since_last_break_seconds >= self.config.no_break_limit_seconds
            && !self.no_break_fired
        {
            self.no_break_fired = true;
            self.add_alert(
                "More than 2 hours since last break",
                Severity::Alert,
                false,
                gate,
                now_ms,
            );
        }
    }

    /// Reset cooldowns and latches for a new driving session.
    pub fn reset_session(&mut self) {
        self.last_critical_focus_ms = None;
        self.last_warning_focus_ms = None;
        self.last_eyes_closed_ms = None;
        self.session_limit_fired = false;
        self.no_break_fired = false;
    }

    /// Clear per-session histories (on stop).
    pub fn clear_history(&mut self) {
        self.alerts.clear();
        self.event_history.clear();
    }

    /// Re-arm the no-break latch (called when a break ends).
    pub fn clear_no_break_latch(&mut self) {
        self.no_break_fired = false;
    }

    /// Full append-only alert list, oldest first.
    pub fn alerts(&self) -> &[AlertEvent] {
        &self.alerts
    }

    /// The 10 most recent alerts, newest first (presentation input).
    pub fn display_alerts(&self) -> Vec<AlertEvent> {
        self.alerts.iter().rev().take(10).cloned().collect()
    }

    /// Combined events + alerts, newest first.
    pub fn event_history(&self) -> &[AlertEvent] {
        &self.event_history
    }
}

impl Default for AlertEngine {
    fn default() -> Self {
        Self::new(AlertConfig::default())
    }
}

/// Milliseconds since a stamp; `u64::MAX` when never stamped so the first
/// comparison against any cooldown passes.
fn elapsed(stamp: Option<u64>, now_ms: u64) -> u64 {
    match stamp {
        Some(t) => now_ms.saturating_sub(t),
        None => u64::MAX,
    }
}
