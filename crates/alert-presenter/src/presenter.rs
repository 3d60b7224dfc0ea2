//! Presenter state: dismissal, auto-hide, audio transitions

use crate::audio::{AudioMixer, AudioPort, SoundCue};
use crate::selection::{select, Presentation};
use alerting::{AlertEvent, Severity};
use std::collections::HashMap;
use std::collections::HashSet;
use uuid::Uuid;

/// Non-critical alerts hide themselves after this long on screen.
pub const AUTO_DISMISS_MS: u64 = 5000;

/// Stateful presentation engine over the alert window.
///
/// Owns the locally-dismissed set, the pending auto-dismiss deadlines, and
/// the audio mixer; `sync` is called whenever the alert window may have
/// changed (and at least once a second for auto-dismiss expiry).
pub struct AlertPresenter {
    mixer: AudioMixer,
    hidden: HashSet<Uuid>,
    dismiss_deadlines: HashMap<Uuid, u64>,
    prev_central: Option<Uuid>,
}

impl AlertPresenter {
    pub fn new(port: Box<dyn AudioPort>) -> Self {
        Self {
            mixer: AudioMixer::new(port),
            hidden: HashSet::new(),
            dismiss_deadlines: HashMap::new(),
            prev_central: None,
        }
    }

    /// Process-wide audio unlock signal (user gesture or session start).
    pub fn unlock_audio(&mut self) {
        self.mixer.unlock();
    }

    /// Recompute the presentation for the current alert window (newest
    /// first, the last 10 from the engine).
    ///
    /// Expires due auto-dismiss deadlines, schedules new ones for
    /// non-critical alerts, and drives the audio transitions: a loop for a
    /// newly-central critical, a one-shot on the transition into a
    /// non-critical central (not on every render).
    pub fn sync(&mut self, window: &[AlertEvent], now_ms: u64) -> Presentation {
        if window.is_empty() {
            self.hidden.clear();
            self.dismiss_deadlines.clear();
            self.mixer.stop_all_loops();
            self.prev_central = None;
            return Presentation::default();
        }

        // expire due auto-hides
        let due: Vec<Uuid> = self
            .dismiss_deadlines
            .iter()
            .filter(|(_, &deadline)| deadline <= now_ms)
            .map(|(&id, _)| id)
            .collect();
        for id in due {
            self.dismiss_deadlines.remove(&id);
            self.hidden.insert(id);
        }

        // schedule auto-hide for newly rendered non-critical alerts
        for alert in window {
            if alert.severity == Severity::Critical
                || self.hidden.contains(&alert.id)
                || self.dismiss_deadlines.contains_key(&alert.id)
            {
                continue;
            }
            self.dismiss_deadlines
                .insert(alert.id, now_ms + AUTO_DISMISS_MS);
        }

        let visible: Vec<AlertEvent> = window
            .iter()
            .filter(|a| !self.hidden.contains(&a.id))
            .cloned()
            .collect();
        let presentation = select(&visible);

        let central_id = presentation.central.as_ref().map(|a| a.id);
        if self.prev_central != central_id {
            if let Some(prev) = self.prev_central {
                self.mixer.stop_loop(prev);
            }
            if let Some(central) = &presentation.central {
                if central.severity == Severity::Critical {
                    self.mixer.start_critical_loop(central.id);
                } else {
                    self.mixer.play_one_shot(SoundCue::Warning);
                }
            }
            self.prev_central = central_id;
        }

        presentation
    }

    /// User-initiated close: hides the alert, cancels its pending
    /// auto-dismiss, and stops any loop tied to its id.
    pub fn dismiss(&mut self, id: Uuid) {
        self.hidden.insert(id);
        self.dismiss_deadlines.remove(&id);
        self.mixer.stop_loop(id);
    }

    /// Drop all presenter state (session stop).
    pub fn reset(&mut self) {
        self.hidden.clear();
        self.dismiss_deadlines.clear();
        self.mixer.stop_all_loops();
        self.prev_central = None;
    }

    pub fn active_loop_count(&self) -> usize {
        self.mixer.active_loop_count()
    }
}
