//! Audio port and single-loop policy

use std::collections::HashSet;
use tracing::{debug, info};
use uuid::Uuid;

/// Sound to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    Warning,
    Critical,
}

/// Output port for alert audio. Implementations are thin: the mixer owns
/// the loop bookkeeping and the "at most one loop" rule.
pub trait AudioPort: Send + Sync {
    fn play_one_shot(&mut self, cue: SoundCue);
    fn start_loop(&mut self, id: Uuid, cue: SoundCue);
    fn stop_loop(&mut self, id: Uuid);
}

/// Default headless port: logs what would play.
#[derive(Debug, Default)]
pub struct TracingAudio;

impl AudioPort for TracingAudio {
    fn play_one_shot(&mut self, cue: SoundCue) {
        info!(?cue, "one-shot sound");
    }

    fn start_loop(&mut self, id: Uuid, cue: SoundCue) {
        info!(%id, ?cue, "audio loop started");
    }

    fn stop_loop(&mut self, id: Uuid) {
        info!(%id, "audio loop stopped");
    }
}

/// Gatekeeper in front of an [`AudioPort`].
///
/// Enforces the two audio rules: nothing plays until audio has been
/// unlocked by a user gesture or the session-start broadcast, and at most
/// one looping source exists at a time (starting a loop force-stops every
/// other tracked loop first).
pub struct AudioMixer {
    port: Box<dyn AudioPort>,
    unlocked: bool,
    active_loops: HashSet<Uuid>,
}

impl AudioMixer {
    pub fn new(port: Box<dyn AudioPort>) -> Self {
        Self {
            port,
            unlocked: false,
            active_loops: HashSet::new(),
        }
    }

    /// Allow playback from now on (autoplay policy satisfied).
    pub fn unlock(&mut self) {
        if !self.unlocked {
            self.unlocked = true;
            info!("audio unlocked");
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// One-shot cue; silently skipped while locked.
    pub fn play_one_shot(&mut self, cue: SoundCue) {
        if !self.unlocked {
            debug!(?cue, "one-shot skipped: audio locked");
            return;
        }
        self.port.play_one_shot(cue);
    }

    /// Start the critical loop for an alert id, stopping every other
    /// tracked loop first.
    pub fn start_critical_loop(&mut self, id: Uuid) {
        if !self.unlocked {
            debug!(%id, "loop skipped: audio locked");
            return;
        }
        if self.active_loops.contains(&id) {
            return;
        }
        self.stop_all_loops();
        self.port.start_loop(id, SoundCue::Critical);
        self.active_loops.insert(id);
    }

    /// Stop the loop tied to an alert id, if any.
    pub fn stop_loop(&mut self, id: Uuid) {
        if self.active_loops.remove(&id) {
            self.port.stop_loop(id);
        }
    }

    pub fn stop_all_loops(&mut self) {
        let ids: Vec<Uuid> = self.active_loops.drain().collect();
        for id in ids {
            self.port.stop_loop(id);
        }
    }

    pub fn active_loop_count(&self) -> usize {
        self.active_loops.len()
    }
}
