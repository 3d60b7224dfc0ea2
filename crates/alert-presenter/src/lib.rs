//! Alert presenter
//!
//! Decides which alerts the driver sees and hears: corner vs. the single
//! central slot, auto-dismiss scheduling, and the one-looping-audio-source
//! policy. Selection is a pure function over the current alert window;
//! audio goes through a thin, swappable port.

mod audio;
mod presenter;
mod selection;

pub use audio::{AudioMixer, AudioPort, SoundCue, TracingAudio};
pub use presenter::{AlertPresenter, AUTO_DISMISS_MS};
pub use selection::{select, Presentation};
