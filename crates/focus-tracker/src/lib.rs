//! Focus tracker
//!
//! Consumes per-frame face-mesh landmarks, maintains a bounded window of
//! raw EAR samples, and produces a smoothed focus-percent reading every
//! fixed wall-clock interval. Normal blinks transiently drop EAR, so each
//! period averages only the highest samples in the window, biasing the
//! estimate toward most-open-eyes moments.

pub mod window;

pub use window::SampleWindow;

use eye_metrics::{
    eye_aspect_ratio, eye_points, map_ear_to_focus_percent, Point2, EAR_CLOSED_THRESHOLD,
    LEFT_EYE_LANDMARKS, RIGHT_EYE_LANDMARKS,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Wall-clock interval between focus computations.
pub const FOCUS_UPDATE_INTERVAL_MS: u64 = 2000;

/// Number of highest samples averaged per period.
pub const TOP_N_SAMPLES: usize = 10;

/// One raw EAR sample captured from a processed frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EarSample {
    pub value: f64,
    pub captured_at_ms: u64,
}

/// A calibrated focus reading, published once per interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusReading {
    /// Focus percentage in [0, 100].
    pub percent: u8,
    pub computed_at_ms: u64,
}

/// Outcome of ingesting a single video frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// No face on this frame: window cleared, focus forced to 100
    /// immediately (absence of a face is "fully attentive" by product
    /// decision, not "unknown").
    FaceLost { reading: FocusReading },

    /// A face was present and sampled.
    Sampled {
        /// Average of left and right EAR for this frame.
        raw_avg_ear: f64,
        /// The raw value fell below the hard closed-eyes threshold.
        eyes_closed: bool,
        /// Periodic reading, present only when the interval boundary was
        /// crossed on this frame.
        reading: Option<FocusReading>,
    },
}

/// Windowed EAR aggregator and focus mapper.
#[derive(Debug)]
pub struct FocusTracker {
    window: SampleWindow,
    last_update_ms: u64,
    latest_ear: Option<f64>,
}

impl FocusTracker {
    pub fn new() -> Self {
        Self {
            window: SampleWindow::with_default_capacity(),
            last_update_ms: 0,
            latest_ear: None,
        }
    }

    /// Clear the window and restart the interval clock (new session).
    pub fn reset(&mut self, now_ms: u64) {
        self.window.clear();
        self.last_update_ms = now_ms;
        self.latest_ear = None;
    }

    /// Most recent raw EAR, rounded to 3 decimals for display/publishing.
    /// `None` while no face is visible.
    pub fn latest_ear(&self) -> Option<f64> {
        self.latest_ear.map(|e| (e * 1000.0).round() / 1000.0)
    }

    /// Ingest one frame of face-mesh landmarks.
    ///
    /// `mesh` is `None` when the landmark collaborator reported no face.
    /// This is the highest-frequency entry point (camera frame rate) and
    /// never blocks.
    pub fn ingest(&mut self, mesh: Option<&[Point2]>, now_ms: u64) -> FrameOutcome {
        let Some(mesh) = mesh else {
            self.window.clear();
            self.latest_ear = None;
            self.last_update_ms = now_ms;
            return FrameOutcome::FaceLost {
                reading: FocusReading {
                    percent: 100,
                    computed_at_ms: now_ms,
                },
            };
        };

        let left = eye_aspect_ratio(&eye_points(mesh, &LEFT_EYE_LANDMARKS));
        let right = eye_aspect_ratio(&eye_points(mesh, &RIGHT_EYE_LANDMARKS));
        let raw_avg_ear = (left + right) / 2.0;

        if raw_avg_ear.is_finite() {
            self.window.push(EarSample {
                value: raw_avg_ear,
                captured_at_ms: now_ms,
            });
        }
        self.latest_ear = Some(raw_avg_ear);

        let eyes_closed = raw_avg_ear < EAR_CLOSED_THRESHOLD;

        let reading = if now_ms.saturating_sub(self.last_update_ms) >= FOCUS_UPDATE_INTERVAL_MS {
            Some(self.compute_reading(now_ms))
        } else {
            None
        };

        FrameOutcome::Sampled {
            raw_avg_ear,
            eyes_closed,
            reading,
        }
    }

    /// Average the top-N window samples, clear the window, and map the
    /// result onto a focus percentage. An empty window means the face was
    /// lost for the whole period and forces 100.
    fn compute_reading(&mut self, now_ms: u64) -> FocusReading {
        let percent = match self.window.top_n_average(TOP_N_SAMPLES) {
            Some(avg) => map_ear_to_focus_percent(avg),
            None => 100,
        };
        debug!(percent, samples = self.window.len(), "focus period computed");
        self.window.clear();
        self.last_update_ms = now_ms;

        FocusReading {
            percent,
            computed_at_ms: now_ms,
        }
    }
}

impl Default for FocusTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Synthetic mesh whose left and right eyes both measure the given EAR.
    fn mesh_with_ear(ear: f64) -> Vec<Point2> {
        let mut mesh = vec![Point2::default(); 478];
        // horizontal corner distance 0.1, so each vertical pair spans
        // ear * 0.1 (two pairs averaging to the target).
        let v = ear * 0.1;
        for indices in [&LEFT_EYE_LANDMARKS, &RIGHT_EYE_LANDMARKS] {
            mesh[indices[0]] = Point2::new(0.0, 0.5);
            mesh[indices[3]] = Point2::new(0.1, 0.5);
            mesh[indices[1]] = Point2::new(0.03, 0.5 + v / 2.0);
            mesh[indices[5]] = Point2::new(0.03, 0.5 - v / 2.0);
            mesh[indices[2]] = Point2::new(0.07, 0.5 + v / 2.0);
            mesh[indices[4]] = Point2::new(0.07, 0.5 - v / 2.0);
        }
        mesh
    }

    #[test]
    fn test_face_lost_forces_full_focus() {
        let mut tracker = FocusTracker::new();
        tracker.reset(0);
        tracker.ingest(Some(&mesh_with_ear(0.25)), 100);

        let outcome = tracker.ingest(None, 200);
        match outcome {
            FrameOutcome::FaceLost { reading } => {
                assert_eq!(reading.percent, 100);
                assert_eq!(reading.computed_at_ms, 200);
            }
            other => panic!("expected FaceLost, got {other:?}"),
        }
        assert_eq!(tracker.latest_ear(), None);
    }

    #[test]
    fn test_no_reading_before_interval() {
        let mut tracker = FocusTracker::new();
        tracker.reset(0);
        let outcome = tracker.ingest(Some(&mesh_with_ear(0.3)), 1999);
        assert!(matches!(
            outcome,
            FrameOutcome::Sampled { reading: None, .. }
        ));
    }

    #[test]
    fn test_reading_at_interval_boundary() {
        let mut tracker = FocusTracker::new();
        tracker.reset(0);
        tracker.ingest(Some(&mesh_with_ear(0.4)), 500);
        let outcome = tracker.ingest(Some(&mesh_with_ear(0.4)), 2000);
        match outcome {
            FrameOutcome::Sampled {
                reading: Some(reading),
                ..
            } => assert_eq!(reading.percent, 100),
            other => panic!("expected periodic reading, got {other:?}"),
        }
    }

    #[test]
    fn test_top_n_suppresses_blinks() {
        let mut tracker = FocusTracker::new();
        tracker.reset(0);

        // ten wide-open samples, then a burst of blink samples
        for i in 0..10 {
            tracker.ingest(Some(&mesh_with_ear(0.4)), 10 + i);
        }
        for i in 0..20 {
            tracker.ingest(Some(&mesh_with_ear(0.05)), 100 + i);
        }

        let outcome = tracker.ingest(Some(&mesh_with_ear(0.4)), 2000);
        match outcome {
            FrameOutcome::Sampled {
                reading: Some(reading),
                ..
            } => assert_eq!(reading.percent, 100),
            other => panic!("expected periodic reading, got {other:?}"),
        }
    }

    #[test]
    fn test_eyes_closed_signal() {
        let mut tracker = FocusTracker::new();
        tracker.reset(0);
        let outcome = tracker.ingest(Some(&mesh_with_ear(0.1)), 100);
        assert!(matches!(
            outcome,
            FrameOutcome::Sampled {
                eyes_closed: true,
                ..
            }
        ));

        let outcome = tracker.ingest(Some(&mesh_with_ear(0.3)), 200);
        assert!(matches!(
            outcome,
            FrameOutcome::Sampled {
                eyes_closed: false,
                ..
            }
        ));
    }

    #[test]
    fn test_window_cleared_after_period() {
        let mut tracker = FocusTracker::new();
        tracker.reset(0);
        tracker.ingest(Some(&mesh_with_ear(0.05)), 100);
        tracker.ingest(Some(&mesh_with_ear(0.05)), 2000);

        // next period only sees the new wide-open samples
        tracker.ingest(Some(&mesh_with_ear(0.4)), 2100);
        let outcome = tracker.ingest(Some(&mesh_with_ear(0.4)), 4000);
        match outcome {
            FrameOutcome::Sampled {
                reading: Some(reading),
                ..
            } => assert_eq!(reading.percent, 100),
            other => panic!("expected periodic reading, got {other:?}"),
        }
    }

    #[test]
    fn test_latest_ear_rounded() {
        let mut tracker = FocusTracker::new();
        tracker.reset(0);
        tracker.ingest(Some(&mesh_with_ear(0.333_333)), 100);
        let ear = tracker.latest_ear().unwrap();
        assert!((ear * 1000.0).fract().abs() < 1e-9);
    }
}
