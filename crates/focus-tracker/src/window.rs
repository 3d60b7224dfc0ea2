//! Bounded EAR sample window

use crate::EarSample;
use std::collections::VecDeque;

/// Default capacity: one 2 s period at 60 fps with headroom. The window is
/// cleared after every period, so the bound only matters if the camera
/// outruns the interval clock; when it does, the oldest samples drop.
pub const DEFAULT_CAPACITY: usize = 256;

/// Bounded, resettable in-memory window of raw EAR samples.
#[derive(Debug)]
pub struct SampleWindow {
    samples: VecDeque<EarSample>,
    capacity: usize,
}

impl SampleWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }

    /// Push a sample, dropping the oldest when full.
    pub fn push(&mut self, sample: EarSample) {
        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Average of the `n` highest sample values, or `None` when empty.
    /// Fewer than `n` samples average whatever is present.
    pub fn top_n_average(&self, n: usize) -> Option<f64> {
        if self.samples.is_empty() || n == 0 {
            return None;
        }

        let mut values: Vec<f64> = self.samples.iter().map(|s| s.value).collect();
        values.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        values.truncate(n);

        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
