//! Trip summary assembly

use crate::state::BreakInterval;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One break of a finished trip, ISO-8601 stamped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripBreak {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Payload submitted to the persistence sink when a session stops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSummary {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub breaks: Vec<TripBreak>,
}

impl TripSummary {
    pub fn new(start_ms: u64, end_ms: u64, breaks: &[BreakInterval]) -> Self {
        Self {
            start_time: to_utc(start_ms),
            end_time: to_utc(end_ms),
            breaks: breaks
                .iter()
                .map(|b| TripBreak {
                    start_time: to_utc(b.start_ms),
                    end_time: to_utc(b.end_ms),
                })
                .collect(),
        }
    }
}

fn to_utc(ms: u64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(ms as i64).unwrap_or_default()
}
