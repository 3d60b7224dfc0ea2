//! Trip persistence sink

use crate::TelemetryError;
use session_timer::TripSummary;
use std::sync::Mutex;
use tracing::{info, warn};

/// External HTTP service that accepts finished trip summaries. Submission
/// is best-effort: a failure is logged by the caller and never blocks the
/// local session reset.
#[allow(async_fn_in_trait)]
pub trait TripSink: Send + Sync + 'static {
    async fn submit(&self, trip: &TripSummary) -> Result<(), TelemetryError>;
}

/// Sink posting `{startTime, endTime, breaks}` JSON to the trip endpoint.
pub struct HttpTripSink {
    client: reqwest::Client,
    endpoint: String,
    bearer_token: Option<String>,
}

impl HttpTripSink {
    /// `base_url` without a trailing slash, e.g. `http://localhost:8082`.
    pub fn new(base_url: &str, bearer_token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{base_url}/api/endTrip"),
            bearer_token,
        }
    }
}

impl TripSink for HttpTripSink {
    async fn submit(&self, trip: &TripSummary) -> Result<(), TelemetryError> {
        let mut request = self.client.post(&self.endpoint).json(trip);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TelemetryError::Sink(e.to_string()))?;

        if response.status().is_success() {
            info!(endpoint = %self.endpoint, "trip submitted");
            Ok(())
        } else {
            let status = response.status();
            warn!(%status, "trip submission rejected");
            Err(TelemetryError::Sink(format!("status {status}")))
        }
    }
}

/// In-memory sink for tests and the demo binary.
#[derive(Default)]
pub struct MemoryTripSink {
    trips: Mutex<Vec<TripSummary>>,
    fail: Mutex<bool>,
}

impl MemoryTripSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent submissions fail (sink outage).
    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    pub fn trips(&self) -> Vec<TripSummary> {
        self.trips.lock().unwrap().clone()
    }
}

impl TripSink for MemoryTripSink {
    async fn submit(&self, trip: &TripSummary) -> Result<(), TelemetryError> {
        if *self.fail.lock().unwrap() {
            return Err(TelemetryError::Sink("simulated outage".into()));
        }
        self.trips.lock().unwrap().push(trip.clone());
        Ok(())
    }
}
