//! Session controller implementation

use crate::config::MonitorConfig;
use alert_presenter::{AlertPresenter, AudioPort, Presentation};
use alerting::{AlertEngine, AlertEvent, SessionGate, Severity};
use chrono::Utc;
use eye_metrics::Point2;
use focus_tracker::{FocusTracker, FrameOutcome};
use session_timer::{BreakTransition, SessionState};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use telemetry::{MonitorTransport, TripSink, EAR_PUBLISH_INTERVAL_MS};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::warn;
use uuid::Uuid;

/// Landmark detection status for the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonitorStatus {
    #[default]
    NoFaceDetected,
    FaceDetected,
}

/// All live monitor state, mutated only on the controller's logical
/// thread (behind one lock).
struct MonitorState {
    session: SessionState,
    tracker: FocusTracker,
    engine: AlertEngine,
    presenter: AlertPresenter,
    focus_percent: u8,
    face_count: usize,
    status: MonitorStatus,
    presentation: Presentation,
}

impl MonitorState {
    fn gate(&self) -> SessionGate {
        SessionGate {
            is_recording: self.session.is_recording,
            is_on_break: self.session.is_on_break,
        }
    }

    /// Re-run presentation selection over the current alert window.
    fn sync_presenter(&mut self, now_ms: u64) {
        let window = self.engine.display_alerts();
        self.presentation = self.presenter.sync(&window, now_ms);
    }
}

/// Read-only view of the monitor for display layers.
#[derive(Debug, Clone)]
pub struct MonitorSnapshot {
    pub focus_percent: u8,
    pub current_ear: Option<f64>,
    pub face_count: usize,
    pub status: MonitorStatus,
    pub session: SessionState,
    pub presentation: Presentation,
    pub event_history: Vec<AlertEvent>,
    pub is_connected: bool,
}

/// Owns the session state machine and the three monitor timers.
pub struct SessionController<T, S> {
    state: Arc<RwLock<MonitorState>>,
    transport: Arc<T>,
    sink: Arc<S>,
    config: MonitorConfig,
    connect_pending: AtomicBool,
    tasks: Vec<JoinHandle<()>>,
}

impl<T: MonitorTransport, S: TripSink> SessionController<T, S> {
    pub fn new(config: MonitorConfig, transport: T, sink: S, audio: Box<dyn AudioPort>) -> Self {
        let state = MonitorState {
            session: SessionState::new(),
            tracker: FocusTracker::new(),
            engine: AlertEngine::new(config.alerts.clone()),
            presenter: AlertPresenter::new(audio),
            focus_percent: 100,
            face_count: 0,
            status: MonitorStatus::NoFaceDetected,
            presentation: Presentation::default(),
        };

        Self {
            state: Arc::new(RwLock::new(state)),
            transport: Arc::new(transport),
            sink: Arc::new(sink),
            config,
            connect_pending: AtomicBool::new(false),
            tasks: Vec::new(),
        }
    }

    /// Start a driving session. Requires the transport to confirm a
    /// connection within the configured timeout; on failure a forced
    /// warning alert is raised and the session stays idle.
    pub async fn start(&mut self) -> bool {
        if self
            .connect_pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("start ignored: connect already pending");
            return false;
        }

        if self.state.read().await.session.is_recording {
            warn!("start ignored: already recording");
            self.connect_pending.store(false, Ordering::Release);
            return true;
        }

        let timeout = self.config.connect_timeout();
        let connected = tokio::time::timeout(timeout, self.transport.connect(timeout))
            .await
            .unwrap_or(false);
        self.connect_pending.store(false, Ordering::Release);

        let now = now_ms();
        let mut st = self.state.write().await;

        if !connected {
            warn!("transport connect failed; session stays idle");
            let gate = st.gate();
            st.engine.add_alert(
                "Cannot start driving: real-time monitor unavailable",
                Severity::Warning,
                true,
                gate,
                now,
            );
            st.sync_presenter(now);
            return false;
        }

        st.session.begin(now);
        st.tracker.reset(now);
        st.engine.reset_session();
        st.focus_percent = 100;
        // session start doubles as the audio unlock signal
        st.presenter.unlock_audio();
        drop(st);

        self.spawn_tick_task();
        self.spawn_publish_task();
        true
    }

    /// Stop the session. Finalizes any in-progress break, submits the trip
    /// summary best-effort, and clears every timer. Safe to call at any
    /// time, including when already idle.
    pub async fn stop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }

        let now = now_ms();
        let summary = self.state.write().await.session.finish(now);

        if let Some(summary) = summary {
            if let Err(e) = self.sink.submit(&summary).await {
                // trip data loss is accepted over trapping the session
                warn!(error = %e, "trip submission failed");
            }
        }

        self.transport.disconnect();

        let mut st = self.state.write().await;
        st.engine.clear_history();
        st.presenter.reset();
        st.presentation = Presentation::default();
        st.focus_percent = 100;
    }

    /// Toggle the break state, emitting the forced boundary notices.
    pub async fn toggle_break(&mut self) {
        let now = now_ms();
        let mut st = self.state.write().await;

        match st.session.toggle_break(now) {
            BreakTransition::Started => {
                let gate = st.gate();
                st.engine
                    .add_alert("Break started", Severity::Info, true, gate, now);
            }
            BreakTransition::Ended(_) => {
                st.engine.clear_no_break_latch();
                let gate = st.gate();
                st.engine
                    .add_alert("Break ended", Severity::Info, true, gate, now);
            }
            BreakTransition::Ignored => return,
        }

        st.sync_presenter(now);
    }

    /// Ingest one frame from the landmark collaborator. `mesh` is `None`
    /// when no face was detected; `captured_at_ms` is the frame capture
    /// stamp. Never blocks on the transport or any I/O.
    pub async fn ingest_frame(&self, mesh: Option<&[Point2]>, captured_at_ms: u64) {
        let mut st = self.state.write().await;

        st.face_count = usize::from(mesh.is_some());
        st.status = if mesh.is_some() {
            MonitorStatus::FaceDetected
        } else {
            MonitorStatus::NoFaceDetected
        };

        let outcome = st.tracker.ingest(mesh, captured_at_ms);
        let gate = st.gate();

        match outcome {
            FrameOutcome::FaceLost { reading } => {
                st.focus_percent = reading.percent;
            }
            FrameOutcome::Sampled {
                eyes_closed,
                reading,
                ..
            } => {
                if eyes_closed {
                    st.engine.on_eyes_closed(gate, captured_at_ms);
                }
                if let Some(reading) = reading {
                    st.focus_percent = reading.percent;
                    st.engine
                        .on_focus_reading(reading.percent, gate, captured_at_ms);
                }
            }
        }

        st.sync_presenter(captured_at_ms);
    }

    /// User-initiated close of one alert.
    pub async fn dismiss_alert(&self, id: Uuid) {
        let mut st = self.state.write().await;
        st.presenter.dismiss(id);
        st.sync_presenter(now_ms());
    }

    /// Process-wide audio unlock broadcast (user gesture).
    pub async fn unlock_audio(&self) {
        self.state.write().await.presenter.unlock_audio();
    }

    pub async fn snapshot(&self) -> MonitorSnapshot {
        let st = self.state.read().await;
        MonitorSnapshot {
            focus_percent: st.focus_percent,
            current_ear: st.tracker.latest_ear(),
            face_count: st.face_count,
            status: st.status,
            session: st.session.clone(),
            presentation: st.presentation.clone(),
            event_history: st.engine.event_history().to_vec(),
            is_connected: self.transport.is_connected(),
        }
    }

    /// 1 s tick: session counters, duration alerts, auto-dismiss expiry.
    fn spawn_tick_task(&mut self) {
        let state = self.state.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // the first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                let now = now_ms();
                let mut st = state.write().await;
                if !st.session.is_recording {
                    continue;
                }
                st.session.tick(now);
                let gate = st.gate();
                let elapsed = st.session.elapsed_seconds;
                let since_break = st.session.time_since_last_break_seconds;
                st.engine.on_durations(elapsed, since_break, gate, now);
                st.sync_presenter(now);
            }
        });
        self.tasks.push(handle);
    }

    /// 100 ms cadence: publish the latest raw EAR while recording.
    fn spawn_publish_task(&mut self) {
        let state = self.state.clone();
        let transport = self.transport.clone();
        let handle = tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_millis(EAR_PUBLISH_INTERVAL_MS));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let st = state.read().await;
                if !st.session.is_recording {
                    continue;
                }
                if let Some(ear) = st.tracker.latest_ear() {
                    transport.publish_ear(ear);
                }
            }
        });
        self.tasks.push(handle);
    }
}

impl<T, S> Drop for SessionController<T, S> {
    fn drop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

fn now_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::synthetic_mesh;
    use alert_presenter::TracingAudio;
    use telemetry::{ChannelTransport, MemoryTripSink};

    fn controller() -> (
        SessionController<ChannelTransport, MemoryTripSink>,
        tokio::sync::mpsc::UnboundedReceiver<telemetry::EarMessage>,
    ) {
        let (transport, rx) = ChannelTransport::new();
        let sink = MemoryTripSink::new();
        let controller = SessionController::new(
            MonitorConfig::default(),
            transport,
            sink,
            Box::<TracingAudio>::default(),
        );
        (controller, rx)
    }

    #[tokio::test]
    async fn test_start_connect_failure_raises_forced_warning() {
        let (mut controller, _rx) = controller();
        controller.transport.set_reachable(false);

        assert!(!controller.start().await);

        let snapshot = controller.snapshot().await;
        assert!(!snapshot.session.is_recording);
        assert_eq!(snapshot.event_history.len(), 1);
        assert_eq!(snapshot.event_history[0].severity, Severity::Warning);
        assert!(snapshot.event_history[0].forced);
    }

    /// Transport whose connect attempt hangs forever.
    struct StalledTransport;

    impl telemetry::MonitorTransport for StalledTransport {
        async fn connect(&self, _timeout: Duration) -> bool {
            std::future::pending().await
        }

        fn publish_ear(&self, _ear: f64) -> bool {
            false
        }

        fn disconnect(&self) {}

        fn is_connected(&self) -> bool {
            false
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_timeout_keeps_session_idle() {
        let mut controller = SessionController::new(
            MonitorConfig::default(),
            StalledTransport,
            MemoryTripSink::new(),
            Box::<TracingAudio>::default(),
        );

        assert!(!controller.start().await);

        let snapshot = controller.snapshot().await;
        assert!(!snapshot.session.is_recording);
        assert!(!snapshot.is_connected);
        let warnings: Vec<_> = snapshot
            .event_history
            .iter()
            .filter(|e| e.severity == Severity::Warning && e.forced)
            .collect();
        assert_eq!(warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_start_begins_recording() {
        let (mut controller, _rx) = controller();
        assert!(controller.start().await);

        let snapshot = controller.snapshot().await;
        assert!(snapshot.session.is_recording);
        assert!(snapshot.is_connected);
        controller.stop().await;
    }

    #[tokio::test]
    async fn test_stop_mid_break_submits_final_interval() {
        let (mut controller, _rx) = controller();
        controller.start().await;
        controller.toggle_break().await;
        controller.stop().await;

        let trips = controller.sink.trips();
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].breaks.len(), 1);

        let snapshot = controller.snapshot().await;
        assert!(!snapshot.session.is_recording);
    }

    #[tokio::test]
    async fn test_stop_is_idempotent_and_sink_failure_tolerated() {
        let (mut controller, _rx) = controller();
        controller.sink.set_failing(true);
        controller.start().await;
        controller.stop().await;
        controller.stop().await;

        let snapshot = controller.snapshot().await;
        assert!(!snapshot.session.is_recording);
        assert!(controller.sink.trips().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_break_while_idle_is_noop() {
        let (mut controller, _rx) = controller();
        controller.toggle_break().await;

        let snapshot = controller.snapshot().await;
        assert!(snapshot.event_history.is_empty());
        assert!(!snapshot.session.is_on_break);
    }

    #[tokio::test]
    async fn test_break_boundaries_emit_forced_info() {
        let (mut controller, _rx) = controller();
        controller.start().await;
        controller.toggle_break().await;
        controller.toggle_break().await;

        let snapshot = controller.snapshot().await;
        let messages: Vec<&str> = snapshot
            .event_history
            .iter()
            .map(|e| e.message.as_str())
            .collect();
        assert!(messages.contains(&"Break started"));
        assert!(messages.contains(&"Break ended"));
        assert_eq!(snapshot.session.breaks.len(), 1);
        controller.stop().await;
    }

    #[tokio::test]
    async fn test_focus_dip_emits_single_critical() {
        let (mut controller, _rx) = controller();
        controller.start().await;
        let t0 = now_ms();

        // attentive first period
        let open = synthetic_mesh(0.38);
        controller.ingest_frame(Some(&open), t0 + 100).await;
        controller.ingest_frame(Some(&open), t0 + 2_100).await;

        // drowsy second period: EAR 0.24 maps to focus 14
        let drowsy = synthetic_mesh(0.24);
        for i in 0..5 {
            controller
                .ingest_frame(Some(&drowsy), t0 + 2_200 + i * 100)
                .await;
        }
        controller.ingest_frame(Some(&drowsy), t0 + 4_200).await;

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.focus_percent, 14);

        let criticals: Vec<_> = snapshot
            .event_history
            .iter()
            .filter(|e| e.severity == Severity::Critical)
            .collect();
        assert_eq!(criticals.len(), 1);
        assert_eq!(
            snapshot.presentation.central.as_ref().unwrap().severity,
            Severity::Critical
        );

        // oscillation into the warning band stays silent within the cooldown
        let hazy = synthetic_mesh(0.3);
        controller.ingest_frame(Some(&hazy), t0 + 4_300).await;
        controller.ingest_frame(Some(&hazy), t0 + 6_300).await;
        let snapshot = controller.snapshot().await;
        assert!(snapshot
            .event_history
            .iter()
            .all(|e| e.severity != Severity::Warning || e.forced));

        controller.stop().await;
    }

    #[tokio::test]
    async fn test_face_lost_forces_focus_100() {
        let (mut controller, _rx) = controller();
        controller.start().await;
        let t0 = now_ms();

        let drowsy = synthetic_mesh(0.22);
        controller.ingest_frame(Some(&drowsy), t0 + 100).await;
        controller.ingest_frame(None, t0 + 200).await;

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.focus_percent, 100);
        assert_eq!(snapshot.status, MonitorStatus::NoFaceDetected);
        assert_eq!(snapshot.current_ear, None);
        controller.stop().await;
    }

    #[tokio::test]
    async fn test_eyes_closed_event_recorded() {
        let (mut controller, _rx) = controller();
        controller.start().await;
        let t0 = now_ms();

        let closed = synthetic_mesh(0.1);
        controller.ingest_frame(Some(&closed), t0 + 100).await;
        controller.ingest_frame(Some(&closed), t0 + 200).await;

        let snapshot = controller.snapshot().await;
        let eyes_closed: Vec<_> = snapshot
            .event_history
            .iter()
            .filter(|e| e.message == "Eyes closed detected")
            .collect();
        assert_eq!(eyes_closed.len(), 1);
        controller.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_publisher_ships_latest_ear() {
        let (mut controller, mut rx) = controller();
        controller.start().await;
        let t0 = now_ms();

        controller
            .ingest_frame(Some(&synthetic_mesh(0.3)), t0 + 100)
            .await;
        for _ in 0..5 {
            tokio::time::advance(Duration::from_millis(100)).await;
            tokio::task::yield_now().await;
        }

        let message = rx.try_recv().expect("published");
        assert!((message.ear - 0.3).abs() < 0.01);
        controller.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_limit_alert_fires_once() {
        let mut config = MonitorConfig::default();
        config.alerts.session_limit_seconds = 5;
        let (transport, _rx) = ChannelTransport::new();
        let mut controller = SessionController::new(
            config,
            transport,
            MemoryTripSink::new(),
            Box::<TracingAudio>::default(),
        );

        controller.start().await;
        for _ in 0..10 {
            tokio::time::advance(Duration::from_secs(1)).await;
            tokio::task::yield_now().await;
        }

        let snapshot = controller.snapshot().await;
        let limit_alerts: Vec<_> = snapshot
            .event_history
            .iter()
            .filter(|e| e.message.contains("4 hours"))
            .collect();
        assert_eq!(limit_alerts.len(), 1);
        controller.stop().await;
    }
}
