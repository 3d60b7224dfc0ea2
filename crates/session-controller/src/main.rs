//! RoadGuard Focus Monitor - Demo Entry Point
//!
//! Replays a scripted drive through the full pipeline with an in-process
//! transport playing the remote collector.

use alert_presenter::TracingAudio;
use chrono::Utc;
use session_controller::trace::{demo_trace, synthetic_mesh};
use session_controller::{init_logging, MonitorConfig, SessionController};
use telemetry::{ChannelTransport, MemoryTripSink};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    info!("=== RoadGuard Focus Monitor v{} ===", env!("CARGO_PKG_VERSION"));

    let config = MonitorConfig::load().unwrap_or_else(|e| {
        info!("no config loaded ({e}), using defaults");
        MonitorConfig::default()
    });

    let (transport, mut collector_rx) = ChannelTransport::new();
    let sink = MemoryTripSink::new();
    let mut controller =
        SessionController::new(config, transport, sink, Box::<TracingAudio>::default());

    // drain the collector side so publishes have somewhere to go
    let collector = tokio::spawn(async move {
        let mut received = 0usize;
        while collector_rx.recv().await.is_some() {
            received += 1;
        }
        received
    });

    if !controller.start().await {
        anyhow::bail!("could not start session: monitor unavailable");
    }

    let t0 = Utc::now().timestamp_millis().max(0) as u64;
    let mut last_focus = u8::MAX;

    for (offset_ms, ear) in demo_trace() {
        let mesh = ear.map(synthetic_mesh);
        controller
            .ingest_frame(mesh.as_deref(), t0 + offset_ms)
            .await;

        let snapshot = controller.snapshot().await;
        if snapshot.focus_percent != last_focus {
            last_focus = snapshot.focus_percent;
            info!(
                focus = snapshot.focus_percent,
                ear = ?snapshot.current_ear,
                central = snapshot
                    .presentation
                    .central
                    .as_ref()
                    .map(|a| a.message.as_str()),
                "focus updated"
            );
        }

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }

    let snapshot = controller.snapshot().await;
    info!(
        events = snapshot.event_history.len(),
        "drive finished, stopping session"
    );
    for event in snapshot.event_history.iter().rev() {
        info!(?event.severity, "  {}", event.message);
    }

    controller.stop().await;
    drop(controller);

    let published = collector.await?;
    info!(published, "collector received EAR messages");

    Ok(())
}
