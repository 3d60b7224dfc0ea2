//! Monitor transport port

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Cadence of live EAR publishing while connected and recording.
pub const EAR_PUBLISH_INTERVAL_MS: u64 = 100;

/// Wire payload for one live EAR value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EarMessage {
    pub ear: f64,
}

/// Send-capable, connect/disconnect-capable channel to the remote
/// collector.
///
/// `publish_ear` is fire-and-forget and must never block: it is driven by
/// a fixed-cadence task while the per-frame path runs at camera rate.
#[allow(async_fn_in_trait)]
pub trait MonitorTransport: Send + Sync + 'static {
    /// Attempt to connect, resolving `true` on confirmation within the
    /// timeout and `false` on failure or expiry. Never errors.
    async fn connect(&self, timeout: Duration) -> bool;

    /// Fire-and-forget publish of one EAR value. Returns whether the
    /// value was accepted for sending.
    fn publish_ear(&self, ear: f64) -> bool;

    fn disconnect(&self);

    /// Connection status flag (consumed by the UI only).
    fn is_connected(&self) -> bool;
}

/// In-process transport backed by a tokio channel; the receiving half
/// plays the remote collector (demo binary and tests).
pub struct ChannelTransport {
    tx: mpsc::UnboundedSender<EarMessage>,
    connected: AtomicBool,
    reachable: AtomicBool,
}

impl ChannelTransport {
    /// Create a transport and the collector-side receiver.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<EarMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let transport = Self {
            tx,
            connected: AtomicBool::new(false),
            reachable: AtomicBool::new(true),
        };
        (transport, rx)
    }

    /// Simulate the collector going away (connect attempts fail).
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::Relaxed);
    }
}

impl MonitorTransport for ChannelTransport {
    async fn connect(&self, _timeout: Duration) -> bool {
        if !self.reachable.load(Ordering::Relaxed) {
            warn!("monitor transport unreachable");
            return false;
        }
        self.connected.store(true, Ordering::Relaxed);
        info!("monitor transport connected");
        true
    }

    fn publish_ear(&self, ear: f64) -> bool {
        if !self.is_connected() {
            return false;
        }
        match self.tx.send(EarMessage { ear }) {
            Ok(()) => true,
            Err(_) => {
                debug!("collector receiver dropped");
                false
            }
        }
    }

    fn disconnect(&self) {
        self.connected.store(false, Ordering::Relaxed);
        info!("monitor transport disconnected");
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_then_publish() {
        let (transport, mut rx) = ChannelTransport::new();
        assert!(!transport.is_connected());
        assert!(!transport.publish_ear(0.3));

        assert!(transport.connect(Duration::from_secs(5)).await);
        assert!(transport.publish_ear(0.3));
        assert_eq!(rx.recv().await, Some(EarMessage { ear: 0.3 }));
    }

    #[tokio::test]
    async fn test_unreachable_connect_fails() {
        let (transport, _rx) = ChannelTransport::new();
        transport.set_reachable(false);
        assert!(!transport.connect(Duration::from_secs(5)).await);
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn test_disconnect_stops_publishing() {
        let (transport, _rx) = ChannelTransport::new();
        transport.connect(Duration::from_secs(5)).await;
        transport.disconnect();
        assert!(!transport.publish_ear(0.3));
    }
}
