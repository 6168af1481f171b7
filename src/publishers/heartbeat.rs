/*!
 * Heartbeat Publisher
 * Periodic liveness events with a monotonic sequence
 *
 * The core is a synchronous `tick()` so tests need no runtime; `spawn`
 * drives it from a tokio interval.
 */

use crate::channel::{Channel, ChannelEvent, Payload};
use crate::core::limits::DEFAULT_HEARTBEAT_INTERVAL_MS;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Heartbeat publisher options
#[derive(Debug, Clone)]
pub struct HeartbeatConfig {
    pub interval: Duration,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_HEARTBEAT_INTERVAL_MS),
        }
    }
}

/// Emits sequence-numbered heartbeat events
pub struct HeartbeatPublisher {
    channel: Arc<Channel>,
    config: HeartbeatConfig,
    sequence: AtomicU64,
}

impl HeartbeatPublisher {
    pub fn new(channel: Arc<Channel>, config: HeartbeatConfig) -> Self {
        Self {
            channel,
            config,
            sequence: AtomicU64::new(0),
        }
    }

    /// Configured interval between heartbeats
    pub fn interval(&self) -> Duration {
        self.config.interval
    }

    /// Emit one heartbeat; returns its sequence number (starting at 1)
    pub fn tick(&self) -> u64 {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        self.channel.publish(ChannelEvent::new(Payload::Heartbeat {
            sequence,
            interval_ms: self.config.interval.as_millis() as u64,
        }));
        sequence
    }

    /// Drive ticks from a tokio interval until the task is aborted
    pub fn spawn(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.config.interval);
            // The first tick fires immediately, giving the start-of-session
            // heartbeat before the steady interval.
            loop {
                interval.tick().await;
                self.tick();
            }
        })
    }
}
