/*!
 * Event Bus
 * Synchronous typed publish/subscribe keyed by event name
 *
 * Dispatch is synchronous and re-entrant-safe: the subscriber list is
 * snapshotted at dispatch start, so handlers may publish further events or
 * subscribe/unsubscribe without corrupting iteration. A handler removed
 * mid-dispatch is skipped for the rest of that pass.
 */

use super::event::ChannelEvent;
use super::name::EventName;
use super::sink::{panic_message, ErrorSink, TracingSink};
use crate::core::errors::{ChannelError, ChannelResult};
use crate::core::types::SubscriptionId;
use ahash::AHashMap;
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Handler invoked for every published event of a subscribed name
pub type Handler = dyn Fn(&ChannelEvent) + Send + Sync;

/// Global channel instance counter, used to detect foreign handles
static CHANNEL_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// Opaque unsubscribe handle returned by [`Channel::subscribe`]
///
/// Only valid on the channel instance that issued it.
#[derive(Debug, Clone)]
pub struct SubscriptionHandle {
    channel: u64,
    name: EventName,
    id: SubscriptionId,
}

impl SubscriptionHandle {
    /// Event name this subscription listens on
    pub fn event_name(&self) -> &EventName {
        &self.name
    }
}

struct Entry {
    id: SubscriptionId,
    /// Cleared on unsubscribe so in-flight dispatch passes skip the handler
    active: Arc<AtomicBool>,
    handler: Arc<Handler>,
}

/// Channel statistics for monitoring the observer
#[derive(Debug, Clone, Default)]
pub struct ChannelStats {
    pub events_published: u64,
    pub handlers_invoked: u64,
    pub handler_panics: u64,
    pub active_subscriptions: usize,
}

/// Process-wide (or test-scoped) typed publish/subscribe bus
///
/// The bus owns the strong reference to every handler; subscriptions live
/// until explicitly unsubscribed.
pub struct Channel {
    instance: u64,
    subscribers: Mutex<AHashMap<EventName, Vec<Entry>>>,
    next_id: AtomicU64,
    sink: Arc<dyn ErrorSink>,
    published: AtomicU64,
    invoked: AtomicU64,
    panics: AtomicU64,
}

impl Channel {
    /// Create a channel reporting observer failures through tracing
    pub fn new() -> Self {
        Self::with_sink(Arc::new(TracingSink))
    }

    /// Create a channel with a custom observer-failure sink
    pub fn with_sink(sink: Arc<dyn ErrorSink>) -> Self {
        Self {
            instance: CHANNEL_INSTANCE.fetch_add(1, Ordering::Relaxed),
            subscribers: Mutex::new(AHashMap::new()),
            next_id: AtomicU64::new(1),
            sink,
            published: AtomicU64::new(0),
            invoked: AtomicU64::new(0),
            panics: AtomicU64::new(0),
        }
    }

    /// Register a handler for an event name
    ///
    /// Handlers for a given name run in subscription order. Constant-time
    /// amortized.
    pub fn subscribe(
        &self,
        name: EventName,
        handler: impl Fn(&ChannelEvent) + Send + Sync + 'static,
    ) -> SubscriptionHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let entry = Entry {
            id,
            active: Arc::new(AtomicBool::new(true)),
            handler: Arc::new(handler),
        };

        self.subscribers
            .lock()
            .entry(name.clone())
            .or_default()
            .push(entry);

        SubscriptionHandle {
            channel: self.instance,
            name,
            id,
        }
    }

    /// Remove a subscription
    ///
    /// Returns `Ok(true)` if the subscription was removed, `Ok(false)` if it
    /// was already gone (double unsubscribe is a no-op). A handle issued by
    /// a different channel instance is a misuse error. Safe to call from a
    /// handler during dispatch of the same event; the handler will not be
    /// invoked again in that pass.
    pub fn unsubscribe(&self, handle: &SubscriptionHandle) -> ChannelResult<bool> {
        if handle.channel != self.instance {
            return Err(ChannelError::ForeignHandle {
                handle_channel: handle.channel,
                channel: self.instance,
            });
        }

        let mut subscribers = self.subscribers.lock();
        let Some(entries) = subscribers.get_mut(&handle.name) else {
            return Ok(false);
        };

        let Some(pos) = entries.iter().position(|e| e.id == handle.id) else {
            return Ok(false);
        };

        entries[pos].active.store(false, Ordering::Release);
        entries.remove(pos);
        if entries.is_empty() {
            subscribers.remove(&handle.name);
        }
        Ok(true)
    }

    /// Publish an event to every current subscriber of its name
    ///
    /// Synchronous FIFO dispatch; returns the number of handlers invoked.
    /// A panicking handler is reported to the error sink and never prevents
    /// the remaining handlers from running.
    pub fn publish(&self, event: ChannelEvent) -> usize {
        let name = event.name();
        debug_assert!(
            event.trigger_flowlet.is_none() || name.carries_flowlet(),
            "trigger flowlet attached to {name}, which never carries one"
        );
        self.published.fetch_add(1, Ordering::Relaxed);

        // Snapshot under the lock, dispatch outside it, so handlers can
        // re-enter the bus.
        let snapshot: Vec<(SubscriptionId, Arc<AtomicBool>, Arc<Handler>)> = {
            let subscribers = self.subscribers.lock();
            match subscribers.get(&name) {
                Some(entries) => entries
                    .iter()
                    .map(|e| (e.id, Arc::clone(&e.active), Arc::clone(&e.handler)))
                    .collect(),
                None => return 0,
            }
        };

        let mut count = 0;
        for (id, active, handler) in snapshot {
            if !active.load(Ordering::Acquire) {
                continue;
            }
            count += 1;
            self.invoked.fetch_add(1, Ordering::Relaxed);
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| handler(&event))) {
                self.panics.fetch_add(1, Ordering::Relaxed);
                self.sink
                    .handler_panicked(&name, id, &panic_message(panic.as_ref()));
            }
        }
        count
    }

    /// Number of live subscriptions for an event name
    pub fn subscription_count(&self, name: &EventName) -> usize {
        self.subscribers
            .lock()
            .get(name)
            .map_or(0, |entries| entries.len())
    }

    /// Get channel statistics
    pub fn stats(&self) -> ChannelStats {
        ChannelStats {
            events_published: self.published.load(Ordering::Relaxed),
            handlers_invoked: self.invoked.load(Ordering::Relaxed),
            handler_panics: self.panics.load(Ordering::Relaxed),
            active_subscriptions: self.subscribers.lock().values().map(Vec::len).sum(),
        }
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::event::Payload;
    use crate::channel::sink::CollectingSink;
    use parking_lot::Mutex as PlMutex;

    fn heartbeat(sequence: u64) -> ChannelEvent {
        ChannelEvent::new(Payload::Heartbeat {
            sequence,
            interval_ms: 1000,
        })
    }

    #[test]
    fn test_subscribe_publish() {
        let channel = Channel::new();
        let seen = Arc::new(AtomicU64::new(0));

        let seen2 = Arc::clone(&seen);
        channel.subscribe(EventName::Heartbeat, move |_| {
            seen2.fetch_add(1, Ordering::Relaxed);
        });

        assert_eq!(channel.publish(heartbeat(1)), 1);
        assert_eq!(seen.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_dispatch_order_is_subscription_order() {
        let channel = Channel::new();
        let order = Arc::new(PlMutex::new(Vec::new()));

        for tag in 1..=3_u32 {
            let order = Arc::clone(&order);
            channel.subscribe(EventName::Heartbeat, move |_| {
                order.lock().push(tag);
            });
        }

        channel.publish(heartbeat(1));
        assert_eq!(*order.lock(), vec![1, 2, 3]);
    }

    #[test]
    fn test_unsubscribe_twice_is_noop() {
        let channel = Channel::new();
        let handle = channel.subscribe(EventName::UiEvent, |_| {});

        assert_eq!(channel.unsubscribe(&handle), Ok(true));
        assert_eq!(channel.unsubscribe(&handle), Ok(false));
    }

    #[test]
    fn test_foreign_handle_is_error() {
        let a = Channel::new();
        let b = Channel::new();
        let handle = a.subscribe(EventName::UiEvent, |_| {});

        assert!(matches!(
            b.unsubscribe(&handle),
            Err(ChannelError::ForeignHandle { .. })
        ));
        // Still valid on the issuing channel.
        assert_eq!(a.unsubscribe(&handle), Ok(true));
    }

    #[test]
    fn test_panicking_handler_does_not_block_siblings() {
        let sink = Arc::new(CollectingSink::new());
        let channel = Channel::with_sink(Arc::clone(&sink) as Arc<dyn ErrorSink>);
        let seen = Arc::new(AtomicU64::new(0));

        channel.subscribe(EventName::Heartbeat, |_| panic!("observer bug"));
        let seen2 = Arc::clone(&seen);
        channel.subscribe(EventName::Heartbeat, move |_| {
            seen2.fetch_add(1, Ordering::Relaxed);
        });

        assert_eq!(channel.publish(heartbeat(1)), 2);
        assert_eq!(seen.load(Ordering::Relaxed), 1);
        assert_eq!(sink.failures().len(), 1);
        assert_eq!(channel.stats().handler_panics, 1);
    }

    #[test]
    fn test_reentrant_publish() {
        let channel = Arc::new(Channel::new());
        let seen = Arc::new(AtomicU64::new(0));

        let inner = Arc::clone(&channel);
        channel.subscribe(EventName::UiEvent, move |_| {
            inner.publish(heartbeat(1));
        });
        let seen2 = Arc::clone(&seen);
        channel.subscribe(EventName::Heartbeat, move |_| {
            seen2.fetch_add(1, Ordering::Relaxed);
        });

        channel.publish(ChannelEvent::new(Payload::UiEvent {
            event: "click".into(),
            element: "button".into(),
            element_text: None,
        }));
        assert_eq!(seen.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_custom_names_behave_like_known_ones() {
        let channel = Channel::new();
        let seen = Arc::new(AtomicU64::new(0));

        let seen2 = Arc::clone(&seen);
        channel.subscribe(EventName::custom("test"), move |_| {
            seen2.fetch_add(1, Ordering::Relaxed);
        });

        channel.publish(ChannelEvent::new(Payload::Extension {
            name: "test".into(),
            data: serde_json::json!(null),
        }));
        assert_eq!(seen.load(Ordering::Relaxed), 1);
    }
}
