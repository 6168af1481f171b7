/*!
 * Error Sinks
 * Configurable reporting for observer failures
 *
 * A subscribed handler that panics must never block sibling handlers or the
 * publisher; the failure is routed here instead.
 */

use super::name::EventName;
use crate::core::types::SubscriptionId;
use parking_lot::Mutex;
use std::any::Any;

/// Where observer failures are reported
pub trait ErrorSink: Send + Sync {
    /// A subscribed handler panicked during dispatch
    fn handler_panicked(&self, event: &EventName, subscription: SubscriptionId, message: &str);
}

/// Default sink: reports through the tracing facade
#[derive(Debug, Default)]
pub struct TracingSink;

impl ErrorSink for TracingSink {
    fn handler_panicked(&self, event: &EventName, subscription: SubscriptionId, message: &str) {
        tracing::error!(
            event = %event,
            subscription,
            message,
            "channel handler panicked"
        );
    }
}

/// Test sink: records failures for assertions
#[derive(Debug, Default)]
pub struct CollectingSink {
    failures: Mutex<Vec<(EventName, SubscriptionId, String)>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Failures recorded so far
    pub fn failures(&self) -> Vec<(EventName, SubscriptionId, String)> {
        self.failures.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.lock().is_empty()
    }
}

impl ErrorSink for CollectingSink {
    fn handler_panicked(&self, event: &EventName, subscription: SubscriptionId, message: &str) {
        self.failures
            .lock()
            .push((event.clone(), subscription, message.to_string()));
    }
}

/// Extract a printable message from a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
