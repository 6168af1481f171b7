/*!
 * Core Types
 * Common types shared across the instrumentation layer
 */

use std::sync::OnceLock;
use std::time::Instant;

/// Monotonic timestamp in nanoseconds since instrumentation start
pub type TimestampNs = u64;

/// Subscription identifier, unique within a channel instance
pub type SubscriptionId = u64;

/// Hook identifier, unique within a function interceptor
pub type HookId = u64;

/// Get current time in nanoseconds (monotonic)
///
/// All event and flowlet timestamps come from this single clock so they
/// order consistently within a run.
#[inline]
pub fn now_ns() -> TimestampNs {
    static START: OnceLock<Instant> = OnceLock::new();
    let start = START.get_or_init(Instant::now);
    start.elapsed().as_nanos() as u64
}
