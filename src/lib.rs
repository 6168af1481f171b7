/*!
 * Flowtrace
 * Causal-flow instrumentation for UI applications
 *
 * Recovers causal chains between user interactions, renders, and network
 * activity, and broadcasts structured lifecycle events to observers:
 *
 * - **intercept**: observable wrappers around selected module exports
 * - **flowlet**: "who caused this" context across sync and async boundaries
 * - **channel**: typed publish/subscribe with deterministic ordering
 * - **publishers**: state machines turning platform signals into events
 */

pub mod channel;
pub mod core;
pub mod flowlet;
pub mod intercept;
pub mod publishers;
pub mod runtime;

// Re-exports
pub use channel::{Channel, ChannelEvent, EventName, Payload, SubscriptionHandle};
pub use crate::core::errors::{ChannelError, FlowletError, InterceptError};
pub use flowlet::{FlowletArena, FlowletId, FlowletManager, FlowletScope};
pub use intercept::{FuncInterceptor, InterceptRegistry, InterceptedModule, ModuleExports};
pub use runtime::{init_tracing, InstrumentOptions, Instrumentation};
