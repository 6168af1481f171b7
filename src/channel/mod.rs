/*!
 * Event Channel
 * Typed publish/subscribe bus multiplexing instrumentation events
 *
 * Deterministic FIFO dispatch per name, explicit subscription lifetimes,
 * and per-handler failure isolation.
 */

mod bus;
mod event;
mod name;
mod sink;

pub use bus::{Channel, ChannelStats, Handler, SubscriptionHandle};
pub use event::{ChannelEvent, FlowletPhase, MutationKind, Payload};
pub use name::EventName;
pub use sink::{CollectingSink, ErrorSink, TracingSink};
