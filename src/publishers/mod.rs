/*!
 * Instrumentation Publishers
 * Small state machines turning platform signals into channel events
 *
 * Each publisher reads the flowlet manager's current context, attaches it
 * where causally relevant, and emits one well-formed event kind onto the
 * channel.
 */

mod heartbeat;
mod mutation;
mod network;
mod surface;
mod ui_event;

pub use heartbeat::{HeartbeatConfig, HeartbeatPublisher};
pub use mutation::{MutationConfig, MutationPublisher};
pub use network::{
    NetworkConfig, NetworkPublisher, PendingRequest, RequestFilter, RequestInfo, RequestUrlMarker,
};
pub use surface::{ComponentNameValidator, SurfaceConfig, SurfacePublisher, SurfaceRender};
pub use ui_event::{UiEventConfig, UiEventFilter, UiEventInput, UiEventPublisher};
