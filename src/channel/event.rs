/*!
 * Channel Events
 * Strongly-typed lifecycle events with per-kind payloads
 */

use super::name::EventName;
use crate::core::data_structures::InlineString;
use crate::core::types::{now_ns, TimestampNs};
use crate::flowlet::FlowletId;
use serde::{Deserialize, Serialize};

/// How a surface mutation changed the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    Added,
    Removed,
}

/// Lifecycle phase of a flowlet, carried on flowlet events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowletPhase {
    Created,
    Pushed,
    Popped,
}

/// Event payload - one strongly typed variant per event kind
///
/// The payload determines the event name; publishers cannot emit a payload
/// under the wrong name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Payload {
    // Surface lifecycle
    SurfaceMount {
        surface: InlineString,
    },
    SurfaceUnmount {
        surface: InlineString,
    },

    // Periodic liveness
    Heartbeat {
        sequence: u64,
        interval_ms: u64,
    },

    // UI interaction phases
    UiEventCapture {
        event: InlineString,
        element: InlineString,
    },
    UiEventBubble {
        event: InlineString,
        element: InlineString,
    },
    UiEvent {
        event: InlineString,
        element: InlineString,
        element_text: Option<String>,
    },

    // Surface tree changes
    SurfaceMutation {
        surface: InlineString,
        kind: MutationKind,
        element_text: Option<String>,
    },
    SurfaceVisibility {
        surface: InlineString,
        visible: bool,
    },

    // Network activity
    NetworkRequest {
        url: String,
        method: InlineString,
        marked_params: Vec<(String, String)>,
    },
    NetworkResponse {
        url: String,
        status: u16,
    },

    // Flowlet lifecycle
    FlowletEvent {
        flowlet: FlowletId,
        full_name: String,
        phase: FlowletPhase,
    },

    // Application-defined events on the known custom kind
    CustomEvent {
        name: InlineString,
        data: serde_json::Value,
    },

    // Events on names outside the known vocabulary
    Extension {
        name: InlineString,
        data: serde_json::Value,
    },
}

impl Payload {
    /// Event name this payload is published under
    pub fn event_name(&self) -> EventName {
        match self {
            Self::SurfaceMount { .. } => EventName::SurfaceMount,
            Self::SurfaceUnmount { .. } => EventName::SurfaceUnmount,
            Self::Heartbeat { .. } => EventName::Heartbeat,
            Self::UiEventCapture { .. } => EventName::UiEventCapture,
            Self::UiEventBubble { .. } => EventName::UiEventBubble,
            Self::UiEvent { .. } => EventName::UiEvent,
            Self::SurfaceMutation { .. } => EventName::SurfaceMutation,
            Self::SurfaceVisibility { .. } => EventName::SurfaceVisibility,
            Self::NetworkRequest { .. } => EventName::NetworkRequest,
            Self::NetworkResponse { .. } => EventName::NetworkResponse,
            Self::FlowletEvent { .. } => EventName::FlowletEvent,
            Self::CustomEvent { .. } => EventName::CustomEvent,
            Self::Extension { name, .. } => EventName::Custom(name.clone()),
        }
    }
}

/// A published event: payload plus emission-time context
///
/// The trigger flowlet is captured at emission time and never recomputed
/// later; subscribers see exactly the causal context the publisher saw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelEvent {
    /// Monotonic timestamp (nanoseconds since instrumentation start)
    pub timestamp_ns: TimestampNs,
    /// Flowlet active when the event was emitted, if causally relevant
    pub trigger_flowlet: Option<FlowletId>,
    /// Event payload
    pub payload: Payload,
}

impl ChannelEvent {
    /// Create a new event with current timestamp
    #[inline]
    pub fn new(payload: Payload) -> Self {
        Self {
            timestamp_ns: now_ns(),
            trigger_flowlet: None,
            payload,
        }
    }

    /// Attach the trigger flowlet captured at emission time
    #[inline]
    pub fn with_flowlet(mut self, flowlet: FlowletId) -> Self {
        self.trigger_flowlet = Some(flowlet);
        self
    }

    /// Event name this event is published under
    #[inline]
    pub fn name(&self) -> EventName {
        self.payload.event_name()
    }
}
