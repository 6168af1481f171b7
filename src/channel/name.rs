/*!
 * Event Names
 * The channel's event vocabulary: a fixed known set plus an open escape hatch
 */

use crate::core::data_structures::InlineString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of an event kind flowing over the channel
///
/// The known variants carry the autologging wire names (`al_*`). Names
/// outside the known set are carried by [`EventName::Custom`] and behave
/// identically on the bus.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventName {
    SurfaceMount,
    SurfaceUnmount,
    Heartbeat,
    UiEventCapture,
    UiEventBubble,
    UiEvent,
    SurfaceMutation,
    SurfaceVisibility,
    NetworkRequest,
    NetworkResponse,
    FlowletEvent,
    CustomEvent,
    /// An event name outside the known vocabulary
    Custom(InlineString),
}

impl EventName {
    /// Wire name of this event kind
    pub fn as_str(&self) -> &str {
        match self {
            Self::SurfaceMount => "al_surface_mount",
            Self::SurfaceUnmount => "al_surface_unmount",
            Self::Heartbeat => "al_heartbeat_event",
            Self::UiEventCapture => "al_ui_event_capture",
            Self::UiEventBubble => "al_ui_event_bubble",
            Self::UiEvent => "al_ui_event",
            Self::SurfaceMutation => "al_surface_mutation_event",
            Self::SurfaceVisibility => "al_surface_visibility_event",
            Self::NetworkRequest => "al_network_request",
            Self::NetworkResponse => "al_network_response",
            Self::FlowletEvent => "al_flowlet_event",
            Self::CustomEvent => "al_custom_event",
            Self::Custom(name) => name.as_str(),
        }
    }

    /// Build a name outside the known vocabulary
    ///
    /// Known wire names normalize to their variant so equality stays
    /// consistent no matter how the name was constructed.
    pub fn custom(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| Self::Custom(name.into()))
    }

    /// Whether events of this kind carry a trigger flowlet
    pub fn carries_flowlet(&self) -> bool {
        matches!(
            self,
            Self::UiEvent
                | Self::SurfaceMutation
                | Self::SurfaceVisibility
                | Self::NetworkRequest
                | Self::NetworkResponse
                | Self::FlowletEvent
                | Self::CustomEvent
        )
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse never fails; unknown names become [`EventName::Custom`]
impl FromStr for EventName {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "al_surface_mount" => Self::SurfaceMount,
            "al_surface_unmount" => Self::SurfaceUnmount,
            "al_heartbeat_event" => Self::Heartbeat,
            "al_ui_event_capture" => Self::UiEventCapture,
            "al_ui_event_bubble" => Self::UiEventBubble,
            "al_ui_event" => Self::UiEvent,
            "al_surface_mutation_event" => Self::SurfaceMutation,
            "al_surface_visibility_event" => Self::SurfaceVisibility,
            "al_network_request" => Self::NetworkRequest,
            "al_network_response" => Self::NetworkResponse,
            "al_flowlet_event" => Self::FlowletEvent,
            "al_custom_event" => Self::CustomEvent,
            other => Self::Custom(other.into()),
        })
    }
}
