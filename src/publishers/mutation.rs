/*!
 * Surface Mutation Publisher
 * Tree-change and visibility events with causal attribution
 */

use crate::channel::{Channel, ChannelEvent, MutationKind, Payload};
use crate::flowlet::FlowletManager;
use std::sync::Arc;

/// Mutation publisher options
#[derive(Debug, Clone, Default)]
pub struct MutationConfig {
    /// Capture element info eagerly at mutation time
    pub cache_element_info: bool,
}

/// Emits surface-mutation and visibility events
///
/// Mutations carry the active flowlet, so a re-render caused by a click is
/// attributed to that click.
pub struct MutationPublisher {
    channel: Arc<Channel>,
    flowlets: Arc<FlowletManager>,
    config: MutationConfig,
}

impl MutationPublisher {
    pub fn new(
        channel: Arc<Channel>,
        flowlets: Arc<FlowletManager>,
        config: MutationConfig,
    ) -> Self {
        Self {
            channel,
            flowlets,
            config,
        }
    }

    /// Active options for this publisher
    pub fn config(&self) -> &MutationConfig {
        &self.config
    }

    /// A surface subtree was added or removed
    pub fn on_mutation(&self, surface: &str, kind: MutationKind, element_text: Option<&str>) {
        let element_text = if self.config.cache_element_info {
            element_text.map(str::to_string)
        } else {
            None
        };
        let mut event = ChannelEvent::new(Payload::SurfaceMutation {
            surface: surface.into(),
            kind,
            element_text,
        });
        if let Some(flowlet) = self.flowlets.top() {
            event = event.with_flowlet(flowlet);
        }
        self.channel.publish(event);
    }

    /// A surface became visible or hidden
    pub fn on_visibility(&self, surface: &str, visible: bool) {
        let mut event = ChannelEvent::new(Payload::SurfaceVisibility {
            surface: surface.into(),
            visible,
        });
        if let Some(flowlet) = self.flowlets.top() {
            event = event.with_flowlet(flowlet);
        }
        self.channel.publish(event);
    }
}
