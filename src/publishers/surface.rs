/*!
 * Surface Publisher
 * Mount/unmount events for named UI surfaces
 */

use crate::channel::{Channel, ChannelEvent, Payload};
use crate::core::data_structures::InlineString;
use crate::core::limits::DEFAULT_SURFACE_ATTRIBUTE;
use crate::intercept::{FuncInterceptor, HookHandle};
use std::sync::Arc;

/// Predicate over a component name deciding whether it names a surface
pub type ComponentNameValidator = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Surface publisher options
pub struct SurfaceConfig {
    /// DOM attribute carrying the surface identifier
    pub surface_attribute: InlineString,
    /// Filters which component names participate in surface naming
    pub component_name_validator: Option<ComponentNameValidator>,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            surface_attribute: DEFAULT_SURFACE_ATTRIBUTE.into(),
            component_name_validator: None,
        }
    }
}

/// Render arguments observed through an intercepted render/portal export
#[derive(Debug, Clone)]
pub struct SurfaceRender {
    pub surface: String,
}

/// Emits surface mount/unmount events
pub struct SurfacePublisher {
    channel: Arc<Channel>,
    config: SurfaceConfig,
}

impl SurfacePublisher {
    pub fn new(channel: Arc<Channel>, config: SurfaceConfig) -> Self {
        Self { channel, config }
    }

    /// DOM attribute consumers should read surface ids from
    pub fn surface_attribute(&self) -> &str {
        self.config.surface_attribute.as_str()
    }

    fn accepts(&self, surface: &str) -> bool {
        self.config
            .component_name_validator
            .as_ref()
            .map_or(true, |validator| validator(surface))
    }

    /// A surface entered the tree
    pub fn on_mount(&self, surface: &str) {
        if !self.accepts(surface) {
            return;
        }
        self.channel.publish(ChannelEvent::new(Payload::SurfaceMount {
            surface: surface.into(),
        }));
    }

    /// A surface left the tree
    pub fn on_unmount(&self, surface: &str) {
        if !self.accepts(surface) {
            return;
        }
        self.channel
            .publish(ChannelEvent::new(Payload::SurfaceUnmount {
                surface: surface.into(),
            }));
    }

    /// Observe mounts through an intercepted render-like export
    pub fn attach_mount_hook<R: 'static>(
        self: &Arc<Self>,
        interceptor: &FuncInterceptor<SurfaceRender, R>,
    ) -> HookHandle {
        let publisher = Arc::clone(self);
        interceptor.on_args(move |render| publisher.on_mount(&render.surface))
    }
}
