/*!
 * UI Event Publisher
 * Capture/bubble interaction events with causal scope management
 *
 * Capture phase opens a causal scope (so everything the interaction causes
 * chains under it); bubble phase closes the scope and, for events that
 * survive the configured filter, emits the enriched interaction event.
 */

use crate::channel::{Channel, ChannelEvent, Payload};
use crate::core::data_structures::InlineString;
use crate::flowlet::{FlowletId, FlowletManager};
use parking_lot::Mutex;
use std::sync::Arc;

/// Raw interaction input as observed at the platform boundary
#[derive(Debug, Clone)]
pub struct UiEventInput {
    /// Platform event kind ("click", "keydown", ...)
    pub event: InlineString,
    /// Element description the event targeted
    pub element: InlineString,
    /// Whether the platform marked the event as user-initiated
    pub is_trusted: bool,
    /// Whether the target is an interactable element
    pub interactable: bool,
    /// Extracted element text, when available
    pub element_text: Option<String>,
}

/// Predicate deciding whether an observed input is published at all
pub type UiEventFilter = Box<dyn Fn(&UiEventInput) -> bool + Send + Sync>;

/// Per-event-kind publisher options
pub struct UiEventConfig {
    /// Platform event kind this config applies to
    pub event_name: InlineString,
    /// Drops inputs that fail the predicate (e.g. only trusted clicks)
    pub event_filter: Option<UiEventFilter>,
    /// Emit the interaction event only for interactable targets
    pub interactable_only: bool,
    /// Capture element info eagerly at event time
    pub cache_element_info: bool,
}

impl UiEventConfig {
    pub fn new(event_name: &str) -> Self {
        Self {
            event_name: event_name.into(),
            event_filter: None,
            interactable_only: true,
            cache_element_info: false,
        }
    }

    pub fn with_filter(mut self, filter: impl Fn(&UiEventInput) -> bool + Send + Sync + 'static) -> Self {
        self.event_filter = Some(Box::new(filter));
        self
    }

    pub fn interactable_only(mut self, value: bool) -> Self {
        self.interactable_only = value;
        self
    }

    pub fn cache_element_info(mut self, value: bool) -> Self {
        self.cache_element_info = value;
        self
    }
}

/// Emits capture/bubble/interaction events for configured event kinds
pub struct UiEventPublisher {
    channel: Arc<Channel>,
    flowlets: Arc<FlowletManager>,
    configs: Vec<UiEventConfig>,
    /// Interactions currently between capture and bubble, innermost last
    ///
    /// Dispatch can nest when a handler synchronously raises another
    /// interaction; each bubble must close the matching capture.
    active: Mutex<Vec<FlowletId>>,
}

impl UiEventPublisher {
    pub fn new(
        channel: Arc<Channel>,
        flowlets: Arc<FlowletManager>,
        configs: Vec<UiEventConfig>,
    ) -> Self {
        Self {
            channel,
            flowlets,
            configs,
            active: Mutex::new(Vec::new()),
        }
    }

    fn config_for(&self, event: &str) -> Option<&UiEventConfig> {
        self.configs
            .iter()
            .find(|config| config.event_name == event)
    }

    fn passes_filter(config: &UiEventConfig, input: &UiEventInput) -> bool {
        config
            .event_filter
            .as_ref()
            .map_or(true, |filter| filter(input))
    }

    /// Capture phase: open a causal scope for the interaction
    ///
    /// Returns the flowlet now anchoring the interaction, or `None` if the
    /// event kind is unconfigured or filtered out.
    pub fn on_capture(&self, input: &UiEventInput) -> Option<FlowletId> {
        let config = self.config_for(&input.event)?;
        if !Self::passes_filter(config, input) {
            return None;
        }

        let flowlet = match self.flowlets.create(input.event.clone()) {
            Ok(flowlet) => flowlet,
            Err(error) => {
                tracing::error!(%error, "failed to open interaction scope");
                return None;
            }
        };
        if let Err(error) = self.flowlets.push(flowlet) {
            tracing::error!(%error, "failed to enter interaction scope");
            return None;
        }
        self.active.lock().push(flowlet);

        self.channel
            .publish(ChannelEvent::new(Payload::UiEventCapture {
                event: input.event.clone(),
                element: input.element.clone(),
            }));
        Some(flowlet)
    }

    /// Bubble phase: emit the interaction event and close the scope
    pub fn on_bubble(&self, input: &UiEventInput) {
        let Some(config) = self.config_for(&input.event) else {
            return;
        };
        if !Self::passes_filter(config, input) {
            return;
        }

        self.channel
            .publish(ChannelEvent::new(Payload::UiEventBubble {
                event: input.event.clone(),
                element: input.element.clone(),
            }));

        let flowlet = self.active.lock().pop();
        if let Some(flowlet) = flowlet {
            if !config.interactable_only || input.interactable {
                let element_text = if config.cache_element_info {
                    input.element_text.clone()
                } else {
                    None
                };
                self.channel.publish(
                    ChannelEvent::new(Payload::UiEvent {
                        event: input.event.clone(),
                        element: input.element.clone(),
                        element_text,
                    })
                    .with_flowlet(flowlet),
                );
            }
            if let Err(error) = self.flowlets.pop() {
                tracing::error!(%error, "interaction scope already closed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::EventName;
    use parking_lot::Mutex as PlMutex;

    fn click(trusted: bool) -> UiEventInput {
        UiEventInput {
            event: "click".into(),
            element: "button#buy".into(),
            is_trusted: trusted,
            interactable: true,
            element_text: Some("Buy".to_string()),
        }
    }

    fn publisher_with(
        configs: Vec<UiEventConfig>,
    ) -> (Arc<Channel>, Arc<FlowletManager>, UiEventPublisher) {
        let channel = Arc::new(Channel::new());
        let flowlets = Arc::new(FlowletManager::new());
        let publisher =
            UiEventPublisher::new(Arc::clone(&channel), Arc::clone(&flowlets), configs);
        (channel, flowlets, publisher)
    }

    #[test]
    fn test_capture_then_bubble_emits_ui_event() {
        let (channel, flowlets, publisher) =
            publisher_with(vec![UiEventConfig::new("click").cache_element_info(true)]);

        let seen = Arc::new(PlMutex::new(Vec::new()));
        for name in [
            EventName::UiEventCapture,
            EventName::UiEventBubble,
            EventName::UiEvent,
        ] {
            let seen = Arc::clone(&seen);
            channel.subscribe(name.clone(), move |event| {
                seen.lock().push(event.name());
            });
        }

        let input = click(true);
        let flowlet = publisher.on_capture(&input).unwrap();
        assert_eq!(flowlets.top(), Some(flowlet));
        publisher.on_bubble(&input);

        assert_eq!(
            *seen.lock(),
            vec![
                EventName::UiEventCapture,
                EventName::UiEventBubble,
                EventName::UiEvent
            ]
        );
        assert_eq!(flowlets.top(), None);
    }

    #[test]
    fn test_filter_drops_untrusted() {
        let (channel, _flowlets, publisher) = publisher_with(vec![
            UiEventConfig::new("click").with_filter(|input| input.is_trusted),
        ]);

        let captures = Arc::new(std::sync::atomic::AtomicU64::new(0));
        let captures2 = Arc::clone(&captures);
        channel.subscribe(EventName::UiEventCapture, move |_| {
            captures2.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        });

        assert!(publisher.on_capture(&click(false)).is_none());
        assert!(publisher.on_capture(&click(true)).is_some());
        assert_eq!(captures.load(std::sync::atomic::Ordering::Relaxed), 1);
    }

    #[test]
    fn test_unconfigured_event_ignored() {
        let (_channel, flowlets, publisher) = publisher_with(vec![UiEventConfig::new("click")]);

        let input = UiEventInput {
            event: "scroll".into(),
            element: "div".into(),
            is_trusted: true,
            interactable: false,
            element_text: None,
        };
        assert!(publisher.on_capture(&input).is_none());
        assert_eq!(flowlets.top(), None);
    }

    #[test]
    fn test_interactable_only_skips_ui_event_but_balances_scope() {
        let (channel, flowlets, publisher) = publisher_with(vec![UiEventConfig::new("click")]);

        let ui_events = Arc::new(std::sync::atomic::AtomicU64::new(0));
        let ui_events2 = Arc::clone(&ui_events);
        channel.subscribe(EventName::UiEvent, move |_| {
            ui_events2.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        });

        let mut input = click(true);
        input.interactable = false;
        publisher.on_capture(&input);
        publisher.on_bubble(&input);

        assert_eq!(ui_events.load(std::sync::atomic::Ordering::Relaxed), 0);
        assert_eq!(flowlets.top(), None);
    }
}
