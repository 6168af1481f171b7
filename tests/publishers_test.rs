/*!
 * Publisher Tests
 */

use flowtrace::channel::{Channel, EventName, MutationKind, Payload};
use flowtrace::publishers::{
    HeartbeatConfig, HeartbeatPublisher, MutationConfig, MutationPublisher, NetworkConfig,
    NetworkPublisher, RequestInfo, SurfaceConfig, SurfacePublisher, UiEventConfig, UiEventInput,
    UiEventPublisher,
};
use flowtrace::FlowletManager;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

fn recorder(channel: &Channel, names: &[EventName]) -> Arc<Mutex<Vec<String>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    for name in names {
        let seen = Arc::clone(&seen);
        channel.subscribe(name.clone(), move |event| {
            seen.lock().push(event.name().as_str().to_string());
        });
    }
    seen
}

fn trusted_click() -> UiEventInput {
    UiEventInput {
        event: "click".into(),
        element: "button#checkout".into(),
        is_trusted: true,
        interactable: true,
        element_text: Some("Checkout".to_string()),
    }
}

#[test]
fn test_capture_bubble_wire_order() {
    let channel = Arc::new(Channel::new());
    let flowlets = Arc::new(FlowletManager::new());
    let publisher = UiEventPublisher::new(
        Arc::clone(&channel),
        Arc::clone(&flowlets),
        vec![UiEventConfig::new("click")
            .with_filter(|input| input.is_trusted)
            .cache_element_info(true)],
    );

    let seen = recorder(
        &channel,
        &[
            EventName::UiEventCapture,
            EventName::UiEventBubble,
            EventName::UiEvent,
        ],
    );

    let input = trusted_click();
    publisher.on_capture(&input);
    publisher.on_bubble(&input);

    assert_eq!(
        *seen.lock(),
        vec![
            "al_ui_event_capture".to_string(),
            "al_ui_event_bubble".to_string(),
            "al_ui_event".to_string(),
        ]
    );
    assert_eq!(flowlets.top(), None);
}

#[test]
fn test_ui_event_carries_cached_element_text() {
    let channel = Arc::new(Channel::new());
    let flowlets = Arc::new(FlowletManager::new());
    let publisher = UiEventPublisher::new(
        Arc::clone(&channel),
        flowlets,
        vec![UiEventConfig::new("click").cache_element_info(true)],
    );

    let texts = Arc::new(Mutex::new(Vec::new()));
    let texts2 = Arc::clone(&texts);
    channel.subscribe(EventName::UiEvent, move |event| {
        if let Payload::UiEvent { element_text, .. } = &event.payload {
            texts2.lock().push(element_text.clone());
        }
    });

    let input = trusted_click();
    publisher.on_capture(&input);
    publisher.on_bubble(&input);

    assert_eq!(*texts.lock(), vec![Some("Checkout".to_string())]);
}

#[test]
fn test_enter_key_config_filters_other_keys() {
    let channel = Arc::new(Channel::new());
    let flowlets = Arc::new(FlowletManager::new());
    // The keydown config only reports the Enter key, modeled here as a
    // filter over the element description the platform adapter fills in.
    let publisher = UiEventPublisher::new(
        Arc::clone(&channel),
        flowlets,
        vec![UiEventConfig::new("keydown").with_filter(|input| input.element_text.as_deref() == Some("Enter"))],
    );

    let captures = Arc::new(std::sync::atomic::AtomicU64::new(0));
    let captures2 = Arc::clone(&captures);
    channel.subscribe(EventName::UiEventCapture, move |_| {
        captures2.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    });

    let mut enter = trusted_click();
    enter.event = "keydown".into();
    enter.element_text = Some("Enter".to_string());
    let mut escape = enter.clone();
    escape.element_text = Some("Escape".to_string());

    assert!(publisher.on_capture(&escape).is_none());
    let opened = publisher.on_capture(&enter);
    assert!(opened.is_some());
    publisher.on_bubble(&enter);
    assert_eq!(captures.load(std::sync::atomic::Ordering::Relaxed), 1);
}

#[test]
fn test_nested_interactions_unwind_lifo() {
    // A handler can synchronously raise another interaction while the outer
    // one is still between capture and bubble; the inner pair must close
    // its own scope and leave the outer interaction intact.
    let channel = Arc::new(Channel::new());
    let flowlets = Arc::new(FlowletManager::new());
    let publisher = UiEventPublisher::new(
        Arc::clone(&channel),
        Arc::clone(&flowlets),
        vec![UiEventConfig::new("click"), UiEventConfig::new("keydown")],
    );

    let click = trusted_click();
    let mut keydown = trusted_click();
    keydown.event = "keydown".into();

    let outer = publisher.on_capture(&click).unwrap();
    let inner = publisher.on_capture(&keydown).unwrap();
    // The inner interaction chains under the outer one.
    assert_eq!(flowlets.full_name(inner).unwrap(), "click.keydown");

    let attributed = Arc::new(Mutex::new(Vec::new()));
    let attributed2 = Arc::clone(&attributed);
    channel.subscribe(EventName::UiEvent, move |event| {
        attributed2.lock().push(event.trigger_flowlet);
    });

    publisher.on_bubble(&keydown);
    assert_eq!(flowlets.top(), Some(outer));
    publisher.on_bubble(&click);
    assert_eq!(flowlets.top(), None);

    assert_eq!(*attributed.lock(), vec![Some(inner), Some(outer)]);
}

#[test]
fn test_network_chains_under_interaction() {
    let channel = Arc::new(Channel::new());
    let flowlets = Arc::new(FlowletManager::new());
    let publisher = NetworkPublisher::new(
        Arc::clone(&channel),
        Arc::clone(&flowlets),
        NetworkConfig::default(),
    );

    let click = flowlets.create("click").unwrap();
    let _scope = flowlets.scope(click).unwrap();

    let pending = publisher
        .on_request(RequestInfo {
            url: "https://api.example.com/cart".to_string(),
            method: "GET".into(),
        })
        .unwrap();

    let flowlet = pending.flowlet().unwrap();
    assert_eq!(flowlets.full_name(flowlet).unwrap(), "click.GET");

    let attributed = Arc::new(Mutex::new(Vec::new()));
    let attributed2 = Arc::clone(&attributed);
    channel.subscribe(EventName::NetworkResponse, move |event| {
        attributed2.lock().push(event.trigger_flowlet);
    });

    publisher.on_response(pending, 200);
    assert_eq!(*attributed.lock(), vec![Some(flowlet)]);
}

#[test]
fn test_url_marker_appends_causal_params() {
    let channel = Arc::new(Channel::new());
    let flowlets = Arc::new(FlowletManager::new());

    let marker_flowlets = Arc::clone(&flowlets);
    let config = NetworkConfig {
        request_filter: None,
        request_url_marker: Some(Box::new(move |_, params| {
            if let Some(top) = marker_flowlets.top() {
                if let Ok(full) = marker_flowlets.full_name(top) {
                    params.push(("al_flowlet".to_string(), full));
                }
            }
        })),
    };
    let publisher = NetworkPublisher::new(Arc::clone(&channel), Arc::clone(&flowlets), config);

    let marked = Arc::new(Mutex::new(Vec::new()));
    let marked2 = Arc::clone(&marked);
    channel.subscribe(EventName::NetworkRequest, move |event| {
        if let Payload::NetworkRequest { marked_params, .. } = &event.payload {
            marked2.lock().extend(marked_params.clone());
        }
    });

    let click = flowlets.create("click").unwrap();
    let _scope = flowlets.scope(click).unwrap();
    publisher.on_request(RequestInfo {
        url: "https://api.example.com/cart".to_string(),
        method: "POST".into(),
    });

    assert_eq!(
        *marked.lock(),
        vec![("al_flowlet".to_string(), "click".to_string())]
    );
}

#[test]
fn test_surface_validator_and_attribute() {
    let channel = Arc::new(Channel::new());
    let config = SurfaceConfig {
        component_name_validator: Some(Box::new(|name| name != "AnonymousSurface")),
        ..Default::default()
    };
    let publisher = SurfacePublisher::new(Arc::clone(&channel), config);
    assert_eq!(publisher.surface_attribute(), "data-surfaceid");

    let seen = recorder(
        &channel,
        &[EventName::SurfaceMount, EventName::SurfaceUnmount],
    );

    publisher.on_mount("AnonymousSurface");
    publisher.on_mount("Checkout");
    publisher.on_unmount("Checkout");

    assert_eq!(
        *seen.lock(),
        vec![
            "al_surface_mount".to_string(),
            "al_surface_unmount".to_string(),
        ]
    );
}

#[test]
fn test_mutation_and_visibility_attribution() {
    let channel = Arc::new(Channel::new());
    let flowlets = Arc::new(FlowletManager::new());
    let publisher = MutationPublisher::new(
        Arc::clone(&channel),
        Arc::clone(&flowlets),
        MutationConfig::default(),
    );

    let seen = Arc::new(Mutex::new(Vec::new()));
    for name in [EventName::SurfaceMutation, EventName::SurfaceVisibility] {
        let seen = Arc::clone(&seen);
        channel.subscribe(name, move |event| {
            seen.lock().push((event.name(), event.trigger_flowlet));
        });
    }

    let click = flowlets.create("click").unwrap();
    {
        let _scope = flowlets.scope(click).unwrap();
        publisher.on_mutation("Cart", MutationKind::Added, None);
        publisher.on_visibility("Cart", true);
    }
    publisher.on_mutation("Cart", MutationKind::Removed, None);

    assert_eq!(
        *seen.lock(),
        vec![
            (EventName::SurfaceMutation, Some(click)),
            (EventName::SurfaceVisibility, Some(click)),
            (EventName::SurfaceMutation, None),
        ]
    );
}

#[test]
fn test_heartbeat_interval_on_the_wire() {
    let channel = Arc::new(Channel::new());
    let publisher = HeartbeatPublisher::new(
        Arc::clone(&channel),
        HeartbeatConfig {
            interval: Duration::from_secs(30),
        },
    );

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen2 = Arc::clone(&seen);
    channel.subscribe(EventName::Heartbeat, move |event| {
        if let Payload::Heartbeat {
            sequence,
            interval_ms,
        } = &event.payload
        {
            seen2.lock().push((*sequence, *interval_ms));
        }
    });

    publisher.tick();
    publisher.tick();
    assert_eq!(*seen.lock(), vec![(1, 30_000), (2, 30_000)]);
}
