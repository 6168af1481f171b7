/*!
 * Instrumentation Runtime
 * Explicit assembly of channel, flowlets, interception, and publishers
 *
 * One `Instrumentation` per application or test run replaces process-wide
 * singletons: everything reachable from it is isolated, so parallel test
 * runs never share state.
 */

use crate::channel::{Channel, ErrorSink};
use crate::flowlet::{FlowletArena, FlowletManager};
use crate::intercept::InterceptRegistry;
use crate::publishers::{
    HeartbeatConfig, HeartbeatPublisher, MutationConfig, MutationPublisher, NetworkConfig,
    NetworkPublisher, SurfaceConfig, SurfacePublisher, UiEventConfig, UiEventPublisher,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

/// Per-run instrumentation options
#[derive(Default)]
pub struct InstrumentOptions {
    pub surface: SurfaceConfig,
    pub ui_events: Vec<UiEventConfig>,
    pub network: NetworkConfig,
    pub heartbeat: HeartbeatConfig,
    pub mutation: MutationConfig,
    /// Observer-failure sink; defaults to tracing
    pub error_sink: Option<Arc<dyn ErrorSink>>,
}

/// Assembled instrumentation context
pub struct Instrumentation {
    session_id: Uuid,
    channel: Arc<Channel>,
    flowlets: Arc<FlowletManager>,
    registry: InterceptRegistry,
    surface: Arc<SurfacePublisher>,
    ui_events: Arc<UiEventPublisher>,
    network: Arc<NetworkPublisher>,
    heartbeat: Arc<HeartbeatPublisher>,
    mutations: Arc<MutationPublisher>,
}

impl Instrumentation {
    /// Build the full instrumentation stack from options
    pub fn init(options: InstrumentOptions) -> Self {
        let channel = Arc::new(match options.error_sink {
            Some(sink) => Channel::with_sink(sink),
            None => Channel::new(),
        });

        let arena = Arc::new(FlowletArena::new());
        let flowlets = Arc::new(FlowletManager::with_arena(arena));
        flowlets.attach_channel(Arc::clone(&channel));

        let session_id = Uuid::new_v4();
        tracing::info!(%session_id, "instrumentation initialized");

        Self {
            session_id,
            surface: Arc::new(SurfacePublisher::new(Arc::clone(&channel), options.surface)),
            ui_events: Arc::new(UiEventPublisher::new(
                Arc::clone(&channel),
                Arc::clone(&flowlets),
                options.ui_events,
            )),
            network: Arc::new(NetworkPublisher::new(
                Arc::clone(&channel),
                Arc::clone(&flowlets),
                options.network,
            )),
            heartbeat: Arc::new(HeartbeatPublisher::new(
                Arc::clone(&channel),
                options.heartbeat,
            )),
            mutations: Arc::new(MutationPublisher::new(
                Arc::clone(&channel),
                Arc::clone(&flowlets),
                options.mutation,
            )),
            registry: InterceptRegistry::new(),
            channel,
            flowlets,
        }
    }

    /// Client session id for this run
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn channel(&self) -> &Arc<Channel> {
        &self.channel
    }

    pub fn flowlets(&self) -> &Arc<FlowletManager> {
        &self.flowlets
    }

    pub fn registry(&self) -> &InterceptRegistry {
        &self.registry
    }

    pub fn surface(&self) -> &Arc<SurfacePublisher> {
        &self.surface
    }

    pub fn ui_events(&self) -> &Arc<UiEventPublisher> {
        &self.ui_events
    }

    pub fn network(&self) -> &Arc<NetworkPublisher> {
        &self.network
    }

    pub fn heartbeat(&self) -> &Arc<HeartbeatPublisher> {
        &self.heartbeat
    }

    pub fn mutations(&self) -> &Arc<MutationPublisher> {
        &self.mutations
    }
}

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - FLOWTRACE_TRACE_JSON: Enable JSON output (default: false)
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("FLOWTRACE_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }
}
