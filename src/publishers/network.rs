/*!
 * Network Publisher
 * Request/response events bridged across the async boundary
 *
 * A request opens a child flowlet under whatever caused it (typically a UI
 * interaction). The returned token captures that flowlet at schedule time;
 * response handling restores it as "top" no matter what ran in between.
 */

use crate::channel::{Channel, ChannelEvent, Payload};
use crate::core::data_structures::InlineString;
use crate::flowlet::{FlowletId, FlowletManager};
use std::sync::Arc;

/// Request details as observed at the detection boundary
#[derive(Debug, Clone)]
pub struct RequestInfo {
    pub url: String,
    pub method: InlineString,
}

/// Predicate deciding whether a request is tracked at all
pub type RequestFilter = Box<dyn Fn(&RequestInfo) -> bool + Send + Sync>;

/// Callback marking outgoing requests with causal context
///
/// Receives the request plus a parameter list to append to; the active
/// flowlet's full name is the usual marker value.
pub type RequestUrlMarker =
    Box<dyn Fn(&RequestInfo, &mut Vec<(String, String)>) + Send + Sync>;

/// Network publisher options
#[derive(Default)]
pub struct NetworkConfig {
    pub request_filter: Option<RequestFilter>,
    pub request_url_marker: Option<RequestUrlMarker>,
}

/// Token tying a response back to its request's causal context
///
/// Holds the flowlet captured when the request was issued; dropping it
/// without a response simply abandons the chain.
#[derive(Debug)]
pub struct PendingRequest {
    flowlet: Option<FlowletId>,
    url: String,
}

impl PendingRequest {
    /// Flowlet the matching response will be attributed to
    pub fn flowlet(&self) -> Option<FlowletId> {
        self.flowlet
    }
}

/// Emits request/response events with causal attribution
pub struct NetworkPublisher {
    channel: Arc<Channel>,
    flowlets: Arc<FlowletManager>,
    config: NetworkConfig,
}

impl NetworkPublisher {
    pub fn new(
        channel: Arc<Channel>,
        flowlets: Arc<FlowletManager>,
        config: NetworkConfig,
    ) -> Self {
        Self {
            channel,
            flowlets,
            config,
        }
    }

    /// A request is being issued
    ///
    /// Returns `None` for filtered-out requests; otherwise emits the request
    /// event and returns the token for response-side attribution.
    pub fn on_request(&self, info: RequestInfo) -> Option<PendingRequest> {
        if let Some(filter) = &self.config.request_filter {
            if !filter(&info) {
                return None;
            }
        }

        // A child of whatever caused the request.
        let flowlet = match self.flowlets.create(info.method.clone()) {
            Ok(flowlet) => Some(flowlet),
            Err(error) => {
                tracing::error!(%error, "failed to create request flowlet");
                None
            }
        };

        let mut marked_params = Vec::new();
        if let Some(marker) = &self.config.request_url_marker {
            marker(&info, &mut marked_params);
        }

        let mut event = ChannelEvent::new(Payload::NetworkRequest {
            url: info.url.clone(),
            method: info.method.clone(),
            marked_params,
        });
        if let Some(flowlet) = flowlet {
            event = event.with_flowlet(flowlet);
        }
        self.channel.publish(event);

        Some(PendingRequest {
            flowlet,
            url: info.url,
        })
    }

    /// The matching response arrived
    ///
    /// Restores the request's flowlet as "top" for the duration of the
    /// emission, so subscribers observe the original causal context.
    pub fn on_response(&self, pending: PendingRequest, status: u16) {
        let scope = pending
            .flowlet
            .and_then(|flowlet| match self.flowlets.scope(flowlet) {
                Ok(scope) => Some(scope),
                Err(error) => {
                    tracing::error!(%error, "failed to restore request flowlet");
                    None
                }
            });

        let mut event = ChannelEvent::new(Payload::NetworkResponse {
            url: pending.url,
            status,
        });
        if let Some(scope) = &scope {
            event = event.with_flowlet(scope.flowlet());
        }
        self.channel.publish(event);
    }
}
