//! AWS Lambda function proxying requests to an API-key-protected endpoint.
//!
//! The public API Gateway in front of this function is callable from the
//! browser. The function forwards the request body verbatim to a private
//! upstream, attaching a secret `X-Api-Key` the client never sees, and relays
//! the upstream's status and body back with CORS headers.

mod config;
mod upstream;

use std::sync::Arc;

use http::StatusCode;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::{error, info};

use portfolio_lambda_shared::{
    error_chain, init_tracing, CorsPolicy, GatewayRequest, GatewayResponse, MessageBody,
};

pub use config::{
    ProxyConfig, ProxyTarget, ALLOWED_METHODS, ALLOW_ORIGIN_ENV, API_KEY_ENV, DEFAULT_TARGET_PATH,
    ENDPOINT_PATH_ENV, ENDPOINT_URL_ENV,
};
pub use upstream::{
    HttpUpstream, UpstreamError, UpstreamRequest, UpstreamResponse, UpstreamTransport,
    API_KEY_HEADER,
};

/// State shared by every invocation in this execution environment.
pub struct ProxyState {
    pub config: ProxyConfig,
    pub transport: Arc<dyn UpstreamTransport>,
}

impl ProxyState {
    pub fn new(config: ProxyConfig, transport: impl UpstreamTransport + 'static) -> Self {
        Self {
            config,
            transport: Arc::new(transport),
        }
    }
}

/// Entry point used by the Lambda runtime.
pub async fn run() -> Result<(), Error> {
    init_tracing();

    let config = match ProxyConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "proxy configuration invalid");
            return Err(e.into());
        }
    };

    info!(
        upstream_host = %config.target.host(),
        upstream_path = %config.target.path(),
        allow_origin = %config.cors.allow_origin(),
        "proxy configuration loaded"
    );

    let state = Arc::new(ProxyState::new(config, HttpUpstream::new()?));

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let state = Arc::clone(&state);
        async move { handler(event, &state).await }
    }))
    .await
}

/// Lambda handler invoked per request.
///
/// Always resolves to `Ok`: failures are reported to the client as a 500
/// response carrying CORS headers.
pub async fn handler(
    event: LambdaEvent<Value>,
    state: &ProxyState,
) -> Result<GatewayResponse, Error> {
    let request_id = event.context.request_id.clone();
    let request = GatewayRequest::from_payload(&event.payload);

    Ok(handle_proxy_request(&request, state, &request_id).await)
}

/// Core handler logic separated for reuse in tests.
pub async fn handle_proxy_request(
    request: &GatewayRequest,
    state: &ProxyState,
    request_id: &str,
) -> GatewayResponse {
    let cors = &state.config.cors;

    if request.is_preflight() {
        info!(request_id = %request_id, "answering CORS preflight");
        return GatewayResponse::preflight(cors);
    }

    info!(
        request_id = %request_id,
        method = %request.method,
        body_bytes = request.body_len(),
        "forwarding request upstream"
    );

    let outbound = UpstreamRequest::for_target(&state.config.target, request.body.as_deref());

    match state.transport.send(outbound).await {
        Ok(upstream) => {
            info!(
                request_id = %request_id,
                status = upstream.status,
                body_bytes = upstream.body.len(),
                "upstream responded"
            );
            GatewayResponse::with_status_code(upstream.status, cors, upstream.body)
        }
        Err(e) => {
            let detail = error_chain(&e);
            error!(request_id = %request_id, error = %detail, "proxy failed to reach upstream");
            connect_failure(cors, &detail)
        }
    }
}

fn connect_failure(cors: &CorsPolicy, detail: &str) -> GatewayResponse {
    GatewayResponse::message(
        StatusCode::INTERNAL_SERVER_ERROR,
        cors,
        &MessageBody::new(format!("Proxy failed to connect: {}", detail)),
    )
}
