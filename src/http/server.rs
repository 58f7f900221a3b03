//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the gateway handler
//! - Wire up middleware (request ID, tracing, metrics)
//! - Bind server to listener
//! - Resolve requests and fetch them upstream under a deadline
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::any,
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use url::Url;

use crate::config::GatewayConfig;
use crate::gemini::{GeminiClient, TransportError, Upstream};
use crate::http::dispatch::{dispatch, DispatchContext, Outcome};
use crate::http::error::GatewayError;
use crate::http::form::submit_input;
use crate::observability::metrics;
use crate::render::Stylesheet;
use crate::resilience::with_deadline;
use crate::routing::{resolve, Namespace, NamespaceError, ProxyTarget, Route};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub namespace: Arc<Namespace>,
    pub stylesheet: Arc<Stylesheet>,
    pub upstream: Arc<dyn Upstream>,
    pub request_timeout: Duration,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("no root resource configured")]
    MissingRoot,

    #[error("invalid root resource: {0}")]
    InvalidRoot(#[from] url::ParseError),

    #[error(transparent)]
    Namespace(#[from] NamespaceError),

    #[error("failed to build Gemini client: {0}")]
    Client(#[from] TransportError),
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create a server that fetches over Gemini with TLS.
    pub fn new(config: GatewayConfig, stylesheet: Stylesheet) -> Result<Self, StartupError> {
        let client = GeminiClient::new(Duration::from_secs(config.timeouts.connect_secs))?;
        Self::with_upstream(config, stylesheet, Arc::new(client))
    }

    /// Create a server around any upstream transport.
    pub fn with_upstream(
        config: GatewayConfig,
        stylesheet: Stylesheet,
        upstream: Arc<dyn Upstream>,
    ) -> Result<Self, StartupError> {
        let root = config
            .upstream
            .root
            .as_deref()
            .ok_or(StartupError::MissingRoot)?;
        let namespace = Namespace::new(Url::parse(root)?)?;

        let state = AppState {
            namespace: Arc::new(namespace),
            stylesheet: Arc::new(stylesheet),
            upstream,
            request_timeout: Duration::from_secs(config.timeouts.request_secs),
        };

        let router = Self::build_router(state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/", any(gateway_handler))
            .route("/{*path}", any(gateway_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(make_span))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(middleware::from_fn(track_metrics)),
            )
    }

    /// The router, for serving elsewhere or driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            root = self.config.upstream.root.as_deref().unwrap_or_default(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn make_span(request: &Request<Body>) -> tracing::Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");
    tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        uri = %request.uri(),
    )
}

async fn track_metrics(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let response = next.run(request).await;
    metrics::record_request(&method, response.status().as_u16(), start);
    response
}

/// Main gateway handler.
/// Resolves the path, fetches upstream and translates the response.
async fn gateway_handler(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Result<Outcome, GatewayError> {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(str::to_string);

    match resolve(&state.namespace, &method, &path, query.as_deref())? {
        Route::SubmitInput { path } => submit_input(path, request).await,
        Route::Proxy(target) => {
            tracing::info!(url = %target.url, foreign = target.foreign, "Proxying request");
            proxy(&state, &target).await
        }
    }
}

async fn proxy(state: &AppState, target: &ProxyTarget) -> Result<Outcome, GatewayError> {
    with_deadline(state.request_timeout, async {
        let response = state.upstream.send(&target.url).await?;
        metrics::record_upstream_status(response.status);

        let ctx = DispatchContext {
            namespace: &state.namespace,
            stylesheet: &state.stylesheet,
            url: &target.url,
            gateway_path: &target.gateway_path,
            foreign: target.foreign,
        };
        dispatch(&ctx, response).await
    })
    .await
}
