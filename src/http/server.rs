//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the proxy handler mounted under the prefix
//! - Wire up middleware (CORS headers, tracing, request ID)
//! - Bind server to listener and serve until shutdown
//! - Translate inbound requests into backend calls and relay the result

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::http::request::{ForwardedQuery, OutboundRequest, UuidRequestId, X_REQUEST_ID};
use crate::http::response::ProxyError;
use crate::http::upstream;
use crate::lifecycle::shutdown::ShutdownSignal;
use crate::observability::metrics;
use crate::routing::LogicalPath;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Backend base URL; `None` makes every GET fail closed.
    pub base_url: Option<Arc<str>>,
    pub mount_prefix: Arc<str>,
    pub client: reqwest::Client,
}

/// HTTP server for the GAS proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    /// Create a server that uses the given client for backend calls.
    pub fn with_client(config: ProxyConfig, client: reqwest::Client) -> Self {
        let state = AppState {
            base_url: config.backend.base_url.as_deref().map(Arc::from),
            mount_prefix: Arc::from(config.backend.mount_prefix.as_str()),
            client,
        };

        if state.base_url.is_none() {
            tracing::warn!("No backend base URL configured; GET requests will fail with MISSING_GAS_BASE_URL");
        }

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let prefix = config.backend.mount_prefix.trim_end_matches('/');

        Router::new()
            .route(prefix, any(proxy_handler))
            .route(&format!("{prefix}/"), any(proxy_handler))
            .route(&format!("{prefix}/{{*path}}"), any(proxy_handler))
            .fallback(|| async { StatusCode::NOT_FOUND })
            .with_state(state)
            .layer(SetResponseHeaderLayer::overriding(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static("GET,OPTIONS"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static("Content-Type"),
            ))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::new(header::HeaderName::from_static(X_REQUEST_ID)))
            .layer(SetRequestIdLayer::new(
                header::HeaderName::from_static(X_REQUEST_ID),
                UuidRequestId,
            ))
    }

    /// The fully layered router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until a shutdown signal is received.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            mount_prefix = %self.config.backend.mount_prefix,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler.
async fn proxy_handler(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    let start_time = Instant::now();

    let (outcome, response) = match forward(&state, &method, &uri).await {
        Ok(response) => ("ok", response),
        Err(e) => {
            if matches!(e, ProxyError::Upstream(_)) {
                tracing::error!(uri = %uri, error = %e, "Proxy error");
            } else {
                tracing::warn!(uri = %uri, method = %method, code = e.code(), "Request rejected");
            }
            (e.code(), e.into_response())
        }
    };

    metrics::record_request(method.as_str(), response.status().as_u16(), outcome, start_time);
    response
}

async fn forward(state: &AppState, method: &Method, uri: &Uri) -> Result<Response, ProxyError> {
    // Preflight
    if method == Method::OPTIONS {
        return Ok(StatusCode::OK.into_response());
    }
    if method != Method::GET {
        return Err(ProxyError::MethodNotAllowed);
    }

    let base_url = state.base_url.as_deref().ok_or(ProxyError::MissingBaseUrl)?;

    let path = LogicalPath::from_uri_path(&state.mount_prefix, uri.path()).unwrap_or_default();
    let outbound = OutboundRequest::new(base_url, path, ForwardedQuery::from_raw(uri.query()));

    tracing::info!(
        inbound = %uri,
        path = %outbound.path,
        outbound = %outbound.url,
        "Forwarding request"
    );

    let backend = upstream::fetch(&state.client, &outbound).await?;
    Ok(backend.into_response())
}
