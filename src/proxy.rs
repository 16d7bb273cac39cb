//! `/api` reverse proxy for local development.
//!
//! SYSTEM CONTEXT
//! ==============
//! The patient API client targets `http://localhost:8002/api`. This server
//! strips the prefix and relays each request to the backend origin, so the
//! browser-facing origin and the backend can differ during development.
//! Everything outside the prefix is `/healthz` or, when configured, static
//! files.

#[cfg(test)]
#[path = "proxy_test.rs"]
mod proxy_test;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::header::{CONTENT_LENGTH, HOST};
use axum::http::{HeaderMap, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::DevServerConfig;

/// Largest request body relayed upstream.
pub const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

const UPSTREAM_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
    #[error("request body rejected: {0}")]
    Body(String),
    #[error("http client build failed: {0}")]
    ClientBuild(String),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Upstream(_) | Self::ClientBuild(_) => StatusCode::BAD_GATEWAY,
            Self::Body(_) => StatusCode::BAD_REQUEST,
        };
        tracing::warn!(%status, error = %self, "proxy request failed");
        (status, self.to_string()).into_response()
    }
}

#[derive(Debug, Clone)]
pub struct ProxyState {
    http: reqwest::Client,
    target: String,
    prefix: String,
}

/// Assemble the dev-server router.
///
/// # Errors
///
/// Returns an error if the upstream HTTP client cannot be built.
pub fn app(config: &DevServerConfig) -> Result<Router, ProxyError> {
    let http = reqwest::Client::builder()
        .connect_timeout(UPSTREAM_CONNECT_TIMEOUT)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|e| ProxyError::ClientBuild(e.to_string()))?;
    let state = Arc::new(ProxyState { http, target: config.target.clone(), prefix: config.prefix.clone() });

    let prefix = &config.prefix;
    let router = Router::new()
        .route("/healthz", get(healthz))
        .route(prefix, any(forward))
        .route(&format!("{prefix}/"), any(forward))
        .route(&format!("{prefix}/{{*rest}}"), any(forward))
        .with_state(state);

    let router = match &config.static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true)),
        None => router,
    };
    Ok(router.layer(TraceLayer::new_for_http()))
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Strip `prefix` from `path`. `None` when the path is outside the prefix.
#[must_use]
pub fn rewrite_path(prefix: &str, path: &str) -> Option<String> {
    let rest = path.strip_prefix(prefix)?;
    if rest.is_empty() {
        return Some("/".to_owned());
    }
    rest.starts_with('/').then(|| rest.to_owned())
}

#[must_use]
pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
}

/// Headers safe to relay: no hop-by-hop headers, `Host` or `Content-Length`.
fn relayable(headers: &HeaderMap) -> HeaderMap {
    headers
        .iter()
        .filter(|(name, _)| !is_hop_by_hop(name) && **name != HOST && **name != CONTENT_LENGTH)
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

async fn forward(State(state): State<Arc<ProxyState>>, request: Request) -> Result<Response, ProxyError> {
    let (parts, body) = request.into_parts();
    let path = rewrite_path(&state.prefix, parts.uri.path()).unwrap_or_else(|| parts.uri.path().to_owned());
    let url = match parts.uri.query() {
        Some(query) => format!("{}{path}?{query}", state.target),
        None => format!("{}{path}", state.target),
    };
    let body = to_bytes(body, MAX_BODY_BYTES).await.map_err(|e| ProxyError::Body(e.to_string()))?;

    tracing::debug!(method = %parts.method, from = %parts.uri, to = %url, "forwarding");
    let upstream = state
        .http
        .request(parts.method, &url)
        .headers(relayable(&parts.headers))
        .body(body)
        .send()
        .await?;

    let status = upstream.status();
    let headers = relayable(upstream.headers());
    let bytes = upstream.bytes().await?;

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}
