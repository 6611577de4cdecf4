//! Same-origin proxy to the marketplace backend
//!
//! The browser only ever talks to this server. Requests under `/api/v1` and
//! `/repos` are forwarded verbatim to `BACKEND_URL`:
//! - method, body and query string are kept
//! - `Content-Type`, `Authorization` and `Cookie` are forwarded upstream
//! - upstream status, `Content-Type` and `Set-Cookie` come back unchanged
//!
//! Connection failures become a `502` with a JSON error body.

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, HeaderName, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::any,
};
use serde::Serialize;

use super::config::Config;

/// Request headers copied to the upstream request
const FORWARDED_REQUEST_HEADERS: [HeaderName; 4] = [
    header::CONTENT_TYPE,
    header::AUTHORIZATION,
    header::COOKIE,
    header::ACCEPT,
];

/// Upstream response headers copied back to the browser
const FORWARDED_RESPONSE_HEADERS: [HeaderName; 3] =
    [header::CONTENT_TYPE, header::SET_COOKIE, header::CACHE_CONTROL];

#[derive(Clone)]
pub struct ProxyState {
    client: reqwest::Client,
    config: Arc<Config>,
}

impl ProxyState {
    pub fn new(config: Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            config: Arc::new(config),
        }
    }
}

/// Routes forwarded to the backend
///
/// - `ANY /api/v1/*`
/// - `ANY /repos`, `ANY /repos/*`
pub fn proxy_router(config: Config) -> Router {
    Router::new()
        .route("/api/v1/{*rest}", any(forward))
        .route("/repos", any(forward))
        .route("/repos/{*rest}", any(forward))
        .with_state(ProxyState::new(config))
}

#[derive(Serialize)]
struct ProxyError {
    message: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(ProxyError {
            message: message.into(),
        }),
    )
        .into_response()
}

fn copy_headers(from: &HeaderMap, to: &mut HeaderMap, names: &[HeaderName]) {
    for name in names {
        for value in from.get_all(name) {
            to.append(name.clone(), value.clone());
        }
    }
}

async fn forward(
    State(state): State<ProxyState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    let url = state.config.upstream_url(path_and_query);

    let mut upstream_headers = HeaderMap::new();
    copy_headers(&headers, &mut upstream_headers, &FORWARDED_REQUEST_HEADERS);

    tracing::debug!("Proxying {} {}", method, path_and_query);

    let response = state
        .client
        .request(method.clone(), &url)
        .headers(upstream_headers)
        .body(body)
        .send()
        .await;

    let upstream = match response {
        Ok(upstream) => upstream,
        Err(e) => {
            tracing::error!("Backend unreachable for {} {}: {}", method, path_and_query, e);
            return error_response(StatusCode::BAD_GATEWAY, "Backend is unavailable");
        }
    };

    let status = upstream.status();
    let mut response_headers = HeaderMap::new();
    copy_headers(
        upstream.headers(),
        &mut response_headers,
        &FORWARDED_RESPONSE_HEADERS,
    );

    match upstream.bytes().await {
        Ok(bytes) => {
            if status.is_server_error() {
                tracing::warn!("Backend returned {} for {} {}", status, method, path_and_query);
            }
            (status, response_headers, Body::from(bytes)).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to read backend response: {}", e);
            error_response(StatusCode::BAD_GATEWAY, "Failed to read backend response")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_only_whitelisted_request_headers_forwarded() {
        let mut incoming = HeaderMap::new();
        incoming.insert(header::COOKIE, HeaderValue::from_static("sid=1"));
        incoming.insert(header::HOST, HeaderValue::from_static("localhost:3000"));
        incoming.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        let mut outgoing = HeaderMap::new();
        copy_headers(&incoming, &mut outgoing, &FORWARDED_REQUEST_HEADERS);

        assert_eq!(outgoing.get(header::COOKIE).unwrap(), "sid=1");
        assert!(outgoing.get(header::HOST).is_none());
        assert_eq!(outgoing.len(), 2);
    }

    #[test]
    fn test_multiple_set_cookie_values_kept() {
        let mut upstream = HeaderMap::new();
        upstream.append(header::SET_COOKIE, HeaderValue::from_static("a=1"));
        upstream.append(header::SET_COOKIE, HeaderValue::from_static("b=2"));

        let mut outgoing = HeaderMap::new();
        copy_headers(&upstream, &mut outgoing, &FORWARDED_RESPONSE_HEADERS);

        assert_eq!(outgoing.get_all(header::SET_COOKIE).iter().count(), 2);
    }

    #[test]
    fn test_error_response_is_json() {
        let response = error_response(StatusCode::BAD_GATEWAY, "Backend is unavailable");
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[tokio::test]
    async fn test_unreachable_backend_yields_bad_gateway() {
        // Port 9 (discard) on localhost is not expected to accept HTTP
        let config = Config {
            backend_url: "http://127.0.0.1:9".to_string(),
            backend_configured: true,
        };
        let response = forward(
            State(ProxyState::new(config)),
            Method::GET,
            Uri::from_static("/repos/abc"),
            HeaderMap::new(),
            Bytes::new(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
