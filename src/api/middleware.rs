//! API Middleware (Sessions, Pre-flight, Logging)

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::handlers::AppState;
use crate::models::config::GateConfig;
use crate::utils::constants::SESSION_CLEANUP_INTERVAL_SECS;
use crate::utils::session::InMemorySessionStore;

/// Session id attached to the request by [`session_middleware`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(pub String);

/// Resolve the caller's session from its cookie, or start a new one.
/// Pre-flight requests never start a session.
pub async fn session_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS {
        return next.run(request).await;
    }

    let existing = session_from_cookies(request.headers(), &state.config.session_cookie);
    let (session_id, is_new) = match existing {
        Some(id) => (id, false),
        None => (Uuid::new_v4().to_string(), true),
    };

    request
        .extensions_mut()
        .insert(SessionId(session_id.clone()));

    let mut response = next.run(request).await;

    // Re-sent on every visit: Max-Age slides with the store TTL
    match HeaderValue::from_str(&session_cookie(&state.config, &session_id)) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
            if is_new {
                debug!("🍪 New session started: {}", session_id);
            }
        }
        Err(e) => warn!("Failed to build session cookie: {}", e),
    }

    response
}

/// Session id from the `Cookie` headers. Only well-formed UUIDs are accepted.
pub fn session_from_cookies(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|part| part.trim().split_once('='))
        .filter(|(name, _)| *name == cookie_name)
        .find_map(|(_, value)| Uuid::parse_str(value.trim()).ok())
        .map(|id| id.to_string())
}

/// `Set-Cookie` value carrying the session id and a full TTL
pub fn session_cookie(config: &GateConfig, session_id: &str) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        config.session_cookie,
        session_id,
        config.session_ttl.as_secs()
    );
    if config.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Every successful OPTIONS answer becomes `204 No Content` with an empty
/// body, including pre-flights answered by the CORS layer.
pub async fn preflight_middleware(request: Request, next: Next) -> Response {
    let is_options = request.method() == Method::OPTIONS;
    let response = next.run(request).await;

    if !is_options || !response.status().is_success() {
        return response;
    }

    let (mut parts, _) = response.into_parts();
    parts.status = StatusCode::NO_CONTENT;
    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.remove(header::CONTENT_TYPE);
    Response::from_parts(parts, Body::empty())
}

/// Request logging middleware
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    info!(
        method = %method,
        uri = %uri,
        status = %status.as_u16(),
        latency_ms = %latency.as_millis(),
        "Request completed"
    );

    response
}

/// Sweep expired sessions in the background
pub fn start_cleanup_task(sessions: InMemorySessionStore) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(Duration::from_secs(SESSION_CLEANUP_INTERVAL_SECS));
        loop {
            interval.tick().await;
            sessions.cleanup_expired();
        }
    })
}
