//! API Request Handlers

use axum::{
    extract::{Json, Query, RawQuery, State},
    http::{header, HeaderMap, StatusCode, Uri},
    Extension,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use super::middleware::SessionId;
use super::types::*;
use crate::core::classifier::{ReferrerClassifier, RequestContext};
use crate::models::config::GateConfig;
use crate::models::types::Verdict;
use crate::telemetry::VerdictTelemetry;
use crate::utils::session::SessionStore;

/// Shared application state
pub struct AppState {
    pub config: GateConfig,
    pub classifier: ReferrerClassifier,
    pub sessions: Arc<dyn SessionStore>,
    pub telemetry: Arc<VerdictTelemetry>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: GateConfig, sessions: Arc<dyn SessionStore>) -> Self {
        let classifier = ReferrerClassifier::new(config.required_key.clone());
        Self {
            config,
            classifier,
            sessions,
            telemetry: Arc::new(VerdictTelemetry::new()),
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

// ============================================
// Classification
// ============================================

/// GET/POST: classify the visit and return the verdict
pub async fn classify(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionId>,
    headers: HeaderMap,
    uri: Uri,
    structured: Option<Query<HashMap<String, String>>>,
    RawQuery(raw_query): RawQuery,
) -> Json<Verdict> {
    let start = Instant::now();

    // Non-ASCII bytes are kept rather than dropping the whole header
    let referrer = headers
        .get(header::REFERER)
        .map(|v| String::from_utf8_lossy(v.as_bytes()))
        .unwrap_or_default();
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| uri.authority().map(|a| a.as_str()))
        .unwrap_or("");

    let ctx = RequestContext {
        referrer: &referrer,
        host,
        structured_query: structured.as_ref().map(|q| &q.0),
        raw_query: raw_query.as_deref(),
    };

    let verdict = state
        .classifier
        .classify(&ctx, state.sessions.as_ref(), &session.0);
    state.telemetry.record(&verdict);

    let latency_us = start.elapsed().as_micros();
    match verdict.flag_reason() {
        Some(reason) => info!(
            reason = reason.as_str(),
            clickid = %verdict.clickid,
            history = verdict.referrers.len(),
            latency_us = %latency_us,
            "🚩 Flagged traffic (gtg=1)"
        ),
        None => info!(
            history = verdict.referrers.len(),
            latency_us = %latency_us,
            "✅ Legitimate traffic"
        ),
    }
    debug!(
        session = %session.0,
        current = %verdict.current_referrer,
        original = %verdict.original_referrer,
        "Referrer chain"
    );

    Json(verdict)
}

/// OPTIONS: empty pre-flight answer
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let sessions = state.sessions.session_stats();
    let data = HealthData {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        active_sessions: sessions.as_ref().map(|s| s.active_sessions),
        expired_sessions: sessions.as_ref().map(|s| s.expired_sessions),
    };

    Json(ApiResponse::success(
        data,
        start.elapsed().as_secs_f64() * 1000.0,
    ))
}

// ============================================
// Stats
// ============================================

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<StatsData>> {
    let start = Instant::now();

    let data = StatsData {
        verdicts: state.telemetry.stats(),
        uptime_seconds: state.uptime_seconds(),
        api_version: env!("CARGO_PKG_VERSION").to_string(),
    };

    Json(ApiResponse::success(
        data,
        start.elapsed().as_secs_f64() * 1000.0,
    ))
}
