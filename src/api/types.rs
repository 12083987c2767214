//! API Request/Response Types
//!
//! The classification endpoint answers with a bare [`Verdict`](crate::models::Verdict);
//! the operational endpoints use the envelope below.

use serde::Serialize;

use crate::telemetry::VerdictStats;

/// API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub latency_ms: f64,
    pub timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, latency_ms: f64) -> Self {
        Self {
            success: true,
            data,
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

// ============================================
// Health Check
// ============================================

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    /// Live sessions, when the store keeps counters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_sessions: Option<usize>,
    /// Sessions dropped after their TTL ran out
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expired_sessions: Option<u64>,
}

// ============================================
// Stats
// ============================================

#[derive(Debug, Serialize)]
pub struct StatsData {
    #[serde(flatten)]
    pub verdicts: VerdictStats,
    pub uptime_seconds: u64,
    pub api_version: String,
}
