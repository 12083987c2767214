//! gtg Gate Library
//!
//! Referrer-chain traffic classifier. Each visit is checked for:
//! - An original referrer belonging to a competitor / ad-spy tool
//! - The required `key` query parameter
//!
//! and answered with a verdict telling the ad-routing script whether to
//! send `gtg=1` (flagged) or nothing (legitimate).

pub mod api;
pub mod core;
pub mod models;
pub mod telemetry;
pub mod utils;

pub use crate::core::{ParamSource, ReferrerClassifier, RequestContext, TargetReferrers};
pub use models::{AppError, AppResult, ErrorCode, FlagReason, GateConfig, Verdict};
pub use telemetry::{VerdictStats, VerdictTelemetry};
pub use utils::{InMemorySessionStore, SessionStats, SessionStore};
