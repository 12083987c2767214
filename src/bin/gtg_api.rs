//! gtg Gate API Server
//!
//! Usage:
//!   cargo run --bin gtg_api
//!
//! Environment:
//!   PORT / GTG_PORT      - Server port (default: 8080)
//!   GTG_HOST             - Server host (default: 0.0.0.0)
//!   GTG_REQUIRED_KEY     - Required `key` value (default: X184GA)
//!   GTG_SESSION_TTL_SECS - Session lifetime (default: 86400)
//!   GTG_SESSION_COOKIE   - Session cookie name (default: GTGSESSID)
//!   GTG_COOKIE_SECURE    - Mark the cookie Secure (default: false)
//!   RUST_LOG             - Log level (default: info)

use gtg_gate::api::{create_router, start_cleanup_task, AppState};
use gtg_gate::models::AppError;
use gtg_gate::{GateConfig, InMemorySessionStore};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    print_banner();

    let config = match GateConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(code = e.code_str(), "❌ {}", e);
            return Err(e.into());
        }
    };

    // Session store + background sweep
    let sessions = InMemorySessionStore::with_ttl(config.session_ttl);
    let cleanup = start_cleanup_task(sessions.clone());
    info!("🧹 Session cleanup task started");

    let addr = config.bind_addr()?;
    let state = Arc::new(AppState::new(config, Arc::new(sessions)));
    let telemetry = state.telemetry.clone();

    let app = create_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::bind_failed(&addr.to_string(), e))?;

    info!("🚀 gtg Gate API starting on http://{}", addr);
    info!("");
    info!("Endpoints:");
    info!("  GET|POST|OPTIONS /gtg        - Classify visit (also /gtg.php, /v1/gtg)");
    info!("  GET              /v1/stats   - Verdict statistics");
    info!("  GET              /v1/health  - Health check");
    info!("");
    info!("Press Ctrl+C for graceful shutdown");

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(AppError::from)?;

    cleanup.abort();

    info!("");
    info!("🛑 Shutdown signal received");
    let stats = telemetry.stats();
    info!("   Total classified: {}", stats.total_classified);
    info!("   Legitimate:       {}", stats.legitimate);
    info!(
        "   Flagged:          {} ({:.1}%)",
        stats.flagged,
        stats.flagged_percent()
    );
    info!("   - target referrer: {}", stats.flagged_target_referrer);
    info!("   - missing key:     {}", stats.flagged_missing_key);
    info!("👋 gtg Gate API shutdown complete");

    Ok(())
}

fn print_banner() {
    println!(
        r#"
    ╔══════════════════════════════════════════════╗
    ║                                              ║
    ║          g t g   G A T E   v0.1.0            ║
    ║      Referrer-chain traffic classifier       ║
    ║                                              ║
    ╚══════════════════════════════════════════════╝
    "#
    );
}
