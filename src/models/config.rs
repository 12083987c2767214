//! Service configuration
//!
//! Read from environment variables at startup; constants live in
//! utils/constants.rs.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;

use super::errors::{AppError, AppResult};
use crate::utils::constants::{
    DEFAULT_HOST, DEFAULT_PORT, DEFAULT_REQUIRED_KEY, DEFAULT_SESSION_COOKIE,
    DEFAULT_SESSION_TTL_SECS,
};

/// Runtime configuration of the gtg service
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Value the `key` parameter must match
    pub required_key: String,
    /// Idle lifetime of a session
    pub session_ttl: Duration,
    /// Name of the session cookie
    pub session_cookie: String,
    /// Mark the session cookie `Secure`
    pub cookie_secure: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            required_key: DEFAULT_REQUIRED_KEY.to_string(),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            session_cookie: DEFAULT_SESSION_COOKIE.to_string(),
            cookie_secure: false,
        }
    }
}

impl GateConfig {
    /// Load from the process environment
    pub fn from_env() -> AppResult<Self> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        let config = Self::from_vars(&vars)?;
        info!(
            "⚙️ Config loaded: bind={}:{}, session_ttl={}s, cookie={}, secure={}",
            config.host,
            config.port,
            config.session_ttl.as_secs(),
            config.session_cookie,
            config.cookie_secure
        );
        Ok(config)
    }

    /// Load from an explicit variable map
    pub fn from_vars(vars: &HashMap<String, String>) -> AppResult<Self> {
        let defaults = Self::default();

        let host = non_empty(vars, "GTG_HOST")?.unwrap_or(defaults.host);

        // Hosting platforms set PORT; GTG_PORT is for local runs
        let port_var = ["PORT", "GTG_PORT"]
            .into_iter()
            .find_map(|name| vars.get(name).map(|raw| (name, raw)));
        let port = match port_var {
            Some((name, raw)) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| AppError::invalid_value(name, raw, "a port number"))?,
            None => defaults.port,
        };

        // Key comparison is case-insensitive; normalise once here
        let required_key = non_empty(vars, "GTG_REQUIRED_KEY")?
            .map(|k| k.trim().to_ascii_uppercase())
            .unwrap_or(defaults.required_key);

        let session_ttl = match vars.get("GTG_SESSION_TTL_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|_| {
                    AppError::invalid_value("GTG_SESSION_TTL_SECS", raw, "a number of seconds")
                })?;
                if secs == 0 {
                    return Err(AppError::invalid_value(
                        "GTG_SESSION_TTL_SECS",
                        raw,
                        "a positive number of seconds",
                    ));
                }
                Duration::from_secs(secs)
            }
            None => defaults.session_ttl,
        };

        let session_cookie =
            non_empty(vars, "GTG_SESSION_COOKIE")?.unwrap_or(defaults.session_cookie);
        if !session_cookie
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(AppError::invalid_value(
                "GTG_SESSION_COOKIE",
                &session_cookie,
                "a cookie name of [A-Za-z0-9_-]",
            ));
        }

        let cookie_secure = match vars.get("GTG_COOKIE_SECURE") {
            Some(raw) => parse_bool(raw)
                .ok_or_else(|| AppError::invalid_value("GTG_COOKIE_SECURE", raw, "true or false"))?,
            None => defaults.cookie_secure,
        };

        Ok(Self {
            host,
            port,
            required_key,
            session_ttl,
            session_cookie,
            cookie_secure,
        })
    }

    pub fn bind_addr(&self) -> AppResult<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

/// `Some(value)` when set and non-blank, `None` when unset
fn non_empty(vars: &HashMap<String, String>, name: &str) -> AppResult<Option<String>> {
    match vars.get(name) {
        Some(v) if v.trim().is_empty() => Err(AppError::empty_value(name)),
        Some(v) => Ok(Some(v.trim().to_string())),
        None => Ok(None),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
