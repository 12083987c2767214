//! Session Store Module
//!
//! Per-session key/value storage for the referrer history.
//! The classifier only sees the [`SessionStore`] trait; the server injects
//! an [`InMemorySessionStore`] backed by DashMap.
//!
//! Features:
//! - Sliding TTL (24 hours default), refreshed on every access
//! - Expired sessions read as empty
//! - Periodic sweep of expired entries

use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::utils::constants::DEFAULT_SESSION_TTL_SECS;

/// Session-scoped storage of string lists
pub trait SessionStore: Send + Sync {
    /// Read a slot of a session. `None` when the session or slot is absent or expired.
    fn get(&self, session_id: &str, key: &str) -> Option<Vec<String>>;

    /// Replace a slot of a session, creating the session if needed
    fn set(&self, session_id: &str, key: &str, value: Vec<String>);

    /// Backend counters, if the backend keeps any
    fn session_stats(&self) -> Option<SessionStats> {
        None
    }
}

/// One live session
#[derive(Clone, Debug)]
pub struct SessionEntry {
    pub slots: HashMap<String, Vec<String>>,
    /// Last read or write
    pub touched_at: Instant,
}

impl SessionEntry {
    fn new() -> Self {
        Self {
            slots: HashMap::new(),
            touched_at: Instant::now(),
        }
    }

    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.touched_at.elapsed() > ttl
    }
}

/// In-process session store
#[derive(Clone)]
pub struct InMemorySessionStore {
    /// session id -> entry
    sessions: Arc<DashMap<String, SessionEntry>>,
    ttl: Duration,
    expired: Arc<AtomicU64>,
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySessionStore {
    /// Store with the default 24h TTL
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(DEFAULT_SESSION_TTL_SECS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            ttl,
            expired: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Remove every expired session, returning how many were dropped
    pub fn cleanup_expired(&self) -> usize {
        let before = self.sessions.len();
        let ttl = self.ttl;
        self.sessions.retain(|_, entry| !entry.is_expired(ttl));
        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            self.expired.fetch_add(removed as u64, Ordering::Relaxed);
            info!("🧹 SESSION CLEANUP: {} expired sessions removed", removed);
        }
        removed
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            active_sessions: self.sessions.len(),
            expired_sessions: self.expired.load(Ordering::Relaxed),
            ttl_secs: self.ttl.as_secs(),
        }
    }

    fn expire(&self, session_id: &str) {
        if self.sessions.remove(session_id).is_some() {
            self.expired.fetch_add(1, Ordering::Relaxed);
            debug!("📭 SESSION EXPIRED: {}", session_id);
        }
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, session_id: &str, key: &str) -> Option<Vec<String>> {
        let mut entry = self.sessions.get_mut(session_id)?;
        if entry.is_expired(self.ttl) {
            drop(entry); // release the shard lock before removing
            self.expire(session_id);
            return None;
        }
        entry.touched_at = Instant::now();
        entry.slots.get(key).cloned()
    }

    fn set(&self, session_id: &str, key: &str, value: Vec<String>) {
        let ttl = self.ttl;
        let mut entry = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(SessionEntry::new);
        if entry.is_expired(ttl) {
            *entry = SessionEntry::new();
            self.expired.fetch_add(1, Ordering::Relaxed);
        }
        entry.touched_at = Instant::now();
        entry.slots.insert(key.to_string(), value);
        debug!("💾 SESSION SET: {} [{}]", session_id, key);
    }

    fn session_stats(&self) -> Option<SessionStats> {
        Some(self.stats())
    }
}

/// Session statistics for monitoring
#[derive(Debug, Clone)]
pub struct SessionStats {
    pub active_sessions: usize,
    pub expired_sessions: u64,
    pub ttl_secs: u64,
}
