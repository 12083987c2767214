//! Global Constants
//!
//! Single source of truth for the fixed values of the classifier:
//! target referrer domains, session keys and defaults.

// ============================================
// Verification
// ============================================

/// Value the `key` query parameter must carry (trimmed, case-insensitive)
pub const DEFAULT_REQUIRED_KEY: &str = "X184GA";

/// Query parameter checked against the required key
pub const KEY_PARAM: &str = "key";

/// Query parameter passed through for downstream correlation
pub const CLICKID_PARAM: &str = "clickid";

/// `gtg` value emitted for flagged traffic
pub const GTG_FLAGGED: u8 = 1;

// ============================================
// Sessions
// ============================================

/// Session slot holding the referrer history
pub const SESSION_KEY: &str = "referrers";

/// Session lifetime: 24 hours
pub const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 3600;

/// Default session cookie name
pub const DEFAULT_SESSION_COOKIE: &str = "GTGSESSID";

/// Interval between expired-session sweeps
pub const SESSION_CLEANUP_INTERVAL_SECS: u64 = 60;

// ============================================
// Server
// ============================================

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

// ============================================
// Target Referrers (competitor / ad-spy tools)
// ============================================

/// Domains whose presence in the original referrer's hostname flags a visit.
/// Matched by substring, so entries carrying a path never match a bare host.
pub const TARGET_REFERRERS: [&str; 26] = [
    "adspy.com",
    "bigspy.com",
    "minea.com",
    "adspyder.io",
    "adflex.io",
    "poweradspy.com",
    "dropispy.com",
    "socialpeta.com",
    "adstransparency.google.com",
    "facebook.com/ads/library",
    "adbeat.com",
    "anstrex.com",
    "semrush.com",
    "autods.com",
    "foreplay.co",
    "spyfu.com",
    "adplexity.com",
    "spypush.com",
    "nativeadbuzz.com",
    "spyover.com",
    "videoadvault.com",
    "admobispy.com",
    "ispionage.com",
    "similarweb.com",
    "pipiads.com",
    "adespresso.com",
];
