//! Referrer analysis: target-domain matching and session history updates

use url::Url;

use crate::utils::constants::TARGET_REFERRERS;

/// Known competitor / ad-spy domains
#[derive(Debug, Clone)]
pub struct TargetReferrers {
    pub domains: Vec<String>,
}

impl Default for TargetReferrers {
    fn default() -> Self {
        Self::new(TARGET_REFERRERS.iter().map(|d| d.to_string()))
    }
}

impl TargetReferrers {
    pub fn new(domains: impl IntoIterator<Item = String>) -> Self {
        Self {
            domains: domains.into_iter().collect(),
        }
    }

    /// First target domain contained in `host`
    pub fn match_host(&self, host: &str) -> Option<&str> {
        if host.is_empty() {
            return None;
        }
        self.domains
            .iter()
            .map(String::as_str)
            .find(|domain| host.contains(domain))
    }

    /// Whether the referrer URL's hostname belongs to a target.
    /// A referrer with no readable host is not a match.
    pub fn is_target_referrer(&self, referrer: &str) -> bool {
        referrer_host(referrer)
            .map(|host| self.match_host(&host).is_some())
            .unwrap_or(false)
    }
}

/// Hostname of a referrer URL, lowercased. `None` when no host can be read.
///
/// Strict URL parsing comes first; referrers it rejects (scheme-relative
/// `//host/...`, hosts with characters WHATWG forbids) are read leniently
/// by [`lenient_host`].
pub fn referrer_host(referrer: &str) -> Option<String> {
    if referrer.is_empty() {
        return None;
    }
    Url::parse(referrer)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .or_else(|| lenient_host(referrer))
}

/// Authority host read without validation: drop `scheme:` and the `//`
/// prefix, cut at the first `/`, `?` or `#`, then drop `userinfo@` and `:port`.
/// Input without a `//` authority marker has no host.
fn lenient_host(referrer: &str) -> Option<String> {
    let rest = match referrer.strip_prefix("//") {
        Some(rest) => rest,
        None => {
            let (scheme, after) = referrer.split_once(':')?;
            let valid_scheme = scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
            if !valid_scheme {
                return None;
            }
            after.strip_prefix("//")?
        }
    };

    let authority = rest.split(['/', '?', '#']).next().unwrap_or("");
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
    let host = match host_port.strip_prefix('[') {
        // IPv6 literal keeps its colons
        Some(v6) => v6.split(']').next().unwrap_or(""),
        None => host_port.split(':').next().unwrap_or(""),
    };

    if host.is_empty() {
        None
    } else {
        Some(host.to_ascii_lowercase())
    }
}

/// A referrer pointing back at our own host. An empty host matches everything.
#[inline]
pub fn is_self_referral(referrer: &str, host: &str) -> bool {
    referrer.contains(host)
}

/// Append `referrer` to the session history if it is new and external.
/// Returns true when the history changed. The first entry is never replaced.
pub fn record_referrer(history: &mut Vec<String>, referrer: &str, host: &str) -> bool {
    if referrer.is_empty()
        || history.iter().any(|r| r == referrer)
        || is_self_referral(referrer, host)
    {
        return false;
    }
    history.push(referrer.to_string());
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referrer_host() {
        assert_eq!(referrer_host("https://pipiads.com/search?x=1").as_deref(), Some("pipiads.com"));
        assert_eq!(referrer_host("http://Sub.AdSpy.com:8080/a").as_deref(), Some("sub.adspy.com"));
        assert_eq!(referrer_host("pipiads.com/search"), None);
        assert_eq!(referrer_host(""), None);
    }

    #[test]
    fn test_referrer_host_lenient_fallback() {
        assert_eq!(referrer_host("//pipiads.com/x").as_deref(), Some("pipiads.com"));
        assert_eq!(
            referrer_host("https://a^b.pipiads.com/x").as_deref(),
            Some("a^b.pipiads.com")
        );
        assert_eq!(
            referrer_host("https://user:pw@a^b.spyfu.com:8443/x?y=1").as_deref(),
            Some("a^b.spyfu.com")
        );
        assert_eq!(referrer_host("mailto:someone@adspy.com"), None);
        assert_eq!(referrer_host("https://"), None);
    }

    #[test]
    fn test_lenient_hosts_are_targets() {
        let targets = TargetReferrers::default();
        assert!(targets.is_target_referrer("//pipiads.com/x"));
        assert!(targets.is_target_referrer("https://a^b.pipiads.com/x"));
    }

    #[test]
    fn test_uppercase_host_is_target() {
        let targets = TargetReferrers::default();
        assert_eq!(referrer_host("https://PIPIADS.COM/").as_deref(), Some("pipiads.com"));
        assert!(targets.is_target_referrer("https://PIPIADS.COM/"));
        assert!(targets.is_target_referrer("//WWW.BIGSPY.COM/ad"));
    }

    #[test]
    fn test_target_match_by_substring() {
        let targets = TargetReferrers::default();
        assert!(targets.is_target_referrer("https://pipiads.com/search?x=1"));
        assert!(targets.is_target_referrer("https://app.semrush.com/analytics"));
        assert!(targets.is_target_referrer("https://www.similarweb.com/"));
        assert!(!targets.is_target_referrer("https://example.com/page"));
    }

    #[test]
    fn test_target_with_path_never_matches_host() {
        let targets = TargetReferrers::default();
        assert!(!targets.is_target_referrer("https://www.facebook.com/ads/library/?id=1"));
    }

    #[test]
    fn test_unparseable_referrer_is_not_target() {
        let targets = TargetReferrers::default();
        assert!(!targets.is_target_referrer("pipiads.com"));
        assert!(!targets.is_target_referrer("::::"));
    }

    #[test]
    fn test_match_host_reports_domain() {
        let targets = TargetReferrers::default();
        assert_eq!(targets.match_host("www.bigspy.com"), Some("bigspy.com"));
        assert_eq!(targets.match_host(""), None);
    }

    #[test]
    fn test_record_referrer_appends_once() {
        let mut history = Vec::new();
        assert!(record_referrer(&mut history, "https://a.example/", "gate.example"));
        assert!(!record_referrer(&mut history, "https://a.example/", "gate.example"));
        assert!(record_referrer(&mut history, "https://b.example/", "gate.example"));
        assert_eq!(history, vec!["https://a.example/", "https://b.example/"]);
    }

    #[test]
    fn test_record_referrer_skips_self_and_empty() {
        let mut history = Vec::new();
        assert!(!record_referrer(&mut history, "https://gate.example/other", "gate.example"));
        assert!(!record_referrer(&mut history, "", "gate.example"));
        assert!(history.is_empty());
    }

    #[test]
    fn test_empty_host_blocks_recording() {
        let mut history = Vec::new();
        assert!(!record_referrer(&mut history, "https://a.example/", ""));
        assert!(history.is_empty());
    }
}
