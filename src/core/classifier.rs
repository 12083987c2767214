//! Referrer Classifier
//!
//! Decides whether a visit is legitimate or should be flagged (`gtg=1`)
//! for the ad-routing script. A visit is flagged when the session's original
//! referrer is a known ad-spy tool, or when the request does not carry the
//! required `key` parameter.
//!
//! Every step is a local computation; bad input never produces an error,
//! only a "no match" or an empty value.

use std::collections::HashMap;
use tracing::debug;

use super::params::{find_param, ParamSource};
use super::referrer::{record_referrer, TargetReferrers};
use crate::models::types::Verdict;
use crate::utils::constants::{CLICKID_PARAM, DEFAULT_REQUIRED_KEY, KEY_PARAM, SESSION_KEY};
use crate::utils::session::SessionStore;

/// Request facts the classifier needs
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestContext<'a> {
    /// `Referer` header, empty when absent
    pub referrer: &'a str,
    /// Own host (`Host` header or URI authority)
    pub host: &'a str,
    /// Framework-parsed query, `None` if it failed to parse
    pub structured_query: Option<&'a HashMap<String, String>>,
    /// Raw query string
    pub raw_query: Option<&'a str>,
}

impl<'a> RequestContext<'a> {
    /// Lookup order for query parameters
    pub fn param_sources(&self) -> [ParamSource<'a>; 3] {
        [
            ParamSource::Structured(self.structured_query),
            ParamSource::RawQuery(self.raw_query),
            ParamSource::ReferrerQuery(self.referrer),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct ReferrerClassifier {
    targets: TargetReferrers,
    required_key: String,
}

impl Default for ReferrerClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_REQUIRED_KEY)
    }
}

impl ReferrerClassifier {
    pub fn new(required_key: impl Into<String>) -> Self {
        Self {
            targets: TargetReferrers::default(),
            required_key: required_key.into(),
        }
    }

    /// Trimmed, case-insensitive comparison against the required key
    pub fn key_matches(&self, value: &str) -> bool {
        trim_php_whitespace(value).eq_ignore_ascii_case(&self.required_key)
    }

    /// Classify one request, recording its referrer in the session history
    pub fn classify(
        &self,
        ctx: &RequestContext<'_>,
        store: &dyn SessionStore,
        session_id: &str,
    ) -> Verdict {
        let mut referrers = store.get(session_id, SESSION_KEY).unwrap_or_default();

        if record_referrer(&mut referrers, ctx.referrer, ctx.host) {
            store.set(session_id, SESSION_KEY, referrers.clone());
            debug!(session = session_id, referrer = ctx.referrer, "referrer recorded");
        }

        let came_from_referrer = referrers
            .first()
            .map(|original| self.targets.is_target_referrer(original))
            .unwrap_or(false);

        let sources = ctx.param_sources();
        let has_key = find_param(&sources, KEY_PARAM)
            .map(|value| self.key_matches(&value))
            .unwrap_or(false);
        let clickid = find_param(&sources, CLICKID_PARAM).unwrap_or_default();

        Verdict::decide(
            came_from_referrer,
            has_key,
            clickid,
            ctx.referrer.to_string(),
            referrers,
        )
    }
}

/// Strip the characters PHP's `trim()` strips: space, \t, \n, \r, \0, \x0B
fn trim_php_whitespace(value: &str) -> &str {
    value.trim_matches(|c: char| matches!(c, ' ' | '\t' | '\n' | '\r' | '\0' | '\x0B'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::session::InMemorySessionStore;

    const HOST: &str = "gate.example";

    fn ctx<'a>(referrer: &'a str, raw_query: Option<&'a str>) -> RequestContext<'a> {
        RequestContext {
            referrer,
            host: HOST,
            structured_query: None,
            raw_query,
        }
    }

    #[test]
    fn test_no_referrer_no_params_is_flagged() {
        let store = InMemorySessionStore::new();
        let verdict = ReferrerClassifier::default().classify(&ctx("", None), &store, "s");

        assert!(!verdict.has_key);
        assert_eq!(verdict.clickid, "");
        assert_eq!(verdict.gtg, Some(1));
        assert!(verdict.url_updated);
        assert!(verdict.referrers.is_empty());
        assert_eq!(verdict.original_referrer, "");
    }

    #[test]
    fn test_target_referrer_without_key() {
        let store = InMemorySessionStore::new();
        let verdict = ReferrerClassifier::default().classify(
            &ctx("https://pipiads.com/search?x=1", None),
            &store,
            "s",
        );

        assert!(verdict.came_from_referrer);
        assert!(!verdict.has_key);
        assert_eq!(verdict.gtg, Some(1));
    }

    #[test]
    fn test_target_referrer_with_key_still_flagged() {
        let store = InMemorySessionStore::new();
        let verdict = ReferrerClassifier::default().classify(
            &ctx("https://www.adspy.com/", Some("key=X184GA")),
            &store,
            "s",
        );

        assert!(verdict.came_from_referrer);
        assert!(verdict.has_key);
        assert_eq!(verdict.gtg, Some(1));
    }

    #[test]
    fn test_clean_referrer_with_key_is_legitimate() {
        let store = InMemorySessionStore::new();
        let verdict = ReferrerClassifier::default().classify(
            &ctx("https://example.com/page", Some("key=x184ga")),
            &store,
            "s",
        );

        assert!(verdict.has_key);
        assert!(!verdict.came_from_referrer);
        assert_eq!(verdict.gtg, None);
        assert!(verdict.gtg_traffic);
        assert!(!verdict.url_updated);
    }

    #[test]
    fn test_key_is_trimmed_and_case_insensitive() {
        let classifier = ReferrerClassifier::default();
        assert!(classifier.key_matches("  x184Ga\n"));
        assert!(classifier.key_matches("X184GA\0"));
        assert!(!classifier.key_matches("X184G"));
        assert!(!classifier.key_matches(""));
    }

    #[test]
    fn test_key_from_referrer_query() {
        let store = InMemorySessionStore::new();
        let verdict = ReferrerClassifier::default().classify(
            &ctx("https://landing.example/?key=X184GA&clickid=c-9", None),
            &store,
            "s",
        );

        assert!(verdict.has_key);
        assert_eq!(verdict.clickid, "c-9");
        assert_eq!(verdict.gtg, None);
    }

    #[test]
    fn test_request_query_beats_referrer_query() {
        let store = InMemorySessionStore::new();
        let verdict = ReferrerClassifier::default().classify(
            &ctx("https://landing.example/?key=X184GA", Some("key=wrong")),
            &store,
            "s",
        );

        assert!(!verdict.has_key);
        assert_eq!(verdict.gtg, Some(1));
    }

    #[test]
    fn test_structured_query_is_first_tier() {
        let store = InMemorySessionStore::new();
        let mut structured = HashMap::new();
        structured.insert("clickid".to_string(), "from-structured".to_string());
        let context = RequestContext {
            referrer: "",
            host: HOST,
            structured_query: Some(&structured),
            raw_query: Some("clickid=from-raw"),
        };

        let verdict = ReferrerClassifier::default().classify(&context, &store, "s");
        assert_eq!(verdict.clickid, "from-structured");
    }

    #[test]
    fn test_original_referrer_is_sticky() {
        let store = InMemorySessionStore::new();
        let classifier = ReferrerClassifier::default();

        classifier.classify(&ctx("https://bigspy.com/ad/1", None), &store, "s");
        let verdict = classifier.classify(&ctx("https://example.com/", Some("key=X184GA")), &store, "s");

        assert_eq!(verdict.original_referrer, "https://bigspy.com/ad/1");
        assert_eq!(verdict.current_referrer, "https://example.com/");
        assert!(verdict.came_from_referrer);
        assert_eq!(verdict.gtg, Some(1));
        assert_eq!(verdict.referrers.len(), 2);
    }

    #[test]
    fn test_repeat_request_does_not_duplicate() {
        let store = InMemorySessionStore::new();
        let classifier = ReferrerClassifier::default();

        let first = classifier.classify(&ctx("https://example.com/page", None), &store, "s");
        let second = classifier.classify(&ctx("https://example.com/page", None), &store, "s");

        assert_eq!(first.referrers.len(), 1);
        assert_eq!(second.referrers, first.referrers);
    }

    #[test]
    fn test_self_referral_not_recorded() {
        let store = InMemorySessionStore::new();
        let verdict = ReferrerClassifier::default().classify(
            &ctx("https://gate.example/landing?key=X184GA", None),
            &store,
            "s",
        );

        assert!(verdict.referrers.is_empty());
        assert_eq!(verdict.current_referrer, "https://gate.example/landing?key=X184GA");
        // the self-referral still supplies the key
        assert!(verdict.has_key);
    }

    #[test]
    fn test_sessions_do_not_share_history() {
        let store = InMemorySessionStore::new();
        let classifier = ReferrerClassifier::default();

        classifier.classify(&ctx("https://pipiads.com/", None), &store, "a");
        let verdict = classifier.classify(&ctx("", Some("key=X184GA")), &store, "b");

        assert!(!verdict.came_from_referrer);
        assert_eq!(verdict.gtg, None);
    }

    #[test]
    fn test_custom_targets_and_key() {
        let store = InMemorySessionStore::new();
        let classifier = ReferrerClassifier {
            targets: TargetReferrers::new(vec!["spy.test".to_string()]),
            required_key: "OPEN".to_string(),
        };

        let verdict = classifier.classify(&ctx("https://www.spy.test/", Some("key=open")), &store, "s");
        assert!(verdict.came_from_referrer);
        assert!(verdict.has_key);

        let verdict = classifier.classify(&ctx("https://pipiads.com/", Some("key=open")), &store, "t");
        assert!(!verdict.came_from_referrer);
    }

    #[test]
    fn test_scheme_relative_spy_referrer_is_flagged() {
        let store = InMemorySessionStore::new();
        let classifier = ReferrerClassifier::default();

        let verdict = classifier.classify(&ctx("//pipiads.com/search", Some("key=X184GA")), &store, "s");
        assert!(verdict.came_from_referrer);
        assert!(verdict.has_key);
        assert_eq!(verdict.gtg, Some(1));
    }
}
