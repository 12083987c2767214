//! Core data types

use serde::Serialize;

use crate::utils::constants::GTG_FLAGGED;

/// Classification result returned for every non-preflight request.
/// Field names are part of the wire contract with the ad-routing script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub success: bool,
    /// `1` for flagged traffic, `null` for legitimate traffic. Always serialized.
    pub gtg: Option<u8>,
    pub came_from_referrer: bool,
    pub has_key: bool,
    pub clickid: String,
    pub original_referrer: String,
    pub current_referrer: String,
    pub referrers: Vec<String>,
    pub gtg_traffic: bool,
    pub url_updated: bool,
}

impl Verdict {
    /// Apply the decision rule: flag when the session started on a target
    /// referrer or the request lacks the required key.
    pub fn decide(
        came_from_referrer: bool,
        has_key: bool,
        clickid: String,
        current_referrer: String,
        referrers: Vec<String>,
    ) -> Self {
        let gtg = if came_from_referrer || !has_key {
            Some(GTG_FLAGGED)
        } else {
            None
        };
        let original_referrer = referrers.first().cloned().unwrap_or_default();

        Self {
            success: true,
            gtg,
            came_from_referrer,
            has_key,
            clickid,
            original_referrer,
            current_referrer,
            referrers,
            gtg_traffic: gtg.is_none(),
            url_updated: gtg.is_some(),
        }
    }

    /// Why the visit was flagged, for logs and stats
    pub fn flag_reason(&self) -> Option<FlagReason> {
        match (self.came_from_referrer, self.has_key) {
            (true, _) => Some(FlagReason::TargetReferrer),
            (false, false) => Some(FlagReason::MissingKey),
            (false, true) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagReason {
    TargetReferrer,
    MissingKey,
}

impl FlagReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlagReason::TargetReferrer => "target_referrer",
            FlagReason::MissingKey => "missing_key",
        }
    }
}
