//! Query Parameter Lookup
//!
//! A parameter may arrive through three channels, tried in order:
//! 1. The query already parsed by the HTTP framework
//! 2. The raw query string, parsed again by hand
//! 3. The query string of the current referrer URL
//!
//! The first source that carries the parameter wins, even with an empty value.

use std::collections::HashMap;
use url::{form_urlencoded, Url};

/// One place a query parameter can be read from
#[derive(Debug, Clone, Copy)]
pub enum ParamSource<'a> {
    /// Framework-parsed query. `None` when the framework rejected the query.
    Structured(Option<&'a HashMap<String, String>>),
    /// Raw query string as received, without the leading `?`
    RawQuery(Option<&'a str>),
    /// Full referrer URL whose own query is consulted
    ReferrerQuery(&'a str),
}

impl ParamSource<'_> {
    /// Value of `name` in this source; unparseable input reads as absent
    pub fn lookup(&self, name: &str) -> Option<String> {
        match self {
            ParamSource::Structured(params) => params.and_then(|p| p.get(name).cloned()),
            ParamSource::RawQuery(raw) => raw
                .filter(|q| !q.is_empty())
                .and_then(|q| last_pair(form_urlencoded::parse(q.as_bytes()), name)),
            ParamSource::ReferrerQuery(referrer) => {
                if referrer.is_empty() {
                    return None;
                }
                let url = Url::parse(referrer).ok()?;
                url.query()?;
                last_pair(url.query_pairs(), name)
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ParamSource::Structured(_) => "query",
            ParamSource::RawQuery(_) => "raw_query",
            ParamSource::ReferrerQuery(_) => "referrer",
        }
    }
}

/// Repeated keys resolve to the last occurrence
fn last_pair(pairs: form_urlencoded::Parse<'_>, name: &str) -> Option<String> {
    pairs
        .filter(|(k, _)| k == name)
        .last()
        .map(|(_, v)| v.into_owned())
}

/// Walk `sources` in order and return the first hit
pub fn find_param(sources: &[ParamSource<'_>], name: &str) -> Option<String> {
    sources.iter().find_map(|source| {
        let value = source.lookup(name)?;
        tracing::trace!(param = name, source = source.label(), "param resolved");
        Some(value)
    })
}
