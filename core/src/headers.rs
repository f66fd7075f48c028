//! Effective header set for one call.

use ureq::http::header::{HeaderMap, HeaderValue};

use crate::http::USER_AGENT;

/// Merge configured defaults, per-call headers and the configured user
/// agent.
///
/// Only the first value of each key survives. Per-call values replace
/// defaults. `user_agent` is applied only when neither map carries a
/// `User-Agent` already; an agent string that is not a valid header value
/// is skipped.
pub fn merge_headers(defaults: &HeaderMap, per_call: &HeaderMap, user_agent: Option<&str>) -> HeaderMap {
    let mut merged = HeaderMap::with_capacity(defaults.keys_len() + per_call.keys_len() + 1);

    for source in [defaults, per_call] {
        for name in source.keys() {
            if let Some(value) = source.get(name) {
                merged.insert(name.clone(), value.clone());
            }
        }
    }

    if let Some(agent) = user_agent.filter(|a| !a.is_empty()) {
        if !merged.contains_key(USER_AGENT) {
            if let Ok(value) = HeaderValue::from_str(agent) {
                merged.insert(USER_AGENT, value);
            }
        }
    }

    merged
}
