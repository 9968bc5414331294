//! Typed wrappers over the backend endpoints, grouped by who calls them.

pub mod admin;
pub mod auth;
pub mod user;

pub use admin::*;
pub use auth::*;
pub use user::*;

use serde_json::Value;

/// Build `?k=v&...` with proper escaping; empty values are skipped.
pub(crate) fn query_string(pairs: &[(&str, String)]) -> String {
    let kept: Vec<(&str, &str)> = pairs
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| (*k, v.as_str()))
        .collect();
    if kept.is_empty() {
        return String::new();
    }
    match reqwest::Url::parse_with_params("http://query.local/", &kept) {
        Ok(url) => format!("?{}", url.query().unwrap_or_default()),
        Err(e) => {
            log::warn!("Failed to build query string: {}", e);
            String::new()
        }
    }
}

/// Lists arrive either bare or wrapped in `results`.
pub(crate) fn list_items(v: &Value) -> Vec<Value> {
    match v {
        Value::Array(items) => items.clone(),
        other => other
            .get("results")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
    }
}

pub(crate) fn page_count(v: &Value, key_path: &[&str]) -> u32 {
    key_path
        .iter()
        .try_fold(v, |node, key| node.get(*key))
        .and_then(Value::as_u64)
        .unwrap_or(0) as u32
}
