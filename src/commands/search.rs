use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Where search requests are sent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Results page URL; the encoded query is appended
    pub base_url: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.google.com/search?q=".to_string(),
        }
    }
}

impl SearchConfig {
    /// Build the results page URL for a query
    pub fn results_url(&self, query: &str) -> String {
        format!("{}{}", self.base_url, encode_component(query))
    }
}

/// Percent-encode a URL component, leaving `! ' ( ) *` as browsers'
/// `encodeURIComponent` does
pub fn encode_component(text: &str) -> String {
    let mut encoded = urlencoding::encode(text).into_owned();
    for (escaped, c) in [("%21", "!"), ("%27", "'"), ("%28", "("), ("%29", ")"), ("%2A", "*")] {
        encoded = encoded.replace(escaped, c);
    }
    encoded
}

/// Request to open a page in a new browsing context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    pub url: String,
    pub query: String,
}

fn search_prefix() -> &'static Regex {
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    PREFIX.get_or_init(|| Regex::new(r"(?i)search.*?google.*?for").expect("static regex"))
}

/// Strip the first `search ... google ... for` phrase and return what's left.
///
/// Without the phrase the whole utterance is the term.
pub fn extract_search_term(utterance: &str) -> String {
    search_prefix().replacen(utterance, 1, "").trim().to_string()
}

/// Navigation for a search utterance, or None when the term is empty
pub fn search_request(utterance: &str, config: &SearchConfig) -> Option<NavigationRequest> {
    let query = extract_search_term(utterance);
    if query.is_empty() {
        return None;
    }

    Some(NavigationRequest {
        url: config.results_url(&query),
        query,
    })
}
