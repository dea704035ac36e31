//! Query evaluation against the table's entries.
//!
//! Matching runs in two stages: scope restriction (RFC 6265 domain, path,
//! and secure-context rules) followed by the name filter. Results are
//! ordered longest path first, then insertion order, so "first matching
//! cookie" is well-defined for single-result queries.

use crate::cookies::entry::CookieEntry;
use url::Url;

/// How a query's name constrains entry names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchType {
    /// Exact name equality.
    #[default]
    Equals,
    /// Entry name has the query name as a prefix.
    StartsWith,
}

/// A read or delete query, also the shape of an observer interest.
///
/// `name: None` passes every scope-compatible entry; `name: Some("")` is
/// distinct and matches only literally-empty names. `url: None` means the
/// store's own scope.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CookieQuery {
    pub name: Option<String>,
    pub match_type: MatchType,
    pub url: Option<Url>,
}

impl CookieQuery {
    /// All scope-compatible entries at the default scope.
    pub fn all() -> Self {
        Self::default()
    }

    /// Exact-name query.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Prefix query.
    pub fn name_starts_with(prefix: impl Into<String>) -> Self {
        Self {
            name: Some(prefix.into()),
            match_type: MatchType::StartsWith,
            url: None,
        }
    }

    /// Evaluate at the given URL instead of the store's scope.
    pub fn at_url(mut self, url: Url) -> Self {
        self.url = Some(url);
        self
    }

    /// The same query with the name constraint removed; used to compute
    /// the full visible set at this query's scope.
    pub(crate) fn unnamed(&self) -> Self {
        Self {
            name: None,
            match_type: MatchType::Equals,
            url: self.url.clone(),
        }
    }
}

impl From<&str> for CookieQuery {
    fn from(name: &str) -> Self {
        CookieQuery::named(name)
    }
}

/// Evaluate `query` over `entries`, resolving an absent query URL to
/// `default_scope`. Returns matching entries, scope-restricted, name
/// filtered, and deterministically ordered.
pub fn match_entries(
    entries: &[CookieEntry],
    query: &CookieQuery,
    default_scope: &Url,
) -> Vec<CookieEntry> {
    let scope = query.url.as_ref().unwrap_or(default_scope);

    let mut result: Vec<CookieEntry> = entries
        .iter()
        .filter(|e| scope_visible(e, scope))
        .filter(|e| name_matches(e, query))
        .cloned()
        .collect();

    // Longest path first, then insertion order; mirrors conventional
    // cookie-header ordering.
    result.sort_by(|a, b| {
        b.path
            .len()
            .cmp(&a.path.len())
            .then_with(|| a.sequence.cmp(&b.sequence))
    });

    result
}

/// Whether an entry is visible at a scope URL at all: domain, path, and
/// secure-context restrictions.
pub fn scope_visible(entry: &CookieEntry, scope: &Url) -> bool {
    let host = scope.host_str().unwrap_or("");

    if !domain_matches(&entry.domain, host, entry.host_only) {
        return false;
    }

    if !path_matches(&entry.path, scope.path()) {
        return false;
    }

    // Secure cookies are invisible outside secure contexts.
    if entry.secure && scope.scheme() != "https" {
        return false;
    }

    true
}

fn name_matches(entry: &CookieEntry, query: &CookieQuery) -> bool {
    match (&query.name, query.match_type) {
        (None, _) => true,
        (Some(name), MatchType::Equals) => entry.name == *name,
        (Some(prefix), MatchType::StartsWith) => entry.name.starts_with(prefix.as_str()),
    }
}

/// RFC 6265 domain matching. Host-only cookies require an exact match;
/// domain cookies suffix-match on a label boundary.
pub(crate) fn domain_matches(cookie_domain: &str, request_host: &str, host_only: bool) -> bool {
    if host_only {
        return cookie_domain.eq_ignore_ascii_case(request_host);
    }

    let cookie_domain = cookie_domain.trim_start_matches('.');

    if request_host.eq_ignore_ascii_case(cookie_domain) {
        return true;
    }

    if request_host.len() > cookie_domain.len() {
        let suffix = &request_host[request_host.len() - cookie_domain.len()..];
        if suffix.eq_ignore_ascii_case(cookie_domain) {
            let boundary = request_host
                .chars()
                .nth(request_host.len() - cookie_domain.len() - 1);
            return boundary == Some('.');
        }
    }

    false
}

/// RFC 6265 path matching: equal, or a prefix ending at a `/` boundary.
pub(crate) fn path_matches(cookie_path: &str, request_path: &str) -> bool {
    if request_path == cookie_path {
        return true;
    }

    if request_path.starts_with(cookie_path) {
        if cookie_path.ends_with('/') {
            return true;
        }
        return request_path.chars().nth(cookie_path.len()) == Some('/');
    }

    false
}
