use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A cookie as held by the table.
///
/// The tuple (name, domain, path) is the identity of an entry: setting an
/// existing tuple replaces value, expiry, and secure flag in place rather
/// than creating a duplicate. `sequence` is the insertion-order marker the
/// matcher uses for deterministic ordering; it is assigned by the table and
/// survives in-place replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieEntry {
    pub name: String,
    pub value: String,
    /// Lowercased domain. For host-only cookies this is the origin host.
    pub domain: String,
    /// Host-only marker: exact host match required instead of suffix match.
    pub host_only: bool,
    pub path: String,
    pub secure: bool,
    /// `None` is a session cookie: it never auto-expires.
    #[serde(with = "time::serde::rfc3339::option")]
    pub expiration_time: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub creation_time: OffsetDateTime,
    pub sequence: u64,
}

impl CookieEntry {
    /// An entry whose expiry is at or before `now` is logically gone; the
    /// table guarantees no read ever observes one.
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        match self.expiration_time {
            Some(expiry) => expiry <= now,
            None => false,
        }
    }

    /// Identity comparison on the (name, domain, path) tuple.
    pub fn key_matches(&self, name: &str, domain: &str, path: &str) -> bool {
        self.name == name && self.domain == domain && self.path == path
    }

    pub fn same_key(&self, other: &CookieEntry) -> bool {
        self.key_matches(&other.name, &other.domain, &other.path)
    }
}

/// Expiration input as accepted on write, before normalization.
///
/// Resolved exactly once at the `expires` boundary; downstream components
/// only ever see the canonical `Option<OffsetDateTime>`.
#[derive(Debug, Clone, PartialEq)]
pub enum Expires {
    /// An absolute instant.
    At(OffsetDateTime),
    /// Milliseconds since the Unix epoch.
    UnixMillis(i64),
    /// An HTTP date string (`Mon, 07 Jun 2021 07:07:07 GMT`).
    HttpDate(String),
}

/// Attribute bag recognized on write and delete.
///
/// Defaults match script-visible cookie semantics: path `/`, host-only
/// domain, session lifetime, not secure.
#[derive(Debug, Clone, PartialEq)]
pub struct CookieAttributes {
    pub path: String,
    /// `None` means host-only: the cookie is scoped to the exact origin host.
    pub domain: Option<String>,
    /// `None` means session: the cookie dies with the store.
    pub expires: Option<Expires>,
    pub secure: bool,
}

impl Default for CookieAttributes {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            domain: None,
            expires: None,
            secure: false,
        }
    }
}

impl CookieAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn expires(mut self, expires: Expires) -> Self {
        self.expires = Some(expires);
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }
}

/// A complete write request: name, value, and attributes in one value.
///
/// The bundled form of `set`, for callers that build the request up front.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SetCookie {
    pub name: String,
    pub value: String,
    pub attributes: CookieAttributes,
}

impl SetCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            attributes: CookieAttributes::default(),
        }
    }

    pub fn attributes(mut self, attributes: CookieAttributes) -> Self {
        self.attributes = attributes;
        self
    }
}
