use thiserror::Error;

/// Errors surfaced by cookie store operations.
///
/// All variants are synchronous validation failures raised by `set` before
/// any mutation takes place; a failed write leaves the table untouched.
/// Absence is never an error: `delete` on a missing cookie and queries with
/// no matches report success with an empty result instead.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum StoreError {
    /// Cookie name contains `=`, `;`, or a control character.
    #[error("Invalid cookie name")]
    InvalidName,

    /// Cookie value contains `;` or a control character, or an empty-named
    /// cookie carries `=` in its value (indistinguishable from a
    /// name=value pair).
    #[error("Invalid cookie value")]
    InvalidValue,

    /// A `__Secure-` or `__Host-` cookie does not meet its prefix
    /// requirements (Secure attribute, secure origin, and for `__Host-`
    /// additionally host-only domain and path `/`).
    #[error("Cookie name prefix requirements not met")]
    PrefixViolation,

    /// The expiry string did not parse as an HTTP date, or a millisecond
    /// timestamp was out of range.
    #[error("Malformed expiry: {input}")]
    MalformedExpiry { input: String },

    /// The requested cookie domain is a public suffix or does not cover
    /// the store's host.
    #[error("Invalid cookie domain: {domain}")]
    InvalidDomain { domain: String },

    /// The scope URL has no usable host.
    #[error("Invalid scope URL")]
    InvalidScope,
}

impl StoreError {
    /// Create a malformed-expiry error, capturing the offending input.
    pub fn malformed_expiry(input: impl Into<String>) -> Self {
        StoreError::MalformedExpiry {
            input: input.into(),
        }
    }

    /// Create an invalid-domain error.
    pub fn invalid_domain(domain: impl Into<String>) -> Self {
        StoreError::InvalidDomain {
            domain: domain.into(),
        }
    }
}
