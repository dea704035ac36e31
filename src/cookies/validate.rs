//! Write-request validation.
//!
//! Pure checks, run before the table is touched so a rejected request can
//! never partially apply:
//!
//! - name/value character legality
//! - the empty-name ambiguity rule (`=` in the value of a nameless cookie)
//! - `__Secure-` / `__Host-` prefix policy, including the secure-origin
//!   requirement
//! - explicit-domain safety (public suffixes, host coverage)

use crate::base::error::StoreError;
use crate::cookies::entry::CookieAttributes;
use crate::cookies::psl;

/// Reserved prefix: requires the Secure attribute on a secure origin.
pub const SECURE_PREFIX: &str = "__Secure-";

/// Reserved prefix: additionally requires host-only domain and path `/`.
pub const HOST_PREFIX: &str = "__Host-";

/// Validate a single write request against the store's origin.
///
/// `host` is the store's origin host; `secure_origin` is whether the store
/// scope is https. Returns the first violation found; checks nothing else
/// and mutates nothing.
pub fn validate(
    name: &str,
    value: &str,
    attrs: &CookieAttributes,
    host: &str,
    secure_origin: bool,
) -> Result<(), StoreError> {
    if name.chars().any(|c| c == '=' || c == ';' || c.is_control()) {
        return Err(StoreError::InvalidName);
    }

    if value.chars().any(|c| c == ';' || c.is_control()) {
        return Err(StoreError::InvalidValue);
    }

    // A nameless cookie whose value contains '=' would serialize
    // identically to a name=value pair.
    if name.is_empty() && value.contains('=') {
        return Err(StoreError::InvalidValue);
    }

    if name.starts_with(SECURE_PREFIX) && !(attrs.secure && secure_origin) {
        return Err(StoreError::PrefixViolation);
    }

    if name.starts_with(HOST_PREFIX) {
        let host_only = attrs.domain.is_none();
        if !attrs.secure || !secure_origin || !host_only || attrs.path != "/" {
            return Err(StoreError::PrefixViolation);
        }
    }

    if let Some(domain) = &attrs.domain {
        if !psl::valid_for_host(domain, host) {
            return Err(StoreError::invalid_domain(domain.clone()));
        }
    }

    Ok(())
}
