//! Public Suffix List checks for explicit cookie domains.
//!
//! A write that names a domain must not target a public suffix (`com`,
//! `co.uk`, ...) — that would create a supercookie visible across every
//! registrable domain under it — and must cover the store's own host.
//! Uses Mozilla's Public Suffix List via the `psl` crate.

use psl::{List, Psl};

/// True if `domain` itself is a public suffix.
pub fn is_public_suffix(domain: &str) -> bool {
    let lower = domain.to_lowercase();
    match List.suffix(lower.as_bytes()) {
        Some(suffix) => suffix.as_bytes() == lower.as_bytes(),
        // Unknown TLDs are not treated as suffixes; the host-match check
        // still constrains them.
        None => false,
    }
}

/// True if `domain` covers `host`: equal to it, or a parent whose suffix
/// match lands on a label boundary.
pub fn domain_covers_host(domain: &str, host: &str) -> bool {
    let domain = domain.strip_prefix('.').unwrap_or(domain).to_lowercase();
    let host = host.to_lowercase();

    if host == domain {
        return true;
    }
    host.ends_with(&domain)
        && host.as_bytes().get(host.len() - domain.len() - 1) == Some(&b'.')
}

/// Combined write-domain check: not a public suffix, and covers the host.
pub fn valid_for_host(domain: &str, host: &str) -> bool {
    let trimmed = domain.strip_prefix('.').unwrap_or(domain);
    !is_public_suffix(trimmed) && domain_covers_host(trimmed, host)
}
