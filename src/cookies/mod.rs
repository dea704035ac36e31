//! Cookie records, write attributes, and validation.
//!
//! This module owns everything about a single cookie before it reaches the
//! table:
//!
//! - **Record**: the stored cookie representation ([`CookieEntry`](entry::CookieEntry))
//! - **Attributes**: the write/delete attribute bag ([`CookieAttributes`](entry::CookieAttributes))
//! - **Validation**: name/value/prefix legality checks ([`validate`])
//! - **Expiration**: normalization of heterogeneous expiry inputs ([`expires`])
//! - **Domain safety**: public-suffix checks for explicit domains ([`psl`])
//!
//! Validation and expiration resolution are pure; they run before any
//! table mutation so a rejected write can never partially apply.

pub mod entry;
pub mod expires;
pub mod psl;
pub mod validate;

pub use entry::{CookieAttributes, CookieEntry, Expires, SetCookie};
