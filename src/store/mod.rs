//! Storage and query evaluation.
//!
//! - **Table**: the authoritative entry set ([`CookieTable`](table::CookieTable))
//! - **Matcher**: scope/name query evaluation ([`matcher`])
//! - **Service**: the public store boundary ([`CookieStore`](service::CookieStore))
//!
//! The table is a plain single-owner structure; [`CookieStore`] serializes
//! every mutation under one lock and feeds before/after snapshots to the
//! change notifier.
//!
//! [`CookieStore`]: service::CookieStore

pub mod matcher;
pub mod service;
pub mod table;

pub use matcher::{CookieQuery, MatchType};
pub use service::CookieStore;
pub use table::CookieTable;
