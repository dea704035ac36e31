//! # cookiestore
//!
//! An observable, script-visible cookie store for Rust.
//!
//! `cookiestore` implements the contract of the asynchronous Cookie Store
//! API: a per-origin cookie table with scoped, matching-based reads,
//! security-prefix-aware write validation, expiration policy across
//! multiple input encodings, and a filtered multi-subscriber
//! change-notification mechanism with an initial-snapshot guarantee.
//!
//! ## Features
//!
//! - **Scoped queries**: RFC 6265 domain/path/secure matching with
//!   deterministic ordering (longest path, then insertion order)
//! - **Prefix policy**: `__Secure-` and `__Host-` rules enforced on write,
//!   including the secure-origin requirement
//! - **Expiration**: absolute instants, milliseconds since epoch, or HTTP
//!   date strings, normalized once at the boundary; expired entries are
//!   swept before every read and write
//! - **Observation**: per-observer interest lists, batched asynchronous
//!   delivery, initial snapshot on subscription
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cookiestore::store::service::CookieStore;
//! use url::Url;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = CookieStore::new(Url::parse("https://example.com/").unwrap()).unwrap();
//!     let mut sub = store.observe(Vec::new());
//!     store.set("SID", "31d4d96e407aad42").await.unwrap();
//!     // First batch is the initial snapshot, then one batch per change.
//!     let snapshot = sub.next_batch().await.unwrap();
//!     println!("{} cookies visible at subscription", snapshot.len());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error taxonomy
//! - [`cookies`] - Cookie records, attributes, validation, expiration
//! - [`store`] - Table, matcher, and the public store service
//! - [`observe`] - Change events, subscriptions, and dispatch
//!
//! ## Scope
//!
//! The store is in-process only: no `Set-Cookie` header parsing or
//! emission, no persistence format, no cross-process synchronization.

pub mod base;
pub mod cookies;
pub mod observe;
pub mod store;
