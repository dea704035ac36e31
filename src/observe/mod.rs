//! Change observation: filtered, batched notification of cookie
//! visibility transitions.
//!
//! - **Events**: [`CookieChange`](change::CookieChange) with its
//!   [`ChangeType`](change::ChangeType)
//! - **Dispatch**: [`ChangeNotifier`](notifier::ChangeNotifier), the
//!   subscription registry and diff engine
//! - **Handles**: [`Subscription`](notifier::Subscription), the receiving
//!   end held by an observer
//!
//! Observers register interest lists (the [`CookieQuery`] shape); each
//! mutation is diffed against every registration and delivered
//! asynchronously in per-turn batches, starting with an initial snapshot
//! of the visible set.
//!
//! [`CookieQuery`]: crate::store::matcher::CookieQuery

pub mod change;
pub mod notifier;

pub use change::{ChangeType, CookieChange};
pub use notifier::{ChangeNotifier, Subscription};
