//! The store service: the public boundary callers drive.
//!
//! `CookieStore` is the single logical owner of the cookie table. Writes
//! flow validation → expiration resolution → table mutation → change
//! notification; reads flow matcher → table. Mutations are serialized
//! under the table lock with no suspension points inside the critical
//! section, so every `set`/`delete` is atomic with respect to reads.

use crate::base::error::StoreError;
use crate::cookies::entry::{CookieAttributes, CookieEntry, SetCookie};
use crate::cookies::{expires, validate};
use crate::observe::notifier::{ChangeNotifier, Subscription};
use crate::store::matcher::{self, CookieQuery};
use crate::store::table::CookieTable;
use std::sync::{Arc, Mutex};
use time::OffsetDateTime;
use url::Url;

/// A per-origin, script-visible cookie store with change observation.
///
/// The store is scoped to the URL it is constructed with: queries and
/// interests that carry no URL of their own are evaluated there, host-only
/// cookies bind to its host, and its scheme decides whether this is a
/// secure origin (which the `__Secure-`/`__Host-` prefixes require).
///
/// # Example
///
/// ```rust,no_run
/// use cookiestore::store::service::CookieStore;
/// use url::Url;
///
/// # async fn demo() -> Result<(), cookiestore::base::StoreError> {
/// let store = CookieStore::new(Url::parse("https://example.com/").unwrap())?;
/// store.set("SID", "31d4d96e407aad42").await?;
/// let cookie = store.get("SID").await;
/// assert_eq!(cookie.unwrap().value, "31d4d96e407aad42");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CookieStore {
    scope: Url,
    secure_origin: bool,
    table: Mutex<CookieTable>,
    notifier: Arc<ChangeNotifier>,
}

impl CookieStore {
    /// Create a store scoped to `scope`. The URL must have a host.
    pub fn new(scope: Url) -> Result<Self, StoreError> {
        if scope.host_str().is_none() {
            return Err(StoreError::InvalidScope);
        }
        let secure_origin = scope.scheme() == "https";
        Ok(Self {
            scope,
            secure_origin,
            table: Mutex::new(CookieTable::new()),
            notifier: Arc::new(ChangeNotifier::new()),
        })
    }

    /// The store's default scope URL.
    pub fn scope(&self) -> &Url {
        &self.scope
    }

    fn host(&self) -> &str {
        self.scope.host_str().unwrap_or("")
    }

    /// First cookie exactly matching `name`, in match order (longest path,
    /// then insertion order).
    pub async fn get(&self, name: &str) -> Option<CookieEntry> {
        self.get_matching(&CookieQuery::named(name)).await
    }

    /// First cookie matching an arbitrary query.
    pub async fn get_matching(&self, query: &CookieQuery) -> Option<CookieEntry> {
        self.get_all_matching(query).await.into_iter().next()
    }

    /// Every cookie visible at the default scope.
    pub async fn get_all(&self) -> Vec<CookieEntry> {
        self.get_all_matching(&CookieQuery::all()).await
    }

    /// Every cookie matching `query`, scope-restricted and ordered.
    ///
    /// Reads never return logically-expired entries: the sweep runs first,
    /// and entries it drops are reported to observers as hidden.
    pub async fn get_all_matching(&self, query: &CookieQuery) -> Vec<CookieEntry> {
        let now = OffsetDateTime::now_utc();
        let (result, swept) = {
            let mut table = self.table.lock().unwrap();
            let before = table.snapshot();
            let swept = table.sweep_expired(now);
            let result = matcher::match_entries(table.entries(), query, &self.scope);
            if swept > 0 {
                self.notifier
                    .publish(&before, table.entries(), &self.scope);
            }
            (result, swept)
        };
        if swept > 0 {
            tracing::debug!(swept, "expired cookies dropped during read");
        }
        result
    }

    /// Set a cookie with default attributes (path `/`, host-only, session,
    /// not secure).
    pub async fn set(&self, name: &str, value: &str) -> Result<(), StoreError> {
        self.set_with(name, value, &CookieAttributes::default())
            .await
    }

    /// The bundled-request form of `set`.
    pub async fn set_cookie(&self, cookie: &SetCookie) -> Result<(), StoreError> {
        self.set_with(&cookie.name, &cookie.value, &cookie.attributes)
            .await
    }

    /// Validate, resolve expiration, and upsert one cookie.
    ///
    /// Validation failures surface before anything is applied; the table
    /// is unchanged on error. A write whose expiry is already past acts as
    /// a delete of the matching entry.
    pub async fn set_with(
        &self,
        name: &str,
        value: &str,
        attrs: &CookieAttributes,
    ) -> Result<(), StoreError> {
        validate::validate(name, value, attrs, self.host(), self.secure_origin)?;
        let expiration_time = expires::resolve(attrs.expires.as_ref())?;

        let now = OffsetDateTime::now_utc();
        let (domain, host_only) = self.resolve_domain(attrs);
        let entry = CookieEntry {
            name: name.to_string(),
            value: value.to_string(),
            domain,
            host_only,
            path: attrs.path.clone(),
            secure: attrs.secure,
            expiration_time,
            creation_time: now,
            sequence: 0, // assigned by the table
        };

        {
            let mut table = self.table.lock().unwrap();
            let before = table.snapshot();
            table.sweep_expired(now);
            table.set(entry, now);
            self.notifier
                .publish(&before, table.entries(), &self.scope);
        }
        tracing::debug!(name = %name, session = expiration_time.is_none(), "cookie set");
        Ok(())
    }

    /// Delete the cookie with default attributes. No-op when absent.
    pub async fn delete(&self, name: &str) {
        self.delete_with(name, &CookieAttributes::default()).await
    }

    /// Delete the cookie identified by `name` and the attribute key
    /// (domain, path, secure flag). No-op when absent; absence is not an
    /// error.
    pub async fn delete_with(&self, name: &str, attrs: &CookieAttributes) {
        let now = OffsetDateTime::now_utc();
        let (domain, _) = self.resolve_domain(attrs);
        let removed = {
            let mut table = self.table.lock().unwrap();
            let before = table.snapshot();
            table.sweep_expired(now);
            let removed = table.delete(name, &domain, &attrs.path, attrs.secure);
            self.notifier
                .publish(&before, table.entries(), &self.scope);
            removed.is_some()
        };
        tracing::debug!(name = %name, removed, "cookie delete");
    }

    /// Register an observer. An empty interest list means the default
    /// interest (all script-visible changes at the store scope). The
    /// subscription's first batch is the initial snapshot, delivered even
    /// when empty; change batches are dispatched from spawned tasks, so
    /// mutations must happen inside a tokio runtime.
    pub fn observe(&self, interests: Vec<CookieQuery>) -> Subscription {
        let now = OffsetDateTime::now_utc();
        let mut table = self.table.lock().unwrap();
        let before = table.snapshot();
        if table.sweep_expired(now) > 0 {
            self.notifier
                .publish(&before, table.entries(), &self.scope);
        }
        self.notifier
            .subscribe(interests, table.entries(), &self.scope)
    }

    /// Remove a registration. Idempotent; scheduled-but-unexecuted
    /// deliveries are suppressed, already-delivered batches stay readable.
    pub fn unsubscribe(&self, subscription: &Subscription) {
        self.notifier.unsubscribe(subscription.id());
    }

    /// Explicit domain (lowercased, leading dot dropped) or the host-only
    /// origin host.
    fn resolve_domain(&self, attrs: &CookieAttributes) -> (String, bool) {
        match &attrs.domain {
            Some(domain) => (
                domain.trim_start_matches('.').to_lowercase(),
                false,
            ),
            None => (self.host().to_lowercase(), true),
        }
    }
}
