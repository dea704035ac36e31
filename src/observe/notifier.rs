//! Subscription registry and filtered change dispatch.
//!
//! Every mutation hands the notifier a before/after snapshot of the table.
//! For each registered observer the notifier replays the matcher over both
//! snapshots per interest and turns visibility transitions into
//! [`CookieChange`] events. Delivery is asynchronous with respect to the
//! mutating call: events accumulate in a per-observer pending batch and a
//! spawned flush task sends whatever landed in the same delivery turn as
//! one batch.

use crate::cookies::entry::CookieEntry;
use crate::observe::change::{ChangeType, CookieChange};
use crate::store::matcher::{self, CookieQuery};
use dashmap::DashMap;
use std::collections::HashSet;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use url::Url;

/// Multi-subscriber change fan-out with per-observer interest filtering.
///
/// An explicit registry keyed by subscription id; there is no ambient
/// dispatch. The store owns one notifier and passes it every mutation
/// diff.
#[derive(Debug, Default)]
pub struct ChangeNotifier {
    subscribers: DashMap<u64, Subscriber>,
    next_id: AtomicU64,
}

#[derive(Debug)]
struct Subscriber {
    interests: Vec<CookieQuery>,
    tx: mpsc::UnboundedSender<Vec<CookieChange>>,
    pending: Mutex<Pending>,
}

#[derive(Debug, Default)]
struct Pending {
    events: Vec<CookieChange>,
    flush_scheduled: bool,
}

/// An observer's handle: receives batches of changes matching its
/// interests, starting with the initial snapshot.
///
/// Dropping the handle only closes the receiving end; registration is
/// removed explicitly via `CookieStore::unsubscribe`.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<Vec<CookieChange>>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Receive the next delivered batch. Returns `None` once unsubscribed
    /// and all previously delivered batches have been drained.
    pub async fn next_batch(&mut self) -> Option<Vec<CookieChange>> {
        self.rx.recv().await
    }
}

impl futures::Stream for Subscription {
    type Item = Vec<CookieChange>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer. An empty interest list means the default
    /// interest: all script-visible changes at the store scope.
    ///
    /// The initial snapshot — the currently visible set per interest as
    /// `Visible` events — is queued as the subscription's first batch
    /// before any subsequent change can reach it. An empty snapshot is
    /// still delivered: "no visible cookies yet" is a meaningful first
    /// callback, not an omission.
    pub fn subscribe(
        self: &Arc<Self>,
        mut interests: Vec<CookieQuery>,
        entries: &[CookieEntry],
        scope: &Url,
    ) -> Subscription {
        if interests.is_empty() {
            interests.push(CookieQuery::all());
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();

        let snapshot = snapshot_events(&interests, entries, scope);
        tracing::debug!(
            id,
            interests = interests.len(),
            visible = snapshot.len(),
            "observer registered"
        );
        let _ = tx.send(snapshot);

        self.subscribers.insert(
            id,
            Subscriber {
                interests,
                tx,
                pending: Mutex::new(Pending::default()),
            },
        );

        Subscription { id, rx }
    }

    /// Remove a registration. Idempotent: unknown ids are ignored. A flush
    /// scheduled but not yet executed finds no registry entry and delivers
    /// nothing; batches already in the observer's queue stay readable.
    pub fn unsubscribe(&self, id: u64) {
        if self.subscribers.remove(&id).is_some() {
            tracing::debug!(id, "observer unregistered");
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Diff a mutation against every registration and schedule deliveries.
    pub fn publish(
        self: &Arc<Self>,
        before: &[CookieEntry],
        after: &[CookieEntry],
        scope: &Url,
    ) {
        if self.subscribers.is_empty() {
            return;
        }

        let ids: Vec<u64> = self.subscribers.iter().map(|e| *e.key()).collect();
        for id in ids {
            let mut needs_flush = false;
            if let Some(sub) = self.subscribers.get(&id) {
                let events = diff_events(&sub.interests, before, after, scope);
                if events.is_empty() {
                    continue;
                }
                tracing::debug!(id, events = events.len(), "queueing change events");
                let mut pending = sub.pending.lock().unwrap();
                pending.events.extend(events);
                if !pending.flush_scheduled {
                    pending.flush_scheduled = true;
                    needs_flush = true;
                }
            }
            if needs_flush {
                self.schedule_flush(id);
            }
        }
    }

    /// Delivery happens on a later turn than the mutation that caused it.
    fn schedule_flush(self: &Arc<Self>, id: u64) {
        let notifier = Arc::clone(self);
        tokio::spawn(async move {
            notifier.flush(id);
        });
    }

    fn flush(&self, id: u64) {
        let Some(sub) = self.subscribers.get(&id) else {
            // Unsubscribed between scheduling and execution; suppress.
            return;
        };
        // The send happens under the pending lock so batches reach the
        // queue in mutation order even if two flush tasks race.
        let mut pending = sub.pending.lock().unwrap();
        pending.flush_scheduled = false;
        if pending.events.is_empty() {
            return;
        }
        let batch = std::mem::take(&mut pending.events);
        let _ = sub.tx.send(batch);
    }
}

type EventKey = (ChangeType, String, String, String);

fn event_key(change_type: ChangeType, entry: &CookieEntry) -> EventKey {
    (
        change_type,
        entry.name.clone(),
        entry.domain.clone(),
        entry.path.clone(),
    )
}

/// Visibility transitions between two entry sets, seen through an interest
/// list. A change matching several interests is reported once; the first
/// matching interest supplies the event URL.
fn diff_events(
    interests: &[CookieQuery],
    before: &[CookieEntry],
    after: &[CookieEntry],
    scope: &Url,
) -> Vec<CookieChange> {
    let mut events = Vec::new();
    let mut seen: HashSet<EventKey> = HashSet::new();

    for interest in interests {
        let url = interest.url.clone().unwrap_or_else(|| scope.clone());
        let was = matcher::match_entries(before, interest, scope);
        let now = matcher::match_entries(after, interest, scope);
        // Full visible set at this interest's scope, name filter dropped.
        let all = matcher::match_entries(after, &interest.unnamed(), scope);

        for entry in &now {
            let prior = was.iter().find(|p| p.same_key(entry));
            let appeared = match prior {
                None => true,
                Some(p) => p.value != entry.value,
            };
            if appeared && seen.insert(event_key(ChangeType::Visible, entry)) {
                events.push(CookieChange {
                    change_type: ChangeType::Visible,
                    url: url.clone(),
                    name: entry.name.clone(),
                    value: Some(entry.value.clone()),
                    all: all.clone(),
                });
            }
        }

        for entry in &was {
            let gone = !now.iter().any(|e| e.same_key(entry));
            if gone && seen.insert(event_key(ChangeType::Hidden, entry)) {
                events.push(CookieChange {
                    change_type: ChangeType::Hidden,
                    url: url.clone(),
                    name: entry.name.clone(),
                    value: None,
                    all: all.clone(),
                });
            }
        }
    }

    events
}

/// The initial snapshot: everything currently visible per interest, as
/// `Visible` events.
fn snapshot_events(
    interests: &[CookieQuery],
    entries: &[CookieEntry],
    scope: &Url,
) -> Vec<CookieChange> {
    diff_events(interests, &[], entries, scope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn entry(name: &str, value: &str, path: &str, sequence: u64) -> CookieEntry {
        CookieEntry {
            name: name.to_string(),
            value: value.to_string(),
            domain: "example.com".to_string(),
            host_only: true,
            path: path.to_string(),
            secure: false,
            expiration_time: None,
            creation_time: OffsetDateTime::UNIX_EPOCH,
            sequence,
        }
    }

    fn scope() -> Url {
        Url::parse("https://example.com/").unwrap()
    }

    #[test]
    fn test_diff_reports_appearance_and_value_change() {
        let interests = vec![CookieQuery::all()];
        let a = entry("a", "1", "/", 0);
        let a_changed = entry("a", "2", "/", 0);
        let b = entry("b", "1", "/", 1);

        let events = diff_events(&interests, &[a.clone()], &[a.clone(), b], &scope());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "b");
        assert!(events[0].is_visible());

        let events = diff_events(&interests, &[a], &[a_changed], &scope());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].value.as_deref(), Some("2"));
    }

    #[test]
    fn test_diff_reports_disappearance_without_value() {
        let interests = vec![CookieQuery::all()];
        let a = entry("a", "1", "/", 0);

        let events = diff_events(&interests, &[a], &[], &scope());
        assert_eq!(events.len(), 1);
        assert!(events[0].is_hidden());
        assert!(events[0].value.is_none());
        assert!(events[0].all.is_empty());
    }

    #[test]
    fn test_untouched_interest_stays_silent() {
        let interests = vec![CookieQuery::named("OTHER")];
        let a = entry("a", "1", "/", 0);

        let events = diff_events(&interests, &[], &[a], &scope());
        assert!(events.is_empty());
    }

    #[test]
    fn test_overlapping_interests_deliver_once() {
        let interests = vec![
            CookieQuery::named("SID"),
            CookieQuery::name_starts_with("SI"),
            CookieQuery::all(),
        ];
        let a = entry("SID", "1", "/", 0);

        let events = diff_events(&interests, &[], &[a], &scope());
        assert_eq!(events.len(), 1);
        // First matching interest supplies the URL (store scope here).
        assert_eq!(events[0].url, scope());
    }

    #[test]
    fn test_snapshot_lists_current_entries() {
        let entries = vec![entry("a", "1", "/", 0), entry("b", "2", "/", 1)];
        let events = snapshot_events(&[CookieQuery::all()], &entries, &scope());
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.is_visible()));
        assert!(events.iter().all(|e| e.all.len() == 2));
    }
}
