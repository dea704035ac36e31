//! The authoritative cookie table.
//!
//! Owns every entry and enforces the two table invariants: (name, domain,
//! path) is unique, and no entry whose expiry is at or before now survives
//! a sweep. The table is a plain single-owner structure; the service
//! serializes access and hands the notifier before/after snapshots of each
//! mutation.

use crate::cookies::entry::CookieEntry;
use time::OffsetDateTime;

#[derive(Debug, Default)]
pub struct CookieTable {
    entries: Vec<CookieEntry>,
    next_sequence: u64,
}

impl CookieTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only view for the matcher and the notifier.
    pub fn entries(&self) -> &[CookieEntry] {
        &self.entries
    }

    /// Owned copy of the current entry set, used as a mutation diff
    /// endpoint.
    pub fn snapshot(&self) -> Vec<CookieEntry> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Upsert by (name, domain, path).
    ///
    /// A write whose resolved expiry is already past acts as an immediate
    /// delete: any matching entry is removed and nothing is retained.
    /// Replacement keeps the original creation time and sequence number,
    /// so re-setting a cookie does not move it in insertion order.
    /// Returns the replaced or removed entry.
    pub fn set(&mut self, mut entry: CookieEntry, now: OffsetDateTime) -> Option<CookieEntry> {
        let existing = match self.entries.iter().position(|e| e.same_key(&entry)) {
            Some(idx) => Some(self.entries.remove(idx)),
            None => None,
        };

        if entry.is_expired(now) {
            return existing;
        }

        match &existing {
            Some(old) => {
                entry.creation_time = old.creation_time;
                entry.sequence = old.sequence;
            }
            None => {
                entry.sequence = self.next_sequence;
                self.next_sequence += 1;
            }
        }
        self.entries.push(entry);
        existing
    }

    /// Remove the entry matching (name, domain, path) and the secure flag.
    /// Absence is not an error; returns the removed entry if there was one.
    pub fn delete(
        &mut self,
        name: &str,
        domain: &str,
        path: &str,
        secure: bool,
    ) -> Option<CookieEntry> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.key_matches(name, domain, path) && e.secure == secure)?;
        Some(self.entries.remove(idx))
    }

    /// Drop every entry whose expiry is at or before `now`. Runs before
    /// every read and write so no read ever observes a logically-expired
    /// entry. Returns how many entries were dropped.
    pub fn sweep_expired(&mut self, now: OffsetDateTime) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !e.is_expired(now));
        before - self.entries.len()
    }
}
