use crate::cookies::entry::CookieEntry;
use url::Url;

/// Direction of a visibility transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeType {
    /// Creation, value modification, or appearance to the observed scope.
    Visible,
    /// Deletion, expiration, or disappearance from the observed scope.
    Hidden,
}

/// One visibility transition as seen through a single interest.
///
/// Constructed by the notifier immediately after a table mutation and
/// consumed once by delivery. `all` carries the full visible set at the
/// event's scope so observers can disambiguate same-named cookies with
/// differing scope without keeping a shadow jar.
#[derive(Debug, Clone)]
pub struct CookieChange {
    pub change_type: ChangeType,
    /// The scope that made the entry visible or hidden, taken from the
    /// matching interest (the store scope when the interest had none).
    pub url: Url,
    pub name: String,
    /// Present for `Visible`; `None` for `Hidden`.
    pub value: Option<String>,
    /// Full visible set at `url` at the time of the event.
    pub all: Vec<CookieEntry>,
}

impl CookieChange {
    pub fn is_visible(&self) -> bool {
        self.change_type == ChangeType::Visible
    }

    pub fn is_hidden(&self) -> bool {
        self.change_type == ChangeType::Hidden
    }
}
