//! Expiration input normalization.
//!
//! Writes may carry an absolute instant, a milliseconds-since-epoch count,
//! or an HTTP date string; absence means a session cookie. All of them are
//! resolved here into a single `Option<OffsetDateTime>` so nothing past
//! this boundary branches on the original encoding.

use crate::base::error::StoreError;
use crate::cookies::entry::Expires;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

/// IMF-fixdate, the `Expires` format HTTP has used since RFC 1123:
/// `Mon, 07 Jun 2021 07:07:07 GMT`.
const HTTP_DATE: &[BorrowedFormatItem<'static>] = format_description!(
    "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
);

/// Resolve an expiration input into a canonical instant, or `None` for a
/// session cookie.
///
/// An instant at or before "now" resolves normally; the table turns such a
/// write into an immediate delete of any matching entry.
pub fn resolve(input: Option<&Expires>) -> Result<Option<OffsetDateTime>, StoreError> {
    match input {
        None => Ok(None),
        Some(Expires::At(instant)) => Ok(Some(*instant)),
        Some(Expires::UnixMillis(ms)) => {
            let nanos = i128::from(*ms) * 1_000_000;
            OffsetDateTime::from_unix_timestamp_nanos(nanos)
                .map(Some)
                .map_err(|_| StoreError::malformed_expiry(ms.to_string()))
        }
        Some(Expires::HttpDate(s)) => parse_http_date(s).map(Some),
    }
}

/// Parse an HTTP date string. The weekday is parsed but not cross-checked
/// against the date, matching common `Expires` handling.
pub fn parse_http_date(input: &str) -> Result<OffsetDateTime, StoreError> {
    PrimitiveDateTime::parse(input.trim(), HTTP_DATE)
        .map(|dt| dt.assume_utc())
        .map_err(|_| StoreError::malformed_expiry(input))
}
