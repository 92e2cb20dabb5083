//! Expiry status classification for a single compliance record.
//!
//! The warning window is inclusive on both ends: a record expiring exactly
//! on the reference date is still a warning, not a violation; a record
//! expiring exactly at `reference + window` days is the last warning day.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Classification of one expiry date against a reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpiryStatus {
    /// No expiry, or expiry beyond the warning window.
    Valid,
    /// Expiry falls inside `[reference, reference + window]`.
    Warning,
    /// Expiry precedes the reference date.
    Illegal,
}

/// Classify an optional expiry date.
///
/// `None` means the record never expires and is always `Valid`.
pub fn evaluate_expiry(
    expires_on: Option<NaiveDate>,
    warning_window_days: u32,
    reference: NaiveDate,
) -> ExpiryStatus {
    let Some(expires_on) = expires_on else {
        return ExpiryStatus::Valid;
    };

    if expires_on < reference {
        return ExpiryStatus::Illegal;
    }

    let window_end = reference
        .checked_add_days(Days::new(u64::from(warning_window_days)))
        .unwrap_or(NaiveDate::MAX);

    if expires_on <= window_end {
        ExpiryStatus::Warning
    } else {
        ExpiryStatus::Valid
    }
}
