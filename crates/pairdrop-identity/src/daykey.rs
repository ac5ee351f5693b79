// SPDX-FileCopyrightText: 2026 Pairdrop Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Calendar day keys, granularity = one day.
//!
//! All daily-cap and idempotency logic is keyed off this value. The key uses
//! the client's local timezone with no normalization, so clients in different
//! timezones see different "days" for the same instant. Known limitation,
//! deliberately not corrected.

use chrono::{DateTime, Local, NaiveDate};

/// Today's key in the local timezone, `YYYY-MM-DD`.
pub fn today_key() -> String {
    day_key(Local::now())
}

/// The day key for an arbitrary local instant. Tests use this to pin dates.
pub fn day_key(at: DateTime<Local>) -> String {
    at.date_naive().to_string()
}

/// The day key for a plain date.
pub fn day_key_for_date(date: NaiveDate) -> String {
    date.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn key_is_iso_date() {
        let key = today_key();
        assert_eq!(key.len(), 10);
        assert_eq!(&key[4..5], "-");
        assert_eq!(&key[7..8], "-");
    }

    #[test]
    fn pinned_instant_maps_to_its_calendar_date() {
        let at = Local.with_ymd_and_hms(2026, 3, 14, 23, 59, 59).unwrap();
        assert_eq!(day_key(at), "2026-03-14");
    }

    #[test]
    fn consecutive_dates_produce_distinct_keys() {
        let d1 = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        assert_ne!(day_key_for_date(d1), day_key_for_date(d2));
    }
}
