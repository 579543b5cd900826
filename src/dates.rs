//! Canonical date handling.
//!
//! The store may hand back date-like columns either as typed dates or as
//! pre-formatted strings, depending on how the row was last written. All
//! comparison and display goes through the canonical `DD-MM-YYYY` string
//! form produced here; raw representations are never compared directly.

use chrono::NaiveDate;

use crate::constants::CANONICAL_DATE_FORMAT;

/// Format a date into the canonical `DD-MM-YYYY` wire form.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(CANONICAL_DATE_FORMAT).to_string()
}

/// Parse a canonical `DD-MM-YYYY` string. Returns `None` for anything else,
/// including calendar-invalid dates.
#[must_use]
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), CANONICAL_DATE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_zero_padded() {
        let d = NaiveDate::from_ymd_opt(2029, 7, 20).unwrap();
        assert_eq!(format_date(d), "20-07-2029");
        let d = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        assert_eq!(format_date(d), "01-01-2030");
    }

    #[test]
    fn parse_trims_whitespace() {
        assert_eq!(
            parse_date("  20-07-2029 "),
            NaiveDate::from_ymd_opt(2029, 7, 20)
        );
    }

    #[test]
    fn rejects_iso_and_garbage() {
        assert_eq!(parse_date("2029-07-20"), None);
        assert_eq!(parse_date("31-02-2024"), None);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date(""), None);
    }

    /// Format → parse must return the same calendar date for arbitrary
    /// valid day/month/year triples.
    #[test]
    fn round_trip_random_dates() {
        for _ in 0..500 {
            let year = fastrand::i32(1950..2100);
            let month = fastrand::u32(1..=12);
            let day = fastrand::u32(1..=28);
            let date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
            let wire = format_date(date);
            assert_eq!(parse_date(&wire), Some(date), "round trip failed for {wire}");
        }
    }
}
