//! Expiry presentation helpers.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Listings expiring within this many hours are flagged.
pub const EXPIRING_SOON_HOURS: i64 = 24;

/// Combine the separate expiry date and time fields.
///
/// A missing time means midnight. Times may carry seconds.
pub fn parse_expiry(date: Option<&str>, time: Option<&str>) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(date?.trim(), "%Y-%m-%d").ok()?;
    let time = match time.map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) => NaiveTime::parse_from_str(t, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M:%S"))
            .ok()?,
        None => NaiveTime::MIN,
    };
    Some(date.and_time(time))
}

/// Human-readable expiry. Unparsable input is shown as entered.
pub fn format_expiry(date: Option<&str>, time: Option<&str>) -> String {
    let Some(raw_date) = date.filter(|d| !d.trim().is_empty()) else {
        return "No expiry date".to_string();
    };
    let raw_time = time.filter(|t| !t.trim().is_empty());

    match parse_expiry(Some(raw_date), raw_time) {
        Some(at) if raw_time.is_some() => at.format("%Y-%m-%d %H:%M").to_string(),
        Some(at) => at.format("%Y-%m-%d").to_string(),
        None => match raw_time {
            Some(t) => format!("{} {}", raw_date, t),
            None => raw_date.to_string(),
        },
    }
}

/// True when the expiry lies in the future but no more than a day away.
pub fn is_expiring_soon(date: Option<&str>, time: Option<&str>, now: NaiveDateTime) -> bool {
    let Some(at) = parse_expiry(date, time) else {
        return false;
    };
    let remaining = at - now;
    remaining > chrono::Duration::zero() && remaining <= chrono::Duration::hours(EXPIRING_SOON_HOURS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn test_format_expiry() {
        assert_eq!(format_expiry(None, None), "No expiry date");
        assert_eq!(format_expiry(Some("2030-05-01"), Some("18:30")), "2030-05-01 18:30");
        assert_eq!(format_expiry(Some("2030-05-01"), None), "2030-05-01");
        assert_eq!(format_expiry(Some("tomorrow"), Some("noon")), "tomorrow noon");
    }

    #[test]
    fn test_parse_expiry_with_seconds_and_midnight_default() {
        assert_eq!(
            parse_expiry(Some("2030-05-01"), Some("18:30:15")).unwrap(),
            NaiveDateTime::parse_from_str("2030-05-01 18:30:15", "%Y-%m-%d %H:%M:%S").unwrap()
        );
        assert_eq!(
            parse_expiry(Some("2030-05-01"), None).unwrap(),
            at("2030-05-01 00:00")
        );
        assert!(parse_expiry(None, Some("10:00")).is_none());
    }

    #[test]
    fn test_expiring_soon_window() {
        let now = at("2030-05-01 12:00");
        assert!(is_expiring_soon(Some("2030-05-01"), Some("18:00"), now));
        assert!(is_expiring_soon(Some("2030-05-02"), Some("12:00"), now));
        assert!(!is_expiring_soon(Some("2030-05-02"), Some("12:01"), now));
        assert!(!is_expiring_soon(Some("2030-05-01"), Some("11:59"), now));
        assert!(!is_expiring_soon(None, None, now));
    }
}
