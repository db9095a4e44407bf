use chrono::{DateTime, NaiveDate, NaiveDateTime};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Read a date the backend emitted in either `DD.MM.YYYY` or ISO-like form
/// (`YYYY/MM/DD` is accepted too).
///
/// Returns `None` for empty input, the `-` placeholder, a dotted value that
/// does not have exactly three components, or components that do not name a
/// real calendar day.
pub fn parse_flexible_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return None;
    }

    // Fractional-second timestamps also contain dots.
    if trimmed.contains('.') && !trimmed.contains('-') {
        return parse_dotted(trimmed);
    }

    parse_iso_like(trimmed)
}

/// Same as [`parse_flexible_date`] for optional fields.
pub fn parse_optional_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(parse_flexible_date)
}

fn parse_dotted(value: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = value.split('.').map(str::trim).collect();
    let [day, month, year] = parts.as_slice() else {
        return None;
    };

    let day = day.parse::<u32>().ok()?;
    let month = month.parse::<u32>().ok()?;
    let year = year.parse::<i32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_iso_like(value: &str) -> Option<NaiveDate> {
    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.date());
        }
    }

    None
}

/// Whole days from `now` until the start of `date`, rounded up.
///
/// A few leftover hours still count as one more day; zero or negative means
/// the date is today or already behind us.
pub fn days_until(date: NaiveDate, now: NaiveDateTime) -> i64 {
    let delta = date.and_time(chrono::NaiveTime::MIN) - now;
    let millis = delta.num_milliseconds();
    let whole = millis / MILLIS_PER_DAY;
    if millis % MILLIS_PER_DAY > 0 {
        whole + 1
    } else {
        whole
    }
}

/// Format a date in the dotted `DD.MM.YYYY` convention.
pub fn format_dotted(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, min, 0).expect("valid time")
    }

    #[test]
    fn dotted_and_iso_forms_agree() {
        assert_eq!(parse_flexible_date("05.03.2024"), Some(date(2024, 3, 5)));
        assert_eq!(parse_flexible_date("2024-03-05"), Some(date(2024, 3, 5)));
        assert_eq!(parse_flexible_date(" 5.3.2024 "), Some(date(2024, 3, 5)));
        assert_eq!(parse_flexible_date("2024/03/05"), Some(date(2024, 3, 5)));
        assert!(parse_flexible_date("2024/02/30").is_none());
    }

    #[test]
    fn timestamps_keep_their_calendar_date() {
        assert_eq!(
            parse_flexible_date("2024-03-05T10:15:00Z"),
            Some(date(2024, 3, 5))
        );
        assert_eq!(
            parse_flexible_date("2024-03-05T10:15:00.250+03:00"),
            Some(date(2024, 3, 5))
        );
        assert_eq!(
            parse_flexible_date("2024-03-05 23:59:59"),
            Some(date(2024, 3, 5))
        );
    }

    #[test]
    fn unusable_input_yields_none() {
        assert!(parse_flexible_date("").is_none());
        assert!(parse_flexible_date("   ").is_none());
        assert!(parse_flexible_date("-").is_none());
        assert!(parse_flexible_date("1.2").is_none());
        assert!(parse_flexible_date("01.02.2024.5").is_none());
        assert!(parse_flexible_date("31.02.2024").is_none());
        assert!(parse_flexible_date("aa.bb.cccc").is_none());
        assert!(parse_flexible_date("not a date").is_none());
        assert!(parse_optional_date(None).is_none());
    }

    #[test]
    fn days_until_rounds_partial_days_up() {
        let now = at(2024, 3, 1, 18, 0);
        assert_eq!(days_until(date(2024, 3, 2), now), 1);
        assert_eq!(days_until(date(2024, 3, 5), now), 4);
        assert_eq!(days_until(date(2024, 3, 1), now), 0);
        assert_eq!(days_until(date(2024, 2, 28), now), -2);
    }

    #[test]
    fn days_until_at_midnight_is_exact() {
        let now = at(2024, 3, 1, 0, 0);
        assert_eq!(days_until(date(2024, 3, 1), now), 0);
        assert_eq!(days_until(date(2024, 3, 31), now), 30);
    }

    #[test]
    fn formatted_dates_parse_back() {
        for original in [date(2024, 3, 5), date(1999, 12, 31), date(2030, 1, 1)] {
            let text = format_dotted(original);
            assert_eq!(parse_flexible_date(&text), Some(original));
        }
        assert_eq!(format_dotted(date(2024, 3, 5)), "05.03.2024");
    }
}
