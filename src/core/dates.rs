use crate::domain::model::{Cadence, DateWindow, DATE_FORMAT};
use crate::utils::error::{FetchError, Result};
use chrono::{Datelike, Duration, NaiveDate};

/// Parses an 8-digit `yyyymmdd` date.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    let invalid = || FetchError::InvalidDate {
        value: value.to_string(),
    };

    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid())
}

/// Monday on or before `date`.
pub fn snap_to_monday(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Turns the positional date arguments into an inclusive window.
///
/// Two arguments give an explicit range, one a single day and none the
/// current day. Products that only accept a single date pass `max_args = 1`.
/// Weekly windows have both bounds moved back to their Monday.
pub fn resolve_window(
    args: &[String],
    today: NaiveDate,
    cadence: Cadence,
    max_args: usize,
) -> Result<DateWindow> {
    if args.len() > max_args.min(2) {
        return Err(FetchError::Usage {
            message: format!(
                "expected at most {} date argument(s), got {}",
                max_args.min(2),
                args.len()
            ),
        });
    }

    let (start, end) = match args {
        [start, end] => (parse_date(start)?, parse_date(end)?),
        [date] => {
            let date = parse_date(date)?;
            (date, date)
        }
        _ => (today, today),
    };

    let window = match cadence {
        Cadence::Daily => DateWindow::new(start, end, cadence),
        Cadence::Weekly => DateWindow::new(snap_to_monday(start), snap_to_monday(end), cadence),
    };
    Ok(window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("20240103").unwrap(), ymd(2024, 1, 3));
        assert!(parse_date("2024013").is_err());
        assert!(parse_date("2024-01-03").is_err());
        assert!(parse_date("20241301").is_err());
        assert!(parse_date("20230229").is_err());
        assert!(parse_date("+2024013").is_err());
    }

    #[test]
    fn test_two_args_give_explicit_range() {
        let today = ymd(2026, 10, 17);
        let window =
            resolve_window(&args(&["20240101", "20240105"]), today, Cadence::Daily, 2).unwrap();
        assert_eq!(window.start, ymd(2024, 1, 1));
        assert_eq!(window.end, ymd(2024, 1, 5));
        assert!(window.start <= window.end);
    }

    #[test]
    fn test_one_arg_gives_single_day() {
        let today = ymd(2026, 10, 17);
        let window = resolve_window(&args(&["20240229"]), today, Cadence::Daily, 2).unwrap();
        assert_eq!(window.start, window.end);
        assert_eq!(window.start, ymd(2024, 2, 29));
    }

    #[test]
    fn test_no_args_default_to_today() {
        let today = ymd(2026, 10, 17);
        let window = resolve_window(&[], today, Cadence::Daily, 2).unwrap();
        assert_eq!(window.start, today);
        assert_eq!(window.end, today);
    }

    #[test]
    fn test_too_many_args_is_usage_error() {
        let today = ymd(2026, 10, 17);
        let err = resolve_window(
            &args(&["20240101", "20240102", "20240103"]),
            today,
            Cadence::Daily,
            2,
        )
        .unwrap_err();
        assert!(matches!(err, FetchError::Usage { .. }));

        let err = resolve_window(&args(&["20240101", "20240102"]), today, Cadence::Daily, 1)
            .unwrap_err();
        assert!(matches!(err, FetchError::Usage { .. }));
    }

    #[test]
    fn test_malformed_arg_is_rejected() {
        let today = ymd(2026, 10, 17);
        let err = resolve_window(&args(&["2024011"]), today, Cadence::Daily, 2).unwrap_err();
        assert!(matches!(err, FetchError::InvalidDate { .. }));
    }

    #[test]
    fn test_weekly_bounds_snap_to_monday() {
        let today = ymd(2026, 10, 17);
        for day in 1..=31 {
            let date = ymd(2024, 1, day);
            let window = resolve_window(
                &args(&[&date.format("%Y%m%d").to_string()]),
                today,
                Cadence::Weekly,
                2,
            )
            .unwrap();
            assert_eq!(window.start.weekday(), Weekday::Mon);
            assert_eq!(window.end.weekday(), Weekday::Mon);
            assert!(window.start <= date);
            assert!(date - window.start < Duration::days(7));
        }
    }

    #[test]
    fn test_snap_keeps_monday() {
        assert_eq!(snap_to_monday(ymd(2024, 1, 8)), ymd(2024, 1, 8));
        assert_eq!(snap_to_monday(ymd(2024, 1, 14)), ymd(2024, 1, 8));
        assert_eq!(snap_to_monday(ymd(2024, 1, 1)), ymd(2024, 1, 1));
    }
}
