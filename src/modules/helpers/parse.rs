use chrono::NaiveDateTime;

pub const REAL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// parse a whole number, `None` for empty or invalid input
pub fn parse_int(input: &str) -> Option<i64> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    input.parse::<i64>().ok()
}

/// parse a floating point number, `None` for empty, invalid or non-finite input
pub fn parse_float(input: &str) -> Option<f64> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    input.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// parse a `0|1` flag
pub fn parse_flag(input: &str) -> Option<bool> {
    match input.trim() {
        "1" => Some(true),
        "0" => Some(false),
        _ => None,
    }
}

/// parse a real world timestamp in `YYYY-MM-DD HH:MM:SS` form
pub fn parse_real_time(input: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(input.trim(), REAL_TIME_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn ints() {
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int(" 7 "), Some(7));
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("DNF"), None);
        assert_eq!(parse_int("1.5"), None);
    }

    #[test]
    fn floats() {
        assert_eq!(parse_float("12.5"), Some(12.5));
        assert_eq!(parse_float("0"), Some(0.0));
        assert_eq!(parse_float(""), None);
        assert_eq!(parse_float("NaN"), None);
        assert_eq!(parse_float("abc"), None);
    }

    #[test]
    fn flags() {
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag(""), None);
        assert_eq!(parse_flag("yes"), None);
    }

    #[test]
    fn real_times() {
        let expected = NaiveDate::from_ymd_opt(2025, 6, 24)
            .and_then(|date| date.and_hms_opt(18, 3, 9));
        assert_eq!(parse_real_time("2025-06-24 18:03:09"), expected);
        assert_eq!(parse_real_time("24/06/2025"), None);
    }
}
