use chrono::Duration;
use log::warn;

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

/// # parse a race time
/// parse a timing string in `M:SS.sss` or `H:MM:SS.sss` form.
/// the last segment is floating point seconds, every segment before it is an integer.
/// a leading `-` negates the whole duration.
///
/// ## Arguments
/// * `input` - the raw timing string
///
/// ## Returns
/// * `Option<Duration>` - `None` when the string has the wrong shape or a segment is not numeric
pub fn try_parse_duration(input: &str) -> Option<Duration> {
    let input = input.trim();
    if let Some(magnitude) = input.strip_prefix('-') {
        return try_parse_magnitude(magnitude).map(|duration| -duration);
    }
    try_parse_magnitude(input)
}

fn try_parse_magnitude(input: &str) -> Option<Duration> {
    let parts: Vec<&str> = input.split(':').collect();

    let (hours, minutes, seconds) = match parts.as_slice() {
        [minutes, seconds] => (0, minutes.parse::<i64>().ok()?, parse_seconds(seconds)?),
        [hours, minutes, seconds] => (
            hours.parse::<i64>().ok()?,
            minutes.parse::<i64>().ok()?,
            parse_seconds(seconds)?,
        ),
        _ => return None,
    };

    let whole = hours
        .checked_mul(3600)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_mul(1_000_000_000)?;
    let fraction = (seconds * NANOS_PER_SECOND).round();
    if fraction.abs() >= i64::MAX as f64 {
        return None;
    }

    Some(Duration::nanoseconds(whole.checked_add(fraction as i64)?))
}

fn parse_seconds(input: &str) -> Option<f64> {
    input.parse::<f64>().ok().filter(|seconds| seconds.is_finite())
}

/// # parse a race time, fail-soft
/// same as [`try_parse_duration`] but unparseable input becomes a zero duration.
/// a zero duration is also what a DNF looks like, callers can not tell the two apart.
pub fn parse_duration(input: &str) -> Duration {
    match try_parse_duration(input) {
        Some(duration) => duration,
        None => {
            if !input.is_empty() {
                warn!(target: "helpers/duration:parse_duration", "invalid time format {:?}", input);
            }
            Duration::zero()
        }
    }
}

/// # format a race time
/// render a duration as `H:MM:SS.ss` when it is an hour or longer, `M:SS.ss` otherwise.
/// negative durations get a leading `-`. only two decimals are kept so
/// formatting and parsing again does not give back the milliseconds.
pub fn format_duration(duration: Duration) -> String {
    let negative = duration < Duration::zero();
    let nanos = duration.num_nanoseconds().unwrap_or(i64::MAX).unsigned_abs();
    let centis = (nanos + 5_000_000) / 10_000_000;

    let hours = centis / 360_000;
    let minutes = (centis % 360_000) / 6_000;
    let seconds = (centis % 6_000) / 100;
    let fraction = centis % 100;

    let sign = if negative { "-" } else { "" };
    if hours > 0 {
        format!("{sign}{hours}:{minutes:02}:{seconds:02}.{fraction:02}")
    } else {
        format!("{sign}{minutes}:{seconds:02}.{fraction:02}")
    }
}

/// convert a stage time in (fractional) seconds to a duration
pub fn from_seconds(seconds: f64) -> Duration {
    Duration::nanoseconds((seconds * NANOS_PER_SECOND).round() as i64)
}

/// convert a duration to fractional seconds
pub fn to_seconds(duration: Duration) -> f64 {
    duration.num_nanoseconds().unwrap_or(i64::MAX) as f64 / NANOS_PER_SECOND
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hours_minutes_seconds() {
        assert_eq!(parse_duration("1:02:03.456"), Duration::milliseconds(3_723_456));
    }

    #[test]
    fn parses_minutes_seconds() {
        assert_eq!(parse_duration("4:05.5"), Duration::milliseconds(245_500));
        assert_eq!(parse_duration("65:00.000"), Duration::minutes(65));
    }

    #[test]
    fn garbage_becomes_zero() {
        assert_eq!(parse_duration(""), Duration::zero());
        assert_eq!(parse_duration("garbage"), Duration::zero());
        assert_eq!(parse_duration("1:2:3:4"), Duration::zero());
        assert_eq!(parse_duration("12.5"), Duration::zero());
        assert_eq!(parse_duration("a:10.0"), Duration::zero());
        assert_eq!(parse_duration("1:xx:10.0"), Duration::zero());
        assert_eq!(parse_duration("1:inf"), Duration::zero());
    }

    #[test]
    fn try_parse_reports_failures() {
        assert_eq!(try_parse_duration("garbage"), None);
        assert_eq!(try_parse_duration("0:00.000"), Some(Duration::zero()));
    }

    #[test]
    fn formats_long_and_short_times() {
        assert_eq!(format_duration(Duration::milliseconds(3_723_456)), "1:02:03.46");
        assert_eq!(format_duration(Duration::milliseconds(245_500)), "4:05.50");
        assert_eq!(format_duration(Duration::milliseconds(9_010)), "0:09.01");
        assert_eq!(format_duration(Duration::zero()), "0:00.00");
    }

    #[test]
    fn formats_negative_times() {
        assert_eq!(format_duration(Duration::milliseconds(-12_340)), "-0:12.34");
        assert_eq!(format_duration(Duration::milliseconds(-3_723_456)), "-1:02:03.46");
    }

    #[test]
    fn round_trip_keeps_two_decimals() {
        let original = Duration::milliseconds(3_723_456);
        let again = parse_duration(&format_duration(original));

        assert_eq!(again, Duration::milliseconds(3_723_460));

        let exact = Duration::milliseconds(754_120);
        assert_eq!(parse_duration(&format_duration(exact)), exact);
    }

    #[test]
    fn negative_round_trip() {
        let delta = Duration::seconds(-90);
        assert_eq!(format_duration(delta), "-1:30.00");
        assert_eq!(parse_duration(&format_duration(delta)), delta);

        let long = Duration::milliseconds(-3_723_450);
        assert_eq!(parse_duration(&format_duration(long)), long);
        assert_eq!(try_parse_duration("-"), None);
    }

    #[test]
    fn rounding_carries_into_minutes_and_hours() {
        assert_eq!(format_duration(Duration::milliseconds(59_996)), "1:00.00");
        assert_eq!(format_duration(Duration::milliseconds(7_199_999)), "2:00:00.00");
        assert_eq!(format_duration(Duration::milliseconds(3_599_996)), "1:00:00.00");
        assert_eq!(format_duration(Duration::milliseconds(-59_996)), "-1:00.00");
        assert_eq!(parse_duration(&format_duration(Duration::milliseconds(59_996))), Duration::minutes(1));
    }

    #[test]
    fn seconds_conversion() {
        assert_eq!(from_seconds(95.25), Duration::milliseconds(95_250));
        assert!((to_seconds(Duration::milliseconds(95_250)) - 95.25).abs() < 1e-9);
    }
}
