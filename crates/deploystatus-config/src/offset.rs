//! Deploy offset parsing.
//!
//! Only releases deployed within the offset window before now are reported.
//! Offsets use Go-style duration strings such as `2h`, `1.5h` or `1h30m`.

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use std::sync::LazyLock;

use crate::{ConfigError, ConfigResult};

static DURATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:ns|us|µs|μs|ms|s|m|h|d))+$")
        .expect("valid duration regex")
});

static COMPONENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]*)(?:\.([0-9]*))?(ns|us|µs|μs|ms|s|m|h|d)").expect("valid component regex")
});

/// Fraction digits past this are ignored.
const MAX_FRACTION_DIGITS: usize = 18;

/// Parse a compound duration like `1h30m`.
///
/// Components may be fractional (`1.5h`). Supported units are `ns`, `us`
/// (or `µs`), `ms`, `s`, `m`, `h` and `d`. A bare `0` is a zero duration.
pub fn parse_duration(value: &str) -> ConfigResult<Duration> {
    let trimmed = value.trim();
    if trimmed == "0" {
        return Ok(Duration::zero());
    }
    if !DURATION_REGEX.is_match(trimmed) {
        return Err(invalid(
            value,
            "expected <number><unit> components where unit is ns, us, ms, s, m, h or d",
        ));
    }

    let mut nanos: i128 = 0;
    for captures in COMPONENT_REGEX.captures_iter(trimmed) {
        let unit_nanos: i128 = match &captures[3] {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => 1_000_000_000,
            "m" => 60 * 1_000_000_000,
            "h" => 3_600 * 1_000_000_000,
            "d" => 86_400 * 1_000_000_000,
            _ => unreachable!("unit constrained by regex"),
        };

        let whole = match &captures[1] {
            "" => 0,
            digits => digits
                .parse::<i128>()
                .map_err(|e| invalid(value, &e.to_string()))?,
        };
        let mut component = whole
            .checked_mul(unit_nanos)
            .ok_or_else(|| invalid(value, "duration too large"))?;

        let fraction = captures.get(2).map_or("", |m| m.as_str());
        let fraction = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
        if !fraction.is_empty() {
            let digits: i128 = fraction
                .parse()
                .map_err(|e: std::num::ParseIntError| invalid(value, &e.to_string()))?;
            component += digits * unit_nanos / 10i128.pow(fraction.len() as u32);
        }

        nanos = nanos
            .checked_add(component)
            .ok_or_else(|| invalid(value, "duration too large"))?;
    }

    i64::try_from(nanos)
        .map(Duration::nanoseconds)
        .map_err(|_| invalid(value, "duration too large"))
}

/// Compute the deploy cutoff for an offset relative to `now`.
///
/// An empty offset disables the window and returns `None`.
pub fn deploy_cutoff(offset: &str, now: DateTime<Utc>) -> ConfigResult<Option<DateTime<Utc>>> {
    if offset.trim().is_empty() {
        return Ok(None);
    }
    let duration = parse_duration(offset)?;
    now.checked_sub_signed(duration)
        .map(Some)
        .ok_or_else(|| invalid(offset, "offset reaches before the earliest representable time"))
}

fn invalid(value: &str, message: &str) -> ConfigError {
    ConfigError::InvalidOffset {
        value: value.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        assert_eq!(parse_duration("2h").unwrap(), Duration::hours(2));
        assert_eq!(parse_duration("90s").unwrap(), Duration::seconds(90));
        assert_eq!(parse_duration("500ms").unwrap(), Duration::milliseconds(500));
        assert_eq!(parse_duration("1d").unwrap(), Duration::days(1));
    }

    #[test]
    fn test_parse_compound() {
        assert_eq!(
            parse_duration("1h30m").unwrap(),
            Duration::hours(1) + Duration::minutes(30)
        );
        assert_eq!(
            parse_duration("1m500ms").unwrap(),
            Duration::minutes(1) + Duration::milliseconds(500)
        );
        assert_eq!(parse_duration("2h0m0s").unwrap(), Duration::hours(2));
        assert_eq!(parse_duration("1.5h").unwrap(), Duration::minutes(90));
        assert_eq!(parse_duration(".5s").unwrap(), Duration::milliseconds(500));
        assert_eq!(
            parse_duration("1h1.5m").unwrap(),
            Duration::hours(1) + Duration::seconds(90)
        );
        assert_eq!(parse_duration("300us").unwrap(), Duration::microseconds(300));
        assert_eq!(parse_duration("1.5µs").unwrap(), Duration::nanoseconds(1500));
        assert_eq!(parse_duration("250ns").unwrap(), Duration::nanoseconds(250));
        assert_eq!(parse_duration("0").unwrap(), Duration::zero());
        assert_eq!(parse_duration("0s").unwrap(), Duration::zero());
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("2").is_err());
        assert!(parse_duration("h").is_err());
        assert!(parse_duration("2 hours").is_err());
        assert!(parse_duration("-2h").is_err());
        assert!(parse_duration("1.5").is_err());
        assert!(parse_duration("1..5h").is_err());
        assert!(parse_duration("99999999999999999999h").is_err());
    }

    #[test]
    fn test_deploy_cutoff() {
        let now: DateTime<Utc> = "2023-01-25T10:38:47Z".parse().unwrap();
        assert_eq!(deploy_cutoff("", now).unwrap(), None);
        assert_eq!(
            deploy_cutoff("2h", now).unwrap(),
            Some("2023-01-25T08:38:47Z".parse().unwrap())
        );
        assert_eq!(
            deploy_cutoff("1.5h", now).unwrap(),
            Some("2023-01-25T09:08:47Z".parse().unwrap())
        );
        assert_eq!(deploy_cutoff("0", now).unwrap(), Some(now));
        assert!(deploy_cutoff("soon", now).is_err());
    }
}
