//! DATE, DATE-TIME and DURATION values (RFC 5545 §3.3.4-3.3.6).

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use super::Property;

/// A DATE or DATE-TIME in one of its three forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ICalDateTime {
    /// `VALUE=DATE`, a whole day.
    Date(NaiveDate),
    /// Trailing `Z`.
    Utc(DateTime<Utc>),
    /// No zone information.
    Floating(NaiveDateTime),
    /// Local time with a `TZID` known to the tz database.
    Zoned { tz: Tz, local: NaiveDateTime },
}

impl ICalDateTime {
    /// ## Summary
    /// Reads a date-time property, honoring `VALUE=DATE` and `TZID`.
    ///
    /// An unknown `TZID` is treated as floating time.
    #[must_use]
    pub fn from_property(prop: &Property) -> Option<Self> {
        Self::parse(prop.value.trim(), prop.param_value("TZID"))
    }

    /// Parses a raw value, with an optional `TZID` parameter.
    #[must_use]
    pub fn parse(value: &str, tzid: Option<&str>) -> Option<Self> {
        if value.len() == 8 {
            return parse_date(value).map(Self::Date);
        }

        if let Some(utc) = value.strip_suffix('Z') {
            return parse_naive(utc).map(|dt| Self::Utc(dt.and_utc()));
        }

        let local = parse_naive(value)?;
        match tzid.map(|id| id.trim_start_matches('/').parse::<Tz>()) {
            Some(Ok(tz)) => Some(Self::Zoned { tz, local }),
            Some(Err(_)) => {
                tracing::trace!(tzid, "Unknown TZID, treating value as floating");
                Some(Self::Floating(local))
            }
            None => Some(Self::Floating(local)),
        }
    }

    #[must_use]
    pub const fn is_date(&self) -> bool {
        matches!(self, Self::Date(_))
    }

    /// ## Summary
    /// Converts to UTC.
    ///
    /// Dates become midnight and floating times are read in `floating_tz`
    /// (RFC 4791 §9.9). A local time that falls into a DST gap is moved
    /// forward by an hour.
    #[must_use]
    pub fn to_utc(&self, floating_tz: Tz) -> Option<DateTime<Utc>> {
        match *self {
            Self::Utc(dt) => Some(dt),
            Self::Date(d) => local_to_utc(floating_tz, d.and_time(NaiveTime::MIN)),
            Self::Floating(local) => local_to_utc(floating_tz, local),
            Self::Zoned { tz, local } => local_to_utc(tz, local),
        }
    }
}

fn local_to_utc(tz: Tz, local: NaiveDateTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&local)
        .earliest()
        .or_else(|| {
            tz.from_local_datetime(&(local + Duration::hours(1)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y%m%d").ok()
}

fn parse_naive(s: &str) -> Option<NaiveDateTime> {
    if s.len() != 15 || !s.is_ascii() || s.as_bytes()[8] != b'T' {
        return None;
    }
    let date = parse_date(&s[..8])?;
    let time = NaiveTime::parse_from_str(&s[9..], "%H%M%S").ok()?;
    Some(date.and_time(time))
}

/// ## Summary
/// Parses a compact UTC timestamp, `YYYYMMDDThhmmssZ`.
///
/// Returns `None` for anything else, including local times.
#[must_use]
pub fn parse_utc_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    parse_naive(s.strip_suffix('Z')?).map(|dt| dt.and_utc())
}

/// ## Summary
/// Parses a DURATION value such as `PT1H30M`, `-P1D` or `P2W`.
#[must_use]
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    let (negative, rest) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };
    let rest = rest.strip_prefix('P')?;

    let mut total = Duration::zero();
    let mut in_time = false;
    let mut number = String::new();
    let mut seen_unit = false;

    for c in rest.chars() {
        if c.is_ascii_digit() {
            number.push(c);
            continue;
        }
        if c == 'T' {
            if in_time || !number.is_empty() {
                return None;
            }
            in_time = true;
            continue;
        }

        let n: i64 = number.parse().ok()?;
        number.clear();
        let part = match (c, in_time) {
            ('W', false) => Duration::try_weeks(n)?,
            ('D', false) => Duration::try_days(n)?,
            ('H', true) => Duration::try_hours(n)?,
            ('M', true) => Duration::try_minutes(n)?,
            ('S', true) => Duration::try_seconds(n)?,
            _ => return None,
        };
        total = total.checked_add(&part)?;
        seen_unit = true;
    }

    if !number.is_empty() || !seen_unit {
        return None;
    }

    Some(if negative { -total } else { total })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::ical::core::Parameter;

    #[test]
    fn utc_timestamp_is_strict() {
        assert_eq!(
            parse_utc_timestamp("20240101T000000Z"),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single()
        );
        assert_eq!(parse_utc_timestamp("20240101T000000"), None);
        assert_eq!(parse_utc_timestamp("2024-01-01T00:00:00Z"), None);
        assert_eq!(parse_utc_timestamp("20241301T000000Z"), None);
        assert_eq!(parse_utc_timestamp("2024010ÄT00000Z"), None);
    }

    #[test]
    fn reads_all_three_forms() {
        let date = Property::new("DTSTART", "20240115").with_param(Parameter::new("VALUE", "DATE"));
        assert!(ICalDateTime::from_property(&date).is_some_and(|d| d.is_date()));

        let zoned = Property::new("DTSTART", "20240115T090000")
            .with_param(Parameter::new("TZID", "Europe/Berlin"));
        let utc = ICalDateTime::from_property(&zoned).and_then(|d| d.to_utc(Tz::UTC));
        assert_eq!(utc, Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).single());

        let floating = ICalDateTime::parse("20240115T090000", None).expect("floating");
        assert_eq!(
            floating.to_utc(Tz::UTC),
            Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).single()
        );

        let unknown_tz = ICalDateTime::parse("20240115T090000", Some("Mars/Olympus"));
        assert!(matches!(unknown_tz, Some(ICalDateTime::Floating(_))));
    }

    #[test]
    fn durations() {
        assert_eq!(parse_duration("PT1H30M"), Some(Duration::minutes(90)));
        assert_eq!(parse_duration("-P1D"), Some(Duration::days(-1)));
        assert_eq!(parse_duration("P2W"), Some(Duration::weeks(2)));
        assert_eq!(parse_duration("P1DT12H"), Some(Duration::hours(36)));
        assert_eq!(parse_duration("PT"), None);
        assert_eq!(parse_duration("P1H"), None);
        assert_eq!(parse_duration("1D"), None);
    }
}
