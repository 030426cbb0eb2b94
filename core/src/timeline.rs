// core/src/timeline.rs
use chrono::{Duration, NaiveDateTime, Timelike};

use crate::error::{AltimeterError, Result};

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Desimaltimer siden `reference` (kan være negativ).
#[inline]
pub fn decimal_hours(reference: NaiveDateTime, t: NaiveDateTime) -> f64 {
    (t - reference).num_milliseconds() as f64 / MS_PER_HOUR
}

/// Tilbake fra desimaltimer til tidspunkt, millisekund-oppløsning.
/// Feiler når resultatet faller utenfor chronos tidsområde.
pub fn from_decimal_hours(reference: NaiveDateTime, hours: f64) -> Result<NaiveDateTime> {
    let ms = (hours * MS_PER_HOUR).round();
    // i64::MAX er ikke eksakt i f64; grensen under holder seg innenfor
    if !ms.is_finite() || ms.abs() >= 9.0e18 {
        return Err(AltimeterError::InvalidParameter(format!("{hours} h is outside the time range")));
    }
    Duration::try_milliseconds(ms as i64)
        .and_then(|d| reference.checked_add_signed(d))
        .ok_or_else(|| AltimeterError::InvalidParameter(format!("{reference} + {hours} h overflows")))
}

fn subsecond(t: NaiveDateTime) -> Duration {
    Duration::nanoseconds(i64::from(t.nanosecond()))
}

/// 14:34:13 -> 14:00:00
pub fn full_hour(t: NaiveDateTime) -> NaiveDateTime {
    t - Duration::seconds(i64::from(t.minute() * 60 + t.second())) - subsecond(t)
}

/// 14:34:13.250 -> 14:34:00
pub fn truncate_to_minute(t: NaiveDateTime) -> NaiveDateTime {
    t - Duration::seconds(i64::from(t.second())) - subsecond(t)
}

/// Samme dato og samme time.
#[inline]
pub fn share_same_hour(a: NaiveDateTime, b: NaiveDateTime) -> bool {
    full_hour(a) == full_hour(b)
}

/// Alle hele timer fra `full_hour(start)` til og med `full_hour(end)`.
/// Minst én time, også når `end` ligger før `start`.
pub fn hours_between(start: NaiveDateTime, end: NaiveDateTime) -> Vec<NaiveDateTime> {
    let first = full_hour(start);
    let last = full_hour(end);
    let mut out = vec![first];
    let mut h = first + Duration::hours(1);
    while h <= last {
        out.push(h);
        h += Duration::hours(1);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 2, 5).unwrap().and_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn decimal_hours_roundtrip() {
        let r = at(6, 0, 0);
        let t = at(8, 30, 0);
        assert!((decimal_hours(r, t) - 2.5).abs() < 1e-12);
        assert_eq!(from_decimal_hours(r, 2.5).unwrap(), t);
    }

    #[test]
    fn from_decimal_hours_overflow_is_error() {
        let r = at(6, 0, 0);
        assert!(matches!(from_decimal_hours(r, 1e16), Err(AltimeterError::InvalidParameter(_))));
        assert!(from_decimal_hours(r, f64::NAN).is_err());
        assert!(from_decimal_hours(r, -1e16).is_err());
    }

    #[test]
    fn truncation() {
        assert_eq!(full_hour(at(14, 34, 13)), at(14, 0, 0));
        assert_eq!(truncate_to_minute(at(14, 34, 13)), at(14, 34, 0));
        assert!(share_same_hour(at(9, 1, 0), at(9, 59, 59)));
        assert!(!share_same_hour(at(9, 59, 59), at(10, 0, 0)));
    }

    #[test]
    fn hours_between_is_inclusive() {
        let hs = hours_between(at(6, 40, 0), at(9, 0, 0));
        assert_eq!(hs, vec![at(6, 0, 0), at(7, 0, 0), at(8, 0, 0), at(9, 0, 0)]);
        assert_eq!(hours_between(at(6, 10, 0), at(6, 50, 0)).len(), 1);
    }
}
