//! Temporal values and their ISO-8601 text forms
//!
//! Text rendering follows the conventions graph databases use when
//! exporting temporal values: seconds are dropped when they and the
//! fraction are zero (`19:32` rather than `19:32:00`), fractions print in
//! groups of three digits, and a zero UTC offset prints as `Z`.

use std::fmt;

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Timelike, Utc};
use serde::{Deserialize, Serialize};

const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Format a time of day as `HH:MM[:SS[.fff[fff[fff]]]]`
pub fn format_local_time(time: &NaiveTime) -> String {
    let mut out = format!("{:02}:{:02}", time.hour(), time.minute());
    let second = time.second();
    // leap seconds surface as nanos >= 1e9; fold them into the fraction
    let nanos = time.nanosecond() % NANOS_PER_SECOND as u32;

    if second > 0 || nanos > 0 {
        out.push_str(&format!(":{:02}", second));
        if nanos > 0 {
            if nanos % 1_000_000 == 0 {
                out.push_str(&format!(".{:03}", nanos / 1_000_000));
            } else if nanos % 1_000 == 0 {
                out.push_str(&format!(".{:06}", nanos / 1_000));
            } else {
                out.push_str(&format!(".{:09}", nanos));
            }
        }
    }
    out
}

/// Format a calendar date as `YYYY-MM-DD`
pub fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Format a local date-time as `YYYY-MM-DDTHH:MM[...]`
pub fn format_local_date_time(value: &NaiveDateTime) -> String {
    format!("{}T{}", format_date(&value.date()), format_local_time(&value.time()))
}

/// Format a UTC offset as `Z` or `+HH:MM[:SS]`
pub fn format_offset(offset: &FixedOffset) -> String {
    let total = offset.local_minus_utc();
    if total == 0 {
        return "Z".to_string();
    }

    let sign = if total < 0 { '-' } else { '+' };
    let abs = total.abs();
    let (hours, minutes, seconds) = (abs / 3600, (abs / 60) % 60, abs % 60);
    if seconds == 0 {
        format!("{}{:02}:{:02}", sign, hours, minutes)
    } else {
        format!("{}{:02}:{:02}:{:02}", sign, hours, minutes, seconds)
    }
}

/// Format an offset date-time as `YYYY-MM-DDTHH:MM[...]<offset>`
pub fn format_date_time(value: &chrono::DateTime<FixedOffset>) -> String {
    format!(
        "{}{}",
        format_local_date_time(&value.naive_local()),
        format_offset(value.offset())
    )
}

/// A time of day with a fixed UTC offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Time {
    /// Local time of day
    pub time: NaiveTime,

    /// Offset from UTC in seconds
    pub offset_seconds: i32,
}

impl Time {
    /// Create an offset time, returning `None` for offsets beyond ±24h
    pub fn new(time: NaiveTime, offset_seconds: i32) -> Option<Self> {
        FixedOffset::east_opt(offset_seconds).map(|_| Self {
            time,
            offset_seconds,
        })
    }

    /// The offset as a chrono value
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.offset_seconds).unwrap_or_else(|| Utc.fix())
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", format_local_time(&self.time), format_offset(&self.offset()))
    }
}

/// A calendar-aware amount of time
///
/// Months, days and seconds are kept apart because their lengths vary;
/// `nanos` is always normalized into `0..1_000_000_000`.
///
/// # Examples
///
/// ```
/// use trellis_domain::Duration;
///
/// // five months, one and a half days
/// let duration = Duration::new(5, 1, 12 * 3600, 0);
/// assert_eq!(duration.to_string(), "P5M1DT12H");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Duration {
    /// Whole months
    pub months: i64,
    /// Whole days
    pub days: i64,
    /// Whole seconds
    pub seconds: i64,
    /// Nanoseconds within the second
    pub nanos: i32,
}

impl Duration {
    /// The zero-length duration
    pub const ZERO: Duration = Duration {
        months: 0,
        days: 0,
        seconds: 0,
        nanos: 0,
    };

    /// Create a duration, carrying excess nanoseconds into seconds
    pub fn new(months: i64, days: i64, seconds: i64, nanos: i64) -> Self {
        let seconds = seconds + nanos.div_euclid(NANOS_PER_SECOND);
        let nanos = nanos.rem_euclid(NANOS_PER_SECOND) as i32;
        Self {
            months,
            days,
            seconds,
            nanos,
        }
    }

    /// Build a duration from a number of seconds only
    pub fn from_seconds(seconds: i64) -> Self {
        Self::new(0, 0, seconds, 0)
    }

    /// Whether every component is zero
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("PT0S");
        }

        let mut out = String::from("P");
        push_unit(&mut out, self.months / 12, 'Y');
        push_unit(&mut out, self.months % 12, 'M');
        push_unit(&mut out, self.days, 'D');

        if self.seconds != 0 || self.nanos != 0 {
            let negative = self.seconds < 0;
            let mut seconds = self.seconds;
            let mut nanos = i64::from(self.nanos);
            if negative && nanos != 0 {
                seconds += 1;
                nanos -= NANOS_PER_SECOND;
            }

            out.push('T');
            push_unit(&mut out, seconds / 3600, 'H');
            seconds %= 3600;
            push_unit(&mut out, seconds / 60, 'M');
            seconds %= 60;

            if seconds != 0 {
                out.push_str(&seconds.to_string());
                push_fraction(&mut out, nanos);
                out.push('S');
            } else if nanos != 0 {
                if negative {
                    out.push('-');
                }
                out.push('0');
                push_fraction(&mut out, nanos);
                out.push('S');
            }
        }

        if out.len() == 1 {
            out.push_str("T0S");
        }
        f.write_str(&out)
    }
}

fn push_unit(out: &mut String, quantity: i64, unit: char) {
    if quantity != 0 {
        out.push_str(&quantity.to_string());
        out.push(unit);
    }
}

fn push_fraction(out: &mut String, nanos: i64) {
    if nanos == 0 {
        return;
    }
    let digits = format!("{:09}", nanos.abs());
    out.push('.');
    out.push_str(digits.trim_end_matches('0'));
}
