//! Calendar-aware timestamps and CF time decoding.
//!
//! Climate models run on several calendars (365-day, 360-day, ...), so
//! timestamps are kept as plain calendar components rather than as instants.
//! The standard calendars are resolved with `chrono`; the idealized ones use
//! fixed month tables.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{HadleyError, Result};

const SECONDS_PER_DAY: i64 = 86_400;

/// CF calendar kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Calendar {
    /// Mixed Gregorian/Julian; treated as proleptic Gregorian
    #[default]
    Standard,
    ProlepticGregorian,
    /// Every year has 365 days
    NoLeap,
    /// Every year has 366 days
    AllLeap,
    /// Twelve 30-day months
    Day360,
    /// Leap year every fourth year
    Julian,
}

impl Calendar {
    /// Whether `year` has a February 29th in this calendar
    pub fn is_leap_year(&self, year: i32) -> bool {
        match self {
            Calendar::Standard | Calendar::ProlepticGregorian => {
                (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
            }
            Calendar::Julian => year.rem_euclid(4) == 0,
            Calendar::AllLeap => true,
            Calendar::NoLeap | Calendar::Day360 => false,
        }
    }

    /// Number of days in the given month
    pub fn days_in_month(&self, year: i32, month: u32) -> u32 {
        if *self == Calendar::Day360 {
            return 30;
        }
        match month {
            2 if self.is_leap_year(year) => 29,
            2 => 28,
            4 | 6 | 9 | 11 => 30,
            _ => 31,
        }
    }

    fn days_in_year(&self, year: i32) -> i64 {
        match self {
            Calendar::Day360 => 360,
            _ if self.is_leap_year(year) => 366,
            _ => 365,
        }
    }

    fn uses_chrono(&self) -> bool {
        matches!(self, Calendar::Standard | Calendar::ProlepticGregorian)
    }
}

impl FromStr for Calendar {
    type Err = HadleyError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" | "gregorian" => Ok(Calendar::Standard),
            "proleptic_gregorian" => Ok(Calendar::ProlepticGregorian),
            "noleap" | "no_leap" | "365_day" => Ok(Calendar::NoLeap),
            "all_leap" | "366_day" => Ok(Calendar::AllLeap),
            "360_day" => Ok(Calendar::Day360),
            "julian" => Ok(Calendar::Julian),
            _ => Err(HadleyError::InvalidTime {
                message: format!("Unknown calendar: {}", s),
            }),
        }
    }
}

/// A point in time expressed as calendar components
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CalendarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl CalendarDate {
    /// Midnight on the given day
    pub fn ymd(year: i32, month: u32, day: u32) -> Self {
        Self {
            year,
            month,
            day,
            hour: 0,
            minute: 0,
            second: 0,
        }
    }

    /// Check the components against a calendar
    pub fn validate(&self, calendar: Calendar) -> Result<()> {
        if !(1..=12).contains(&self.month) {
            return Err(HadleyError::InvalidTime {
                message: format!("month {} out of range in {}", self.month, self),
            });
        }
        if self.day == 0 || self.day > calendar.days_in_month(self.year, self.month) {
            return Err(HadleyError::InvalidTime {
                message: format!("day {} out of range in {} ({:?} calendar)", self.day, self, calendar),
            });
        }
        if self.hour > 23 || self.minute > 59 || self.second > 59 {
            return Err(HadleyError::InvalidTime {
                message: format!("time of day out of range in {}", self),
            });
        }
        Ok(())
    }

    fn seconds_of_day(&self) -> i64 {
        self.hour as i64 * 3600 + self.minute as i64 * 60 + self.second as i64
    }

    fn to_chrono(self) -> Result<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
            .and_then(|d| d.and_hms_opt(self.hour, self.minute, self.second))
            .ok_or_else(|| HadleyError::InvalidTime {
                message: format!("{} is not a valid Gregorian date", self),
            })
    }

    fn from_chrono(dt: NaiveDateTime) -> Self {
        Self {
            year: dt.year(),
            month: dt.month(),
            day: dt.day(),
            hour: dt.hour(),
            minute: dt.minute(),
            second: dt.second(),
        }
    }

    fn overflow(&self, seconds: i64) -> HadleyError {
        HadleyError::InvalidTime {
            message: format!("offset of {}s from {} is out of range", seconds, self),
        }
    }

    /// Shift by a signed number of seconds within the given calendar
    pub fn add_seconds(&self, calendar: Calendar, seconds: i64) -> Result<Self> {
        if calendar.uses_chrono() {
            let dt = self.to_chrono()?;
            let shifted = Duration::try_seconds(seconds)
                .and_then(|offset| dt.checked_add_signed(offset))
                .ok_or_else(|| self.overflow(seconds))?;
            return Ok(Self::from_chrono(shifted));
        }

        let total = self
            .seconds_of_day()
            .checked_add(seconds)
            .ok_or_else(|| self.overflow(seconds))?;
        let days = total.div_euclid(SECONDS_PER_DAY);
        let rem = total.rem_euclid(SECONDS_PER_DAY);

        let (year, month, day) = day_number(calendar, self.year, self.month, self.day)
            .checked_add(days)
            .and_then(|n| from_day_number(calendar, n))
            .ok_or_else(|| self.overflow(seconds))?;

        Ok(Self {
            year,
            month,
            day,
            hour: (rem / 3600) as u32,
            minute: ((rem % 3600) / 60) as u32,
            second: (rem % 60) as u32,
        })
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Days elapsed since 0000-01-01 in a non-Gregorian calendar
fn day_number(calendar: Calendar, year: i32, month: u32, day: u32) -> i64 {
    let year_days = match calendar {
        Calendar::Julian => 365 * year as i64 + (year as i64 + 3).div_euclid(4),
        _ => calendar.days_in_year(0) * year as i64,
    };
    let month_days: i64 = (1..month)
        .map(|m| calendar.days_in_month(year, m) as i64)
        .sum();
    year_days + month_days + day as i64 - 1
}

/// Inverse of [`day_number`]; `None` when the year does not fit an `i32`
fn from_day_number(calendar: Calendar, n: i64) -> Option<(i32, u32, u32)> {
    let (year, mut day_of_year) = match calendar {
        Calendar::Julian => {
            let cycle = n.div_euclid(1461);
            let rem = n.rem_euclid(1461);
            // The first year of each four-year cycle is the leap year
            if rem < 366 {
                (4 * cycle, rem)
            } else {
                let rem = rem - 366;
                (4 * cycle + 1 + rem / 365, rem % 365)
            }
        }
        _ => {
            let len = calendar.days_in_year(0);
            (n.div_euclid(len), n.rem_euclid(len))
        }
    };

    let year = i32::try_from(year).ok()?;
    let mut month = 1;
    loop {
        let len = calendar.days_in_month(year, month) as i64;
        if day_of_year < len || month == 12 {
            break;
        }
        day_of_year -= len;
        month += 1;
    }
    Some((year, month, day_of_year as u32 + 1))
}

/// Parse a CF reference date such as `1850-01-01`, `2000-1-1 12:00:00` or
/// `1979-01-01T00:00:00Z`
fn parse_reference_date(text: &str) -> Result<CalendarDate> {
    let invalid = || HadleyError::InvalidTime {
        message: format!("Invalid reference date: {}", text),
    };

    let cleaned = text.trim().trim_end_matches("UTC").trim_end_matches('Z').trim();
    let mut parts = cleaned.splitn(2, |c: char| c == ' ' || c == 'T');
    let date_part = parts.next().ok_or_else(invalid)?;
    let time_part = parts.next().map(str::trim).unwrap_or("");

    // Leading '-' marks a negative year
    let (sign, date_body) = match date_part.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, date_part),
    };
    let ymd: Vec<&str> = date_body.split('-').collect();
    if ymd.is_empty() || ymd.len() > 3 {
        return Err(invalid());
    }
    let year: i32 = ymd[0].parse().map_err(|_| invalid())?;
    let month: u32 = match ymd.get(1) {
        Some(m) => m.parse().map_err(|_| invalid())?,
        None => 1,
    };
    let day: u32 = match ymd.get(2) {
        Some(d) => d.parse().map_err(|_| invalid())?,
        None => 1,
    };

    let mut hms = [0u32; 3];
    if !time_part.is_empty() {
        for (slot, piece) in hms.iter_mut().zip(time_part.split(':')) {
            // Fractional seconds are truncated
            let whole = piece.split('.').next().unwrap_or(piece);
            *slot = whole.parse().map_err(|_| invalid())?;
        }
    }

    Ok(CalendarDate {
        year: sign * year,
        month,
        day,
        hour: hms[0],
        minute: hms[1],
        second: hms[2],
    })
}

fn unit_seconds(unit: &str) -> Option<f64> {
    match unit.trim().to_lowercase().as_str() {
        "days" | "day" | "d" => Some(86_400.0),
        "hours" | "hour" | "hrs" | "hr" | "h" => Some(3_600.0),
        "minutes" | "minute" | "mins" | "min" => Some(60.0),
        "seconds" | "second" | "secs" | "sec" | "s" => Some(1.0),
        _ => None,
    }
}

/// Decode numeric CF time values such as `days since 1850-01-01`
///
/// Offsets are rounded to the nearest second.
pub fn decode_cf_times(units: &str, values: &[f64], calendar: Calendar) -> Result<Vec<CalendarDate>> {
    let (unit, reference) = units
        .split_once(" since ")
        .ok_or_else(|| HadleyError::InvalidTime {
            message: format!("Time units must look like '<unit> since <date>': {}", units),
        })?;

    let scale = unit_seconds(unit).ok_or_else(|| HadleyError::InvalidTime {
        message: format!("Unsupported time unit: {}", unit),
    })?;
    let origin = parse_reference_date(reference)?;
    origin.validate(calendar)?;

    values
        .iter()
        .map(|&v| {
            if !v.is_finite() {
                return Err(HadleyError::InvalidTime {
                    message: format!("Non-finite time value: {}", v),
                });
            }
            let seconds = (v * scale).round();
            // i64::MAX as f64 rounds up to 2^63, which is already out of range
            if seconds.abs() >= i64::MAX as f64 {
                return Err(HadleyError::InvalidTime {
                    message: format!("Time value {} {} overflows", v, unit),
                });
            }
            origin.add_seconds(calendar, seconds as i64)
        })
        .collect()
}
