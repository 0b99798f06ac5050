//! Calendar decomposition of the whole-second clock
//!
//! Field conventions follow `struct tm` with two exceptions that match
//! `chrono`: `year` is the full year and `month` counts from 1. Setting the
//! clock from fields normalizes out-of-range values the way `mktime` does, so
//! month 13 is January of the next year and day 0 is the last day of the
//! previous month.

use core::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};

/// Days in one 400-year Gregorian cycle
const DAYS_PER_ERA: i128 = 146_097;
/// `num_days_from_ce` of 1970-01-01
const EPOCH_DAYS_FROM_CE: i128 = 719_163;
const SECONDS_PER_DAY: i128 = 86_400;

/// Daylight saving interpretation of calendar input.
///
/// The default is [`DstFlag::Standard`]: fields are taken as standard time
/// even in summer. Callers that want the calendar rules to decide must ask for
/// [`DstFlag::Infer`] explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DstFlag {
    #[default]
    Standard,
    InEffect,
    /// Let the zone rules decide. A fixed offset carries no DST rule, so this
    /// behaves like `Standard`.
    Infer,
}

/// Structured calendar time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalendarTime {
    pub year: i32,
    /// 1-12
    pub month: i32,
    /// 1-31
    pub day: i32,
    /// 0-23
    pub hour: i32,
    /// 0-59
    pub minute: i32,
    /// 0-59
    pub second: i32,
    /// Days since Sunday, 0-6. Ignored on input.
    pub weekday: u8,
    /// Days since January 1, 0-365. Ignored on input.
    pub year_day: u16,
    pub dst: DstFlag,
}

impl CalendarTime {
    /// Calendar input with derived fields zeroed and no DST
    pub const fn new(year: i32, month: i32, day: i32, hour: i32, minute: i32, second: i32) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            weekday: 0,
            year_day: 0,
            dst: DstFlag::Standard,
        }
    }

    pub const fn with_dst(mut self, dst: DstFlag) -> Self {
        self.dst = dst;
        self
    }

    /// Decompose a Unix timestamp in UTC.
    ///
    /// Timestamps beyond the calendar's range clamp to its first or last
    /// representable second.
    pub fn from_unix(secs: i64) -> Self {
        let secs = secs.clamp(min_utc(), max_utc());
        let dt = DateTime::from_timestamp(secs, 0).unwrap_or(DateTime::<Utc>::MIN_UTC);

        Self {
            year: dt.year(),
            month: dt.month() as i32,
            day: dt.day() as i32,
            hour: dt.hour() as i32,
            minute: dt.minute() as i32,
            second: dt.second() as i32,
            weekday: dt.weekday().num_days_from_sunday() as u8,
            year_day: dt.ordinal0() as u16,
            dst: DstFlag::Standard,
        }
    }

    /// Normalize the fields into a Unix timestamp.
    ///
    /// `utc_offset_secs` is the zone offset of the fields (seconds east of
    /// UTC); `dst_offset_secs` is subtracted as well when `dst` is
    /// [`DstFlag::InEffect`]. Results beyond the calendar's range saturate.
    pub fn to_unix(&self, utc_offset_secs: i32, dst_offset_secs: i32) -> i64 {
        let months = i64::from(self.month) - 1;
        let year = i64::from(self.year) + months.div_euclid(12);
        let month = months.rem_euclid(12) as u32 + 1;
        let elapsed =
            i64::from(self.hour) * 3600 + i64::from(self.minute) * 60 + i64::from(self.second);

        let offset = match self.dst {
            DstFlag::InEffect => i64::from(utc_offset_secs) + i64::from(dst_offset_secs),
            DstFlag::Standard | DstFlag::Infer => i64::from(utc_offset_secs),
        };

        // Shift the year into 2000..2400 and add whole cycles back, so
        // fields far outside chrono's range still sum exactly.
        let era = (year - 2000).div_euclid(400);
        let year_of_era = (year - 2000).rem_euclid(400) + 2000;
        let Some(first) = NaiveDate::from_ymd_opt(year_of_era as i32, month, 1) else {
            return if year < 1970 { min_utc() } else { max_utc() };
        };

        let days = i128::from(era) * DAYS_PER_ERA
            + i128::from(first.num_days_from_ce())
            - EPOCH_DAYS_FROM_CE
            + i128::from(self.day)
            - 1;
        let secs = days * SECONDS_PER_DAY + i128::from(elapsed) - i128::from(offset);

        secs.clamp(i128::from(min_utc()), i128::from(max_utc())) as i64
    }
}

fn min_utc() -> i64 {
    DateTime::<Utc>::MIN_UTC.timestamp()
}

fn max_utc() -> i64 {
    DateTime::<Utc>::MAX_UTC.timestamp()
}

impl fmt::Display for CalendarTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}
