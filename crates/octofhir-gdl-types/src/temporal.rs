//! Temporal values: date-times and time periods

use chrono::{
    DateTime, Datelike, Days, FixedOffset, Months, NaiveDate, NaiveDateTime, Offset,
    SecondsFormat, TimeDelta, TimeZone, Timelike, Utc,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ValueError;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// A date-time, either zoned (fixed offset) or naive.
///
/// Naive date-times are read as UTC whenever an instant is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct DvDateTime {
    /// Wall-clock date and time
    pub local: NaiveDateTime,
    /// UTC offset, when known
    pub offset: Option<FixedOffset>,
}

impl DvDateTime {
    /// Create a naive date-time
    pub fn naive(local: NaiveDateTime) -> Self {
        Self { local, offset: None }
    }

    /// Create a zoned date-time from a chrono value
    pub fn zoned(value: DateTime<FixedOffset>) -> Self {
        Self {
            local: value.naive_local(),
            offset: Some(*value.offset()),
        }
    }

    /// Parse an RFC 3339 date-time, falling back to a naive ISO 8601 date-time
    pub fn parse(raw: &str) -> Result<Self, ValueError> {
        let raw = raw.trim();
        if let Ok(zoned) = DateTime::parse_from_rfc3339(raw) {
            return Ok(Self::zoned(zoned));
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|pattern| NaiveDateTime::parse_from_str(raw, pattern).ok())
            .map(Self::naive)
            .ok_or_else(|| ValueError::parse("DateTime", raw))
    }

    /// The instant this value denotes, with naive values pinned to UTC
    pub fn to_fixed(&self) -> DateTime<FixedOffset> {
        let offset = self.offset.unwrap_or_else(utc_offset);
        offset
            .from_local_datetime(&self.local)
            .single()
            .unwrap_or_else(|| offset.from_utc_datetime(&self.local))
    }

    /// Milliseconds since the Unix epoch
    pub fn epoch_millis(&self) -> i64 {
        self.to_fixed().timestamp_millis()
    }

    /// Build a date-time from epoch milliseconds, rendered in the given offset
    pub fn from_epoch_millis(millis: i64, offset: Option<FixedOffset>) -> Option<Self> {
        let utc = DateTime::from_timestamp_millis(millis)?;
        let zone = offset.unwrap_or_else(utc_offset);
        Some(Self {
            local: utc.with_timezone(&zone).naive_local(),
            offset,
        })
    }

    pub fn year(&self) -> i32 {
        self.local.year()
    }

    pub fn month(&self) -> u32 {
        self.local.month()
    }

    pub fn day(&self) -> u32 {
        self.local.day()
    }

    pub fn hour(&self) -> u32 {
        self.local.hour()
    }

    pub fn minute(&self) -> u32 {
        self.local.minute()
    }

    pub fn second(&self) -> u32 {
        self.local.second()
    }

    /// Render with a chrono strftime pattern
    pub fn format(&self, pattern: &str) -> String {
        match self.offset {
            Some(_) => self.to_fixed().format(pattern).to_string(),
            None => self.local.format(pattern).to_string(),
        }
    }
}

impl fmt::Display for DvDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset {
            Some(_) => write!(f, "{}", self.to_fixed().to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            None => write!(f, "{}", self.local.format("%Y-%m-%dT%H:%M:%S%.f")),
        }
    }
}

impl From<DvDateTime> for String {
    fn from(value: DvDateTime) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for DvDateTime {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// Zero offset used for naive values
pub fn utc_offset() -> FixedOffset {
    Utc.fix()
}

/// Milliseconds since the Unix epoch of a calendar date at midnight UTC
pub fn date_epoch_millis(date: &NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc().timestamp_millis())
        .unwrap_or_default()
}

/// Units a time period can be expressed in (UCUM codes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeUnit {
    /// `a`
    Years,
    /// `mo`
    Months,
    /// `wk`
    Weeks,
    /// `d`
    Days,
    /// `h`
    Hours,
    /// `min`
    Minutes,
    /// `s`
    Seconds,
}

impl TimeUnit {
    /// Look up a unit by its UCUM code
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol.trim() {
            "a" => Some(Self::Years),
            "mo" => Some(Self::Months),
            "wk" => Some(Self::Weeks),
            "d" => Some(Self::Days),
            "h" => Some(Self::Hours),
            "min" => Some(Self::Minutes),
            "s" => Some(Self::Seconds),
            _ => None,
        }
    }

    /// UCUM code of the unit
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Years => "a",
            Self::Months => "mo",
            Self::Weeks => "wk",
            Self::Days => "d",
            Self::Hours => "h",
            Self::Minutes => "min",
            Self::Seconds => "s",
        }
    }

    /// Calendar units shift a date by calendar rules (month lengths, leap
    /// years); the rest are fixed millisecond counts.
    pub const fn is_calendar(&self) -> bool {
        matches!(self, Self::Years | Self::Months | Self::Weeks | Self::Days)
    }

    /// Average length of one unit in milliseconds
    pub fn nominal_millis(&self) -> f64 {
        match self {
            Self::Years => 365.2425 * MILLIS_PER_DAY,
            Self::Months => 365.2425 * MILLIS_PER_DAY / 12.0,
            Self::Weeks => 7.0 * MILLIS_PER_DAY,
            Self::Days => MILLIS_PER_DAY,
            Self::Hours => 3_600_000.0,
            Self::Minutes => 60_000.0,
            Self::Seconds => 1_000.0,
        }
    }
}

/// An amount of time such as `1,a` or `12,h`.
///
/// Calendar periods (years, months, weeks, days) only have a length
/// relative to an anchor instant; hours, minutes and seconds are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimePeriod {
    pub amount: f64,
    pub unit: TimeUnit,
}

impl TimePeriod {
    pub fn new(amount: f64, unit: TimeUnit) -> Self {
        Self { amount, unit }
    }

    /// Parse `amount,unit` such as `1,a` or `1.5,h`
    pub fn parse(raw: &str) -> Result<Self, ValueError> {
        let raw = raw.trim();
        let (amount, unit) = raw
            .split_once(',')
            .ok_or_else(|| ValueError::parse("Duration", raw))?;
        let amount = amount
            .trim()
            .parse::<f64>()
            .map_err(|_| ValueError::parse("Duration", raw))?;
        let unit = TimeUnit::from_symbol(unit).ok_or_else(|| ValueError::parse("Duration", raw))?;
        Ok(Self::new(amount, unit))
    }

    /// The instant `anchor + self`
    pub fn add_to(&self, anchor: DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
        self.shift(anchor, self.amount)
    }

    /// The instant `anchor - self`
    pub fn subtract_from(&self, anchor: DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
        self.shift(anchor, -self.amount)
    }

    /// Length of the period in milliseconds when laid out from `anchor`
    pub fn millis_from(&self, anchor: DateTime<FixedOffset>) -> Option<i64> {
        self.add_to(anchor)
            .map(|end| end.timestamp_millis() - anchor.timestamp_millis())
    }

    // The whole part of a calendar amount follows calendar rules, a
    // fractional remainder is added with the unit's nominal length.
    fn shift(&self, anchor: DateTime<FixedOffset>, amount: f64) -> Option<DateTime<FixedOffset>> {
        if !amount.is_finite() {
            return None;
        }
        if !self.unit.is_calendar() {
            return anchor.checked_add_signed(millis_delta(amount * self.unit.nominal_millis())?);
        }

        let whole = amount.trunc();
        let fraction = amount - whole;
        let whole = whole as i64;
        let shifted = match self.unit {
            TimeUnit::Years => shift_months(anchor, whole.checked_mul(12)?)?,
            TimeUnit::Months => shift_months(anchor, whole)?,
            TimeUnit::Weeks => shift_days(anchor, whole.checked_mul(7)?)?,
            _ => shift_days(anchor, whole)?,
        };

        if fraction == 0.0 {
            return Some(shifted);
        }
        shifted.checked_add_signed(millis_delta(fraction * self.unit.nominal_millis())?)
    }
}

/// A delta of `millis` milliseconds, or `None` when it does not fit
fn millis_delta(millis: f64) -> Option<TimeDelta> {
    let millis = millis.round();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return None;
    }
    TimeDelta::try_milliseconds(millis as i64)
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.amount.fract() == 0.0 {
            write!(f, "{},{}", self.amount as i64, self.unit.symbol())
        } else {
            write!(f, "{},{}", self.amount, self.unit.symbol())
        }
    }
}

fn shift_months(anchor: DateTime<FixedOffset>, months: i64) -> Option<DateTime<FixedOffset>> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        anchor.checked_add_months(magnitude)
    } else {
        anchor.checked_sub_months(magnitude)
    }
}

fn shift_days(anchor: DateTime<FixedOffset>, days: i64) -> Option<DateTime<FixedOffset>> {
    let magnitude = Days::new(days.unsigned_abs());
    if days >= 0 {
        anchor.checked_add_days(magnitude)
    } else {
        anchor.checked_sub_days(magnitude)
    }
}
