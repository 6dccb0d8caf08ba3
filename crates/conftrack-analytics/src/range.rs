//! Reporting range selectors
//!
//! The dashboard asks for one of five fixed ranges; each maps to a
//! bucket granularity and a window anchored at the current instant:
//! `7d`/`14d`/`30d` are daily, `3m` is thirteen 7-day buckets aligned
//! to the window start, `1y` is twelve calendar months.

use crate::error::AnalyticsError;
use chrono::{DateTime, Datelike, Duration, Months, TimeZone, Utc};
use std::fmt;
use std::str::FromStr;

/// Bucket resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Day,
    /// 7-day steps aligned to the window start
    Week,
    /// Calendar months
    Month,
}

/// One of the five supported reporting ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSelector {
    SevenDays,
    FourteenDays,
    ThirtyDays,
    ThreeMonths,
    OneYear,
}

impl RangeSelector {
    /// The wire value (`7d`, `14d`, `30d`, `3m`, `1y`).
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SevenDays => "7d",
            Self::FourteenDays => "14d",
            Self::ThirtyDays => "30d",
            Self::ThreeMonths => "3m",
            Self::OneYear => "1y",
        }
    }

    /// Bucket resolution for this range.
    #[inline]
    #[must_use]
    pub fn granularity(&self) -> Granularity {
        match self {
            Self::SevenDays | Self::FourteenDays | Self::ThirtyDays => Granularity::Day,
            Self::ThreeMonths => Granularity::Week,
            Self::OneYear => Granularity::Month,
        }
    }

    /// Number of buckets the series must contain, rows or not.
    #[inline]
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        match self {
            Self::SevenDays => 7,
            Self::FourteenDays => 14,
            Self::ThirtyDays => 30,
            Self::ThreeMonths => 13,
            Self::OneYear => 12,
        }
    }

    /// Start of the first bucket, such that `now` falls in the last.
    #[must_use]
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self.granularity() {
            Granularity::Day => {
                midnight(now) - Duration::days(self.bucket_count() as i64 - 1)
            }
            Granularity::Week => midnight(now) - Duration::days(7 * (self.bucket_count() as i64 - 1)),
            Granularity::Month => {
                let months_back = self.bucket_count() as u32 - 1;
                month_start(now)
                    .checked_sub_months(Months::new(months_back))
                    .unwrap_or(now)
            }
        }
    }
}

impl FromStr for RangeSelector {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "7d" => Ok(Self::SevenDays),
            "14d" => Ok(Self::FourteenDays),
            "30d" => Ok(Self::ThirtyDays),
            "3m" => Ok(Self::ThreeMonths),
            "1y" => Ok(Self::OneYear),
            other => Err(AnalyticsError::InvalidRange(other.to_string())),
        }
    }
}

impl fmt::Display for RangeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 00:00:00 UTC of the instant's date.
#[must_use]
pub fn midnight(instant: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(instant.year(), instant.month(), instant.day(), 0, 0, 0)
        .single()
        .unwrap_or(instant)
}

/// First day of the instant's month, midnight UTC.
#[must_use]
pub fn month_start(instant: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(instant.year(), instant.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(instant)
}
