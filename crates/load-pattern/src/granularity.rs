// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Time granularities and the keys they produce.
//!
//! A pattern file's header names the time components its rows are indexed
//! by. That set of components is a [`Granularity`]; it decides the shape of
//! a [`PatternKey`], how a wall-clock instant is bucketed, and how long one
//! full cycle of the pattern lasts.
//!
//! ```text
//! header        granularity      key                   cycle
//! s,value       Second           (second)              1 minute
//! m,value       Minute           (minute)              1 hour
//! m,s,value     MinuteSecond     (minute, second)      1 hour
//! h,m,value     HourMinute       (hour, minute)        1 day
//! d,h,m,value   DayHourMinute    (weekday, hour, min)  1 week
//! ```

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::fmt;

/// The set of time components a pattern is indexed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Granularity {
    Second,
    Minute,
    MinuteSecond,
    HourMinute,
    DayHourMinute,
}

/// A single time component of a pattern key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Weekday,
    Hour,
    Minute,
    Second,
}

impl TimeUnit {
    /// Parses a header column name (`"d"`, `"h"`, `"m"`, `"s"`).
    pub fn from_column(name: &str) -> Option<Self> {
        match name.trim() {
            "d" => Some(Self::Weekday),
            "h" => Some(Self::Hour),
            "m" => Some(Self::Minute),
            "s" => Some(Self::Second),
            _ => None,
        }
    }

    /// Exclusive upper bound of a component value (`0..max`).
    pub fn range_max(self) -> u32 {
        match self {
            Self::Weekday => 7,
            Self::Hour => 24,
            Self::Minute | Self::Second => 60,
        }
    }

    /// Length of one unit in seconds.
    pub fn seconds(self) -> u64 {
        match self {
            Self::Weekday => 24 * 60 * 60,
            Self::Hour => 60 * 60,
            Self::Minute => 60,
            Self::Second => 1,
        }
    }

    /// Column name as it appears in a pattern header.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weekday => "d",
            Self::Hour => "h",
            Self::Minute => "m",
            Self::Second => "s",
        }
    }
}

impl Granularity {
    /// Resolves a granularity from the time columns of a pattern header.
    ///
    /// Returns `None` for any combination other than the five supported ones.
    pub fn from_units(units: &[TimeUnit]) -> Option<Self> {
        use TimeUnit::*;
        match units {
            [Second] => Some(Self::Second),
            [Minute] => Some(Self::Minute),
            [Minute, Second] => Some(Self::MinuteSecond),
            [Hour, Minute] => Some(Self::HourMinute),
            [Weekday, Hour, Minute] => Some(Self::DayHourMinute),
            _ => None,
        }
    }

    /// The time components of a key, most significant first.
    pub fn units(self) -> &'static [TimeUnit] {
        use TimeUnit::*;
        match self {
            Self::Second => &[Second],
            Self::Minute => &[Minute],
            Self::MinuteSecond => &[Minute, Second],
            Self::HourMinute => &[Hour, Minute],
            Self::DayHourMinute => &[Weekday, Hour, Minute],
        }
    }

    /// Number of time components in a key.
    pub fn arity(self) -> usize {
        self.units().len()
    }

    /// The smallest (bucketed) unit, i.e. the last key component.
    pub fn smallest_unit(self) -> TimeUnit {
        match self {
            Self::Second | Self::MinuteSecond => TimeUnit::Second,
            Self::Minute | Self::HourMinute | Self::DayHourMinute => TimeUnit::Minute,
        }
    }

    /// Builds a key from already-validated row components.
    ///
    /// The caller guarantees `components.len() == self.arity()`.
    pub(crate) fn key_from_components(self, components: &[u32]) -> PatternKey {
        match (self, components) {
            (Self::Second, [s]) => PatternKey::Second(*s),
            (Self::Minute, [m]) => PatternKey::Minute(*m),
            (Self::MinuteSecond, [m, s]) => PatternKey::MinuteSecond(*m, *s),
            (Self::HourMinute, [h, m]) => PatternKey::HourMinute(*h, *m),
            (Self::DayHourMinute, [d, h, m]) => PatternKey::DayHourMinute(*d, *h, *m),
            _ => unreachable!("row arity is checked against the header before key construction"),
        }
    }

    /// Maps an instant to the key of the bucket containing it.
    ///
    /// The smallest component is floored to a multiple of `resolution`;
    /// larger components are taken as-is. Weekdays count from Monday = 0.
    pub fn key_for(self, t: NaiveDateTime, resolution: u32) -> PatternKey {
        let bucket = |v: u32| (v / resolution) * resolution;
        match self {
            Self::Second => PatternKey::Second(bucket(t.second())),
            Self::Minute => PatternKey::Minute(bucket(t.minute())),
            Self::MinuteSecond => PatternKey::MinuteSecond(t.minute(), bucket(t.second())),
            Self::HourMinute => PatternKey::HourMinute(t.hour(), bucket(t.minute())),
            Self::DayHourMinute => PatternKey::DayHourMinute(
                t.weekday().num_days_from_monday(),
                t.hour(),
                bucket(t.minute()),
            ),
        }
    }

    /// Returns the instant at which the cycle containing `t` begins.
    ///
    /// - `Second`: start of the current minute.
    /// - `Minute`, `MinuteSecond`: start of the current hour.
    /// - `HourMinute`: midnight of the current day.
    /// - `DayHourMinute`: Monday midnight of the current week.
    pub fn start_of_cycle(self, t: NaiveDateTime) -> NaiveDateTime {
        let date = t.date();
        // h and m come from a valid NaiveDateTime, so the fallback is never taken.
        let at = |date: NaiveDate, h: u32, m: u32| {
            date.and_hms_opt(h, m, 0)
                .unwrap_or_else(|| date.and_time(NaiveTime::default()))
        };
        match self {
            Self::Second => at(date, t.hour(), t.minute()),
            Self::Minute | Self::MinuteSecond => at(date, t.hour(), 0),
            Self::HourMinute => at(date, 0, 0),
            Self::DayHourMinute => {
                let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
                at(monday, 0, 0)
            }
        }
    }

    /// Length of the natural calendar cycle this granularity keys into.
    pub fn natural_cycle_seconds(self) -> u64 {
        match self {
            Self::Second => 60,
            Self::Minute | Self::MinuteSecond => 60 * 60,
            Self::HourMinute => 24 * 60 * 60,
            Self::DayHourMinute => 7 * 24 * 60 * 60,
        }
    }

    /// Short header-style name, e.g. `"d,h,m"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Second => "s",
            Self::Minute => "m",
            Self::MinuteSecond => "m,s",
            Self::HourMinute => "h,m",
            Self::DayHourMinute => "d,h,m",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookup key into a pattern table; arity and meaning follow [`Granularity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub enum PatternKey {
    Second(u32),
    Minute(u32),
    MinuteSecond(u32, u32),
    HourMinute(u32, u32),
    DayHourMinute(u32, u32, u32),
}

impl fmt::Display for PatternKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Second(s) => write!(f, "(s={s})"),
            Self::Minute(m) => write!(f, "(m={m})"),
            Self::MinuteSecond(m, s) => write!(f, "(m={m}, s={s})"),
            Self::HourMinute(h, m) => write!(f, "(h={h}, m={m})"),
            Self::DayHourMinute(d, h, m) => write!(f, "(d={d}, h={h}, m={m})"),
        }
    }
}
