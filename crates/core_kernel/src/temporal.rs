//! Temporal types for the tenancy lifecycle
//!
//! This module provides the time handling the core depends on:
//! - A `Clock` abstraction so expiry checks are deterministic under test
//! - Stage countdowns rendered as hours/minutes/seconds for observers
//! - The post-tenancy inspection window, anchored to the property's timezone

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use thiserror::Error;

/// Length of the post-tenancy inspection window in days
pub const INSPECTION_WINDOW_DAYS: i64 = 7;

/// Timezone wrapper for property jurisdictions
///
/// Wraps chrono_tz::Tz with custom serialization support. Lease dates are
/// calendar dates; the jurisdiction timezone decides which instant a date
/// begins at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Tz::from_str(&s)
            .map(Timezone)
            .map_err(|_| serde::de::Error::custom(format!("Invalid timezone: {}", s)))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Converts a UTC datetime to the local timezone
    pub fn to_local(&self, utc: DateTime<Utc>) -> DateTime<Tz> {
        utc.with_timezone(&self.0)
    }

    /// Gets the start of day (00:00:00) in this timezone as UTC
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        date.and_hms_opt(0, 0, 0)
            .unwrap()
            .and_local_timezone(self.0)
            .earliest()
            .expect("Invalid timezone conversion")
            .with_timezone(&Utc)
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::UTC)
    }
}

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid period: start {start} must be before end {end}")]
    InvalidPeriod { start: String, end: String },
}

/// Provides the current time
///
/// Production code uses [`SystemClock`]; tests substitute a fixed or
/// steppable implementation so expiry sweeps are reproducible.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Remaining time before a stage deadline, rendered for observers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    pub hours: u64,
    pub minutes: u8,
    pub seconds: u8,
}

impl Countdown {
    /// Computes the countdown from `now` to `deadline`
    ///
    /// Saturates at zero once the deadline has passed.
    pub fn until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let remaining = (deadline - now).num_seconds().max(0) as u64;
        Self {
            hours: remaining / 3600,
            minutes: ((remaining % 3600) / 60) as u8,
            seconds: (remaining % 60) as u8,
        }
    }

    /// Returns true once the deadline has passed
    pub fn is_elapsed(&self) -> bool {
        self.hours == 0 && self.minutes == 0 && self.seconds == 0
    }
}

/// A lease term as an inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TemporalError> {
        if start > end {
            return Err(TemporalError::InvalidPeriod {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// The post-tenancy inspection window
///
/// Defined as `[tenancy_end_date, tenancy_end_date + 7 days)` anchored to
/// the property's timezone. The landlord may raise deduction claims only
/// while the window is open; once it closes the undisputed remainder of
/// the deposit is released automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl InspectionWindow {
    /// Computes the window for a tenancy ending on the given date
    pub fn for_tenancy_end(end_date: NaiveDate, tz: &Timezone) -> Self {
        let start = tz.start_of_day(end_date);
        Self {
            start,
            end: start + Duration::days(INSPECTION_WINDOW_DAYS),
        }
    }

    /// The instant the window opens (the tenancy end)
    pub fn opens_at(&self) -> DateTime<Utc> {
        self.start
    }

    /// The instant the window closes
    pub fn closes_at(&self) -> DateTime<Utc> {
        self.end
    }

    /// True while claims may still be raised
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        now >= self.start && now < self.end
    }

    /// True before the tenancy has ended
    pub fn not_yet_open(&self, now: DateTime<Utc>) -> bool {
        now < self.start
    }

    /// True once the window has closed
    pub fn has_closed(&self, now: DateTime<Utc>) -> bool {
        now >= self.end
    }

    /// Remaining time before the window closes
    pub fn countdown(&self, now: DateTime<Utc>) -> Countdown {
        Countdown::until(self.end, now)
    }
}
