//! Reservation keys and days

use std::fmt;

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Earliest year a reservation may be made for
pub const MIN_YEAR: i32 = 2017;

/// Number of hourly slots in a day
pub const SLOTS_PER_DAY: usize = 24;

/// A single bookable hour
///
/// Equality and hashing are structural over all four fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReservationKey {
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub slot: i32,
}

impl ReservationKey {
    pub fn new(year: i32, month: i32, day: i32, slot: i32) -> Self {
        Self {
            year,
            month,
            day,
            slot,
        }
    }

    /// Range check; no calendar normalization
    pub fn is_valid(&self) -> bool {
        self.year >= MIN_YEAR
            && (1..=12).contains(&self.month)
            && (1..=31).contains(&self.day)
            && (0..SLOTS_PER_DAY as i32).contains(&self.slot)
    }

    /// The date this key falls on
    pub fn day(&self) -> Day {
        Day::new(self.year, self.month, self.day)
    }
}

impl fmt::Display for ReservationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}({})", self.day, self.month, self.year, self.slot)
    }
}

/// Date part of a [`ReservationKey`]
///
/// Field order makes the derived `Ord` lexicographic on `(year, month, day)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Day {
    pub year: i32,
    pub month: i32,
    pub day: i32,
}

impl Day {
    pub fn new(year: i32, month: i32, day: i32) -> Self {
        Self { year, month, day }
    }

    /// Today's date in local time
    pub fn today() -> Self {
        Local::now().date_naive().into()
    }

    /// Today shifted by `days` (negative looks back)
    ///
    /// Fails with [`StoreError::DayOutOfRange`] if the result falls outside
    /// the representable date range.
    pub fn in_days(days: i64) -> Result<Self> {
        chrono::Duration::try_days(days)
            .and_then(|offset| Local::now().date_naive().checked_add_signed(offset))
            .map(Day::from)
            .ok_or(StoreError::DayOutOfRange(days))
    }

    /// Key for `slot` on this day
    pub fn key(&self, slot: i32) -> ReservationKey {
        ReservationKey::new(self.year, self.month, self.day, slot)
    }

    /// Calendar date, if this day exists in the proleptic Gregorian calendar
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        let month = u32::try_from(self.month).ok()?;
        let day = u32::try_from(self.day).ok()?;
        NaiveDate::from_ymd_opt(self.year, month, day)
    }
}

impl From<NaiveDate> for Day {
    fn from(date: NaiveDate) -> Self {
        Day::new(date.year(), date.month() as i32, date.day() as i32)
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.day, self.month, self.year)
    }
}
