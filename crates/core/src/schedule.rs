//! Operating schedules and slots
//!
//! A clinic professional's recurring week is seven [`DayHours`] entries,
//! Sunday first. Stored rows may carry the weekly form or the legacy
//! scalar-hours-plus-day-list form; [`StoredSchedule::resolve`] normalizes
//! both into an [`OperatingSchedule`] once, at load time, before anything
//! reaches the availability calculator.

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Operating hours for one day of the week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHours {
    /// Whether the clinic is open this day; when false the day yields no
    /// slots regardless of start/end
    pub active: bool,
    /// Opening time of day
    pub start: NaiveTime,
    /// Closing time of day
    pub end: NaiveTime,
}

impl DayHours {
    pub fn open(start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            active: true,
            start,
            end,
        }
    }

    pub fn closed() -> Self {
        Self {
            active: false,
            start: NaiveTime::MIN,
            end: NaiveTime::MIN,
        }
    }

    /// Whole-hour slot bounds, `[start_hour, end_hour)`
    ///
    /// Sub-hour precision in the bounds is truncated: a day ending 18:30
    /// still yields its last slot at 17:00. Deliberate, not a rounding bug.
    pub fn hour_bounds(&self) -> (u32, u32) {
        (self.start.hour(), self.end.hour())
    }
}

/// Recurring weekly schedule, exactly seven entries, Sunday = index 0
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingSchedule(pub [DayHours; 7]);

impl OperatingSchedule {
    /// Schedule with every day closed
    pub fn closed() -> Self {
        Self([DayHours::closed(); 7])
    }

    /// Entry for a calendar date's weekday
    pub fn for_date(&self, date: NaiveDate) -> &DayHours {
        &self.0[date.weekday().num_days_from_sunday() as usize]
    }

    /// Entry by weekday index (Sunday = 0)
    pub fn day(&self, index: usize) -> Option<&DayHours> {
        self.0.get(index)
    }
}

/// Persisted schedule representation
///
/// Legacy rows carry a day list plus scalar start/end hours; the weekly
/// form wins whenever it is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum StoredSchedule {
    /// Canonical 7-entry weekly schedule
    Weekly { week: OperatingSchedule },
    /// Legacy scalar hours applied to a list of weekday indices (Sunday = 0)
    Legacy {
        days: Vec<u8>,
        start: NaiveTime,
        end: NaiveTime,
    },
}

impl StoredSchedule {
    /// Normalize into an [`OperatingSchedule`]
    ///
    /// Legacy day indices outside 0..=6 are ignored.
    pub fn resolve(&self) -> OperatingSchedule {
        match self {
            StoredSchedule::Weekly { week } => week.clone(),
            StoredSchedule::Legacy { days, start, end } => {
                let mut week = OperatingSchedule::closed();
                for &day in days {
                    if let Some(entry) = week.0.get_mut(day as usize) {
                        *entry = DayHours::open(*start, *end);
                    }
                }
                week
            }
        }
    }
}

/// A candidate appointment start time at whole-hour granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Slot {
    /// Hour of day, 0..=23
    pub hour: u32,
}

impl Slot {
    pub fn new(hour: u32) -> Self {
        Self { hour }
    }
}

impl std::fmt::Display for Slot {
    /// ISO local-time rendering used by the availability RPC ("HH:MM")
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:00", self.hour)
    }
}
