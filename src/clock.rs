use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::str::FromStr;

/// Format used for day keys everywhere they are shown or stored
pub const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// A calendar day in the user's local time zone.
///
/// Serializes as `YYYY-MM-DD`. Ordering follows the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// The day before this one. Saturates at the earliest representable date.
    pub fn previous(&self) -> Self {
        Self(self.0.pred_opt().unwrap_or(self.0))
    }

    /// Shift by a signed number of days. Saturates at the representable range.
    pub fn offset(&self, days: i64) -> Self {
        let shifted = self
            .0
            .checked_add_signed(chrono::Duration::days(days))
            .unwrap_or(self.0);
        Self(shifted)
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DAY_KEY_FORMAT))
    }
}

impl FromStr for DayKey {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), DAY_KEY_FORMAT).map(Self)
    }
}

/// Source of "today" for everything that cares about day boundaries
pub trait Clock {
    fn today(&self) -> DayKey;
}

/// Wall clock in the device's local time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> DayKey {
        DayKey(Local::now().date_naive())
    }
}

/// A clock pinned to a chosen day, advanced by hand
#[derive(Debug, Clone)]
pub struct FixedClock {
    day: Cell<DayKey>,
}

impl FixedClock {
    pub fn new(day: DayKey) -> Self {
        Self { day: Cell::new(day) }
    }

    pub fn set(&self, day: DayKey) {
        self.day.set(day);
    }

    pub fn advance(&self, days: i64) {
        self.day.set(self.day.get().offset(days));
    }
}

impl Clock for FixedClock {
    fn today(&self) -> DayKey {
        self.day.get()
    }
}
