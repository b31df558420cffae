//! Time-of-day theme schedule.
//!
//! A [`Schedule`] is an ordered list of [`ScheduleSlot`]s. At any minute of
//! the day the **first** slot whose window contains that minute wins, so
//! callers express precedence by ordering.
//!
//! # Window Semantics
//!
//! A slot `from..to` contains `now` when:
//!
//! - `from < to`: `from <= now < to`
//! - `to <= from` (wraps past midnight): `now >= from || now < to`
//!
//! `from == to` therefore covers the whole day.

mod clock;
mod ticker;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ThemeError;

pub use clock::{Clock, FixedClock, SystemClock};
pub use ticker::{ManualTicker, ThreadTicker, TickCallback, Ticker};

/// Minutes in a day.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// A minute of the day, `00:00` through `23:59`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// Builds a time from hours and minutes, or `None` if out of range.
    pub fn new(hours: u8, minutes: u8) -> Option<Self> {
        if hours < 24 && minutes < 60 {
            Some(Self(u16::from(hours) * 60 + u16::from(minutes)))
        } else {
            None
        }
    }

    /// Builds a time from a minute-of-day, wrapping at midnight.
    pub fn from_minute_of_day(minute: u16) -> Self {
        Self(minute % MINUTES_PER_DAY)
    }

    pub fn minute_of_day(self) -> u16 {
        self.0
    }
}

impl FromStr for TimeOfDay {
    type Err = ThemeError;

    /// Parses `H:MM` or `HH:MM`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ThemeError::InvalidTimeOfDay {
            value: value.to_string(),
        };
        let (hours, minutes) = value.trim().split_once(':').ok_or_else(invalid)?;
        if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
            return Err(invalid());
        }
        let hours: u8 = hours.parse().map_err(|_| invalid())?;
        let minutes: u8 = minutes.parse().map_err(|_| invalid())?;
        Self::new(hours, minutes).ok_or_else(invalid)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

/// Unparsed schedule entry, as written in options (`{theme, from, to}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub theme: String,
    pub from: String,
    pub to: String,
}

impl ScheduleEntry {
    pub fn new(theme: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            theme: theme.into(),
            from: from.into(),
            to: to.into(),
        }
    }
}

/// A time window mapped to a theme name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSlot {
    pub theme: String,
    pub from: TimeOfDay,
    pub to: TimeOfDay,
}

impl ScheduleSlot {
    pub fn new(theme: impl Into<String>, from: TimeOfDay, to: TimeOfDay) -> Self {
        Self {
            theme: theme.into(),
            from,
            to,
        }
    }

    /// Returns true when the window contains `now`.
    pub fn contains(&self, now: TimeOfDay) -> bool {
        if self.to <= self.from {
            now >= self.from || now < self.to
        } else {
            self.from <= now && now < self.to
        }
    }
}

impl TryFrom<&ScheduleEntry> for ScheduleSlot {
    type Error = ThemeError;

    fn try_from(entry: &ScheduleEntry) -> Result<Self, Self::Error> {
        Ok(Self::new(
            entry.theme.clone(),
            entry.from.parse()?,
            entry.to.parse()?,
        ))
    }
}

/// Ordered list of slots; first match wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    slots: Vec<ScheduleSlot>,
}

impl Schedule {
    pub fn new(slots: Vec<ScheduleSlot>) -> Self {
        Self { slots }
    }

    /// Parses entries, dropping malformed ones with a warning.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a ScheduleEntry>) -> Self {
        let slots = entries
            .into_iter()
            .filter_map(|entry| match ScheduleSlot::try_from(entry) {
                Ok(slot) => Some(slot),
                Err(e) => {
                    tracing::warn!(theme = %entry.theme, error = %e, "ignoring schedule slot");
                    None
                }
            })
            .collect();
        Self { slots }
    }

    /// Returns the theme of the first slot containing `now`.
    pub fn theme_at(&self, now: TimeOfDay) -> Option<&str> {
        self.matching(now).next()
    }

    /// Themes of every slot containing `now`, in precedence order.
    pub fn matching(&self, now: TimeOfDay) -> impl Iterator<Item = &str> {
        self.slots
            .iter()
            .filter(move |slot| slot.contains(now))
            .map(|slot| slot.theme.as_str())
    }

    pub fn slots(&self) -> &[ScheduleSlot] {
        &self.slots
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
