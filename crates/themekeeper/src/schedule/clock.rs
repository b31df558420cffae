//! Wall-clock sources for the schedule.

use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;

use chrono::{Local, Timelike};

use super::TimeOfDay;

/// Reports the current local time of day.
pub trait Clock: Send + Sync {
    fn now(&self) -> TimeOfDay;
}

/// Local time from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> TimeOfDay {
        let now = Local::now();
        // hour() < 24 and minute() < 60, so both fit in u16 without wrapping.
        TimeOfDay::from_minute_of_day((now.hour() * 60 + now.minute()) as u16)
    }
}

/// A settable clock. Clones share the same time.
#[derive(Debug, Clone)]
pub struct FixedClock {
    minute: Arc<AtomicU16>,
}

impl FixedClock {
    pub fn new(now: TimeOfDay) -> Self {
        Self {
            minute: Arc::new(AtomicU16::new(now.minute_of_day())),
        }
    }

    pub fn set(&self, now: TimeOfDay) {
        self.minute.store(now.minute_of_day(), Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> TimeOfDay {
        TimeOfDay::from_minute_of_day(self.minute.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_shared_between_clones() {
        let clock = FixedClock::new(TimeOfDay::new(8, 0).unwrap());
        let other = clock.clone();
        other.set(TimeOfDay::new(21, 15).unwrap());
        assert_eq!(clock.now().to_string(), "21:15");
    }

    #[test]
    fn test_system_clock_in_range() {
        assert!(SystemClock.now().minute_of_day() < super::super::MINUTES_PER_DAY);
    }
}
