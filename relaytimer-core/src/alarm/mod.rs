//! Recurring calendar alarms
//!
//! Each alarm slot holds one [`Alarm`]; the application ticks every slot
//! with the current time and reads back whether the alarm is active.

mod interval;
mod schedule;

pub use interval::{Granularity, IntervalPeriod};
pub use schedule::{
    Alarm, AlarmPhase, DEFAULT_DURATION_MINUTES, MAX_DURATION_MINUTES, MAX_INTERVAL_COUNT,
    MIN_INTERVAL_COUNT,
};

/// Number of alarm slots (ids 0-16)
pub const ALARM_SLOTS: usize = 17;

/// Identifier of an alarm slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmId(u8);

impl AlarmId {
    /// Create an id, returning `None` if there is no such slot
    pub fn new(id: u8) -> Option<Self> {
        if (id as usize) < ALARM_SLOTS {
            Some(Self(id))
        } else {
            None
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Slot index into an alarm table
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}
