//! Alarm state machine
//!
//! An alarm counts recurrences of its target time. When the count reaches
//! the configured interval count the alarm triggers and stays active for
//! its duration, measured from the moment it fired.

use core::fmt;

use super::interval::IntervalPeriod;
use crate::datetime::{Datetime, SECONDS_PER_MINUTE};

/// Active time used when none (or zero) is given
pub const DEFAULT_DURATION_MINUTES: u16 = 60;

/// Longest duration expressible on the wire (four digits)
pub const MAX_DURATION_MINUTES: u16 = 9999;

/// Smallest interval count
pub const MIN_INTERVAL_COUNT: u8 = 1;

/// Largest interval count
pub const MAX_INTERVAL_COUNT: u8 = 50;

/// Where an alarm is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmPhase {
    /// No recurrence counted yet
    Idle,
    /// Some recurrences counted, not yet enough to fire
    Counting,
    /// Fired and still within its duration
    Triggered,
}

/// A recurring calendar alarm
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Alarm {
    target: Datetime,
    period: IntervalPeriod,
    interval_count: u8,
    duration_minutes: u16,
    trigger_count: u8,
    triggered: bool,
    /// Unix time after which a triggered alarm clears
    deactivate_at: u32,
    /// Minute (unix seconds / 60) of the last counted match
    last_match_minute: Option<u32>,
    valid: bool,
}

impl Default for Alarm {
    /// An unset alarm: never triggers
    fn default() -> Self {
        Self {
            target: Datetime::default(),
            period: IntervalPeriod::Year,
            interval_count: MIN_INTERVAL_COUNT,
            duration_minutes: DEFAULT_DURATION_MINUTES,
            trigger_count: 0,
            triggered: false,
            deactivate_at: 0,
            last_match_minute: None,
            valid: false,
        }
    }
}

impl Alarm {
    /// Create an armed alarm
    ///
    /// `interval_count` is clamped to 1-50 and `duration_minutes` to at most
    /// 9999; a duration of zero means the default of 60 minutes.
    pub fn new(
        period: IntervalPeriod,
        target: Datetime,
        interval_count: u8,
        duration_minutes: u16,
    ) -> Self {
        let duration_minutes = match duration_minutes {
            0 => DEFAULT_DURATION_MINUTES,
            d => d.min(MAX_DURATION_MINUTES),
        };
        Self {
            target,
            period,
            interval_count: interval_count.clamp(MIN_INTERVAL_COUNT, MAX_INTERVAL_COUNT),
            duration_minutes,
            valid: true,
            ..Self::default()
        }
    }

    pub fn target(&self) -> &Datetime {
        &self.target
    }

    pub fn period(&self) -> IntervalPeriod {
        self.period
    }

    pub fn interval_count(&self) -> u8 {
        self.interval_count
    }

    pub fn duration_minutes(&self) -> u16 {
        self.duration_minutes
    }

    /// Recurrences counted since the alarm last fired
    pub fn trigger_count(&self) -> u8 {
        self.trigger_count
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered
    }

    /// Whether the alarm was built from a target time
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Unix time at which an active alarm stops being triggered
    pub fn deactivate_at(&self) -> u32 {
        self.deactivate_at
    }

    pub fn phase(&self) -> AlarmPhase {
        if self.triggered {
            AlarmPhase::Triggered
        } else if self.trigger_count > 0 {
            AlarmPhase::Counting
        } else {
            AlarmPhase::Idle
        }
    }

    /// Advance the alarm to the current time and return whether it is triggered
    ///
    /// Times must be non-decreasing between calls. A match is counted at
    /// most once per calendar minute: any number of ticks within the same
    /// matching minute add one recurrence, not one per tick. An invalid
    /// alarm is left untouched and reports `false`.
    pub fn set_current_time(&mut self, now: &Datetime) -> bool {
        if !self.valid {
            return false;
        }

        let now_seconds = now.to_unix_seconds();

        if self.triggered {
            if now_seconds > self.deactivate_at {
                self.triggered = false;
            }
            return self.triggered;
        }

        if !self.period.matches(&self.target, now) {
            return false;
        }

        let minute = now_seconds / SECONDS_PER_MINUTE;
        if self.last_match_minute == Some(minute) {
            return false;
        }
        self.last_match_minute = Some(minute);

        self.trigger_count = self.trigger_count.saturating_add(1);
        if self.trigger_count >= self.interval_count {
            self.triggered = true;
            self.trigger_count = 0;
            self.deactivate_at =
                now_seconds.saturating_add(self.duration_minutes as u32 * SECONDS_PER_MINUTE);
        }
        self.triggered
    }

    /// Clear the triggered state immediately
    ///
    /// The recurrence count is kept, so the alarm fires again only after a
    /// further full set of matches.
    pub fn deactivate(&mut self) {
        self.triggered = false;
    }
}

impl PartialEq for Alarm {
    /// Two alarms are equal when they are configured the same, regardless
    /// of their runtime state
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
            && self.period == other.period
            && self.interval_count == other.interval_count
            && self.duration_minutes == other.duration_minutes
    }
}

impl Eq for Alarm {}

impl fmt::Display for Alarm {
    /// `DDD YY-MM-DD HH:MM:SS rNN iP dNNNNN`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} r{:02} i{} d{:05}",
            self.target,
            self.interval_count,
            self.period.code(),
            self.duration_minutes
        )
    }
}
