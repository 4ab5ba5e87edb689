//! Real-time clock abstraction

use relaytimer_core::{Datetime, Weekday};

/// Real-time clock errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RtcError {
    /// The clock has never been set since power-up
    NotSet,
    /// Communication with the clock chip failed
    Bus,
    /// The clock holds or was given an impossible time
    InvalidTime,
}

/// Calendar clock
pub trait RealTimeClock {
    fn now(&mut self) -> Result<Datetime, RtcError>;

    fn set(&mut self, datetime: &Datetime) -> Result<(), RtcError>;
}

/// Clock kept in software from a tick source
///
/// The weekday is stored as given to [`RealTimeClock::set`] and advances
/// with the date, so it follows the user's setting even if that does not
/// match the calendar.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftRtc {
    seconds: Option<u32>,
    /// Days added to the calendar weekday
    weekday_shift: u8,
}

impl SoftRtc {
    /// A clock that has not been set
    pub const fn new() -> Self {
        Self {
            seconds: None,
            weekday_shift: 0,
        }
    }

    /// A clock already running at `datetime`
    pub fn starting_at(datetime: &Datetime) -> Result<Self, RtcError> {
        let mut rtc = Self::new();
        rtc.set(datetime)?;
        Ok(rtc)
    }

    /// Move the clock forward
    pub fn advance(&mut self, seconds: u32) {
        if let Some(current) = self.seconds.as_mut() {
            *current = current.saturating_add(seconds);
        }
    }

    pub fn is_set(&self) -> bool {
        self.seconds.is_some()
    }
}

impl RealTimeClock for SoftRtc {
    fn now(&mut self) -> Result<Datetime, RtcError> {
        let seconds = self.seconds.ok_or(RtcError::NotSet)?;
        let mut now = Datetime::from_unix_seconds(seconds).map_err(|_| RtcError::InvalidTime)?;
        let weekday = (now.weekday.index() + self.weekday_shift) % 7;
        now.weekday = Weekday::ALL[weekday as usize];
        Ok(now)
    }

    fn set(&mut self, datetime: &Datetime) -> Result<(), RtcError> {
        datetime.validate().map_err(|_| RtcError::InvalidTime)?;
        let seconds = datetime.to_unix_seconds();
        let calendar = Datetime::from_unix_seconds(seconds).map_err(|_| RtcError::InvalidTime)?;
        self.weekday_shift = (datetime.weekday.index() + 7 - calendar.weekday.index()) % 7;
        self.seconds = Some(seconds);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datetime(weekday: Weekday, year: u8, month: u8, day: u8, hour: u8) -> Datetime {
        Datetime::new(year, month, day, weekday, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_unset_clock() {
        let mut rtc = SoftRtc::new();
        rtc.advance(10);
        assert!(!rtc.is_set());
        assert_eq!(rtc.now(), Err(RtcError::NotSet));
    }

    #[test]
    fn test_advance_across_midnight() {
        // 2015-08-01 was a Saturday
        let start = datetime(Weekday::Saturday, 15, 7, 1, 23);
        let mut rtc = SoftRtc::starting_at(&start).unwrap();
        assert_eq!(rtc.now(), Ok(start));

        rtc.advance(3600);
        let now = rtc.now().unwrap();
        assert_eq!((now.month, now.day, now.hour), (7, 2, 0));
        assert_eq!(now.weekday, Weekday::Sunday);
    }

    #[test]
    fn test_weekday_follows_setting() {
        // Set as Monday although the date is a Saturday
        let start = datetime(Weekday::Monday, 15, 7, 1, 12);
        let mut rtc = SoftRtc::starting_at(&start).unwrap();
        assert_eq!(rtc.now().unwrap().weekday, Weekday::Monday);

        rtc.advance(24 * 3600);
        assert_eq!(rtc.now().unwrap().weekday, Weekday::Tuesday);
    }

    #[test]
    fn test_rejects_invalid_time() {
        let mut rtc = SoftRtc::new();
        let bad = Datetime {
            month: 12,
            ..Datetime::default()
        };
        assert_eq!(rtc.set(&bad), Err(RtcError::InvalidTime));
        assert!(!rtc.is_set());
    }
}
