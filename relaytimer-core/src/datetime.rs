//! Calendar date and time of day
//!
//! The device RTC stores the year as a two-digit offset from 2000, so the
//! representable range is 2000-01-01 to 2099-12-31. Months are 0-based
//! (0 = January), days of the month are 1-based.

use core::fmt;

/// First year representable by the two-digit RTC year
pub const BASE_YEAR: u16 = 2000;

/// Largest two-digit year offset
pub const MAX_YEAR_OFFSET: u8 = 99;

/// Seconds in one minute
pub const SECONDS_PER_MINUTE: u32 = 60;

const SECONDS_PER_DAY: u32 = 86_400;

/// Days between 1970-01-01 and 2000-01-01
const DAYS_BEFORE_BASE_YEAR: u32 = 10_957;

/// Day names as they appear on the wire
const WEEKDAY_NAMES: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

/// Day of the week, numbered 0 = Sunday to 6 = Saturday
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Weekday {
    #[default]
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    /// All days in index order
    pub const ALL: [Weekday; 7] = [
        Weekday::Sunday,
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    /// Look up a day by its index (0 = Sunday)
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Index of this day (0 = Sunday)
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Three-letter upper-case abbreviation (`SUN`..`SAT`)
    pub fn abbreviation(self) -> &'static str {
        WEEKDAY_NAMES[self as usize]
    }

    /// Parse a three-letter upper-case abbreviation
    pub fn from_abbreviation(name: &[u8]) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|day| day.abbreviation().as_bytes() == name)
    }
}

/// Reasons a date or time does not exist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalendarError {
    /// Year offset beyond 99 (or a timestamp outside 2000-2099)
    Year,
    /// Month outside 0-11
    Month,
    /// Day does not exist in the given month and year
    Day,
    /// Hour outside 0-23
    Hour,
    /// Minute outside 0-59
    Minute,
    /// Second outside 0-59
    Second,
}

/// Check whether a four-digit Gregorian year is a leap year
pub fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in a 0-based month
///
/// Returns 0 for a month outside 0-11.
pub fn days_in_month(month: u8, leap_year: bool) -> u8 {
    match month {
        0 | 2 | 4 | 6 | 7 | 9 | 11 => 31,
        3 | 5 | 8 | 10 => 30,
        1 if leap_year => 29,
        1 => 28,
        _ => 0,
    }
}

fn days_in_year(year: u16) -> u32 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

/// A calendar date and time of day as kept by the RTC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Datetime {
    /// Year as an offset from 2000 (0-99)
    pub year: u8,
    /// Month, 0-based (0 = January)
    pub month: u8,
    /// Day of the month, 1-based
    pub day: u8,
    /// Day of the week
    pub weekday: Weekday,
    /// Hour (0-23)
    pub hour: u8,
    /// Minute (0-59)
    pub minute: u8,
    /// Second (0-59)
    pub second: u8,
}

impl Default for Datetime {
    /// Midnight on Saturday 2000-01-01
    fn default() -> Self {
        Self {
            year: 0,
            month: 0,
            day: 1,
            weekday: Weekday::Saturday,
            hour: 0,
            minute: 0,
            second: 0,
        }
    }
}

impl Datetime {
    /// Build a datetime, checking that it exists in the calendar
    ///
    /// The weekday is taken as given; it is not cross-checked against
    /// the date.
    pub fn new(
        year: u8,
        month: u8,
        day: u8,
        weekday: Weekday,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, CalendarError> {
        let datetime = Self {
            year,
            month,
            day,
            weekday,
            hour,
            minute,
            second,
        };
        datetime.validate()?;
        Ok(datetime)
    }

    /// Check every field against its calendar range
    pub fn validate(&self) -> Result<(), CalendarError> {
        if self.year > MAX_YEAR_OFFSET {
            return Err(CalendarError::Year);
        }
        if self.month > 11 {
            return Err(CalendarError::Month);
        }
        if self.day == 0 || self.day > days_in_month(self.month, self.is_leap_year()) {
            return Err(CalendarError::Day);
        }
        if self.hour > 23 {
            return Err(CalendarError::Hour);
        }
        if self.minute > 59 {
            return Err(CalendarError::Minute);
        }
        if self.second > 59 {
            return Err(CalendarError::Second);
        }
        Ok(())
    }

    /// Four-digit Gregorian year
    pub fn full_year(&self) -> u16 {
        BASE_YEAR + self.year as u16
    }

    /// Whether this datetime falls in a leap year
    pub fn is_leap_year(&self) -> bool {
        is_leap_year(self.full_year())
    }

    /// Days elapsed since 2000-01-01
    fn days_since_base(&self) -> u32 {
        let leap = self.is_leap_year();
        let years: u32 = (BASE_YEAR..self.full_year()).map(days_in_year).sum();
        let months: u32 = (0..self.month.min(12))
            .map(|m| days_in_month(m, leap) as u32)
            .sum();
        years + months + self.day.saturating_sub(1) as u32
    }

    /// Seconds since the Unix epoch (UTC, no leap seconds)
    pub fn to_unix_seconds(&self) -> u32 {
        let days = DAYS_BEFORE_BASE_YEAR + self.days_since_base();
        days * SECONDS_PER_DAY
            + self.hour as u32 * 3600
            + self.minute as u32 * SECONDS_PER_MINUTE
            + self.second as u32
    }

    /// Convert seconds since the Unix epoch back into a datetime
    ///
    /// The weekday is derived from the date. Fails for timestamps outside
    /// the 2000-2099 range of the RTC.
    pub fn from_unix_seconds(seconds: u32) -> Result<Self, CalendarError> {
        let days = seconds / SECONDS_PER_DAY;
        let mut remaining = days
            .checked_sub(DAYS_BEFORE_BASE_YEAR)
            .ok_or(CalendarError::Year)?;

        // 2000-01-01 was a Saturday
        let weekday = Weekday::ALL[((remaining + 6) % 7) as usize];

        let mut year = BASE_YEAR;
        while remaining >= days_in_year(year) {
            remaining -= days_in_year(year);
            year += 1;
        }
        if year - BASE_YEAR > MAX_YEAR_OFFSET as u16 {
            return Err(CalendarError::Year);
        }

        let leap = is_leap_year(year);
        let mut month = 0u8;
        while remaining >= days_in_month(month, leap) as u32 {
            remaining -= days_in_month(month, leap) as u32;
            month += 1;
        }

        let time_of_day = seconds % SECONDS_PER_DAY;
        Ok(Self {
            year: (year - BASE_YEAR) as u8,
            month,
            day: remaining as u8 + 1,
            weekday,
            hour: (time_of_day / 3600) as u8,
            minute: ((time_of_day / 60) % 60) as u8,
            second: (time_of_day % 60) as u8,
        })
    }
}

impl fmt::Display for Datetime {
    /// Wire format: `DDD YY-MM-DD HH:MM:SS` with a 1-based month
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:02}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.weekday.abbreviation(),
            self.year,
            self.month + 1,
            self.day,
            self.hour,
            self.minute,
            self.second
        )
    }
}
