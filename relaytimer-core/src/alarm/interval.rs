//! Recurrence periods and the calendar fields each one compares

use crate::datetime::Datetime;

/// How often an alarm recurs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IntervalPeriod {
    /// Every hour at the target minute
    Hour,
    /// Every day at the target hour and minute
    Day,
    /// Every week on the target weekday, hour and minute
    Week,
    /// Every month on the target day, hour and minute
    Month,
    /// Every year on the target month, day, hour and minute
    #[default]
    Year,
}

/// A single calendar field compared between target and current time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Granularity {
    Month,
    DayOfMonth,
    Weekday,
    Hour,
    Minute,
}

impl Granularity {
    /// Whether `now` agrees with `target` on this field
    pub fn matches(self, target: &Datetime, now: &Datetime) -> bool {
        match self {
            Granularity::Month => target.month == now.month,
            Granularity::DayOfMonth => target.day == now.day,
            Granularity::Weekday => target.weekday == now.weekday,
            Granularity::Hour => target.hour == now.hour,
            Granularity::Minute => target.minute == now.minute,
        }
    }
}

const YEAR_FIELDS: &[Granularity] = &[
    Granularity::Month,
    Granularity::DayOfMonth,
    Granularity::Hour,
    Granularity::Minute,
];
const MONTH_FIELDS: &[Granularity] = &[
    Granularity::DayOfMonth,
    Granularity::Hour,
    Granularity::Minute,
];
const WEEK_FIELDS: &[Granularity] = &[
    Granularity::Weekday,
    Granularity::Hour,
    Granularity::Minute,
];
const DAY_FIELDS: &[Granularity] = &[Granularity::Hour, Granularity::Minute];
const HOUR_FIELDS: &[Granularity] = &[Granularity::Minute];

impl IntervalPeriod {
    /// Parse the single-letter wire code (`H`, `D`, `W`, `M`, `Y`)
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            b'H' => Some(Self::Hour),
            b'D' => Some(Self::Day),
            b'W' => Some(Self::Week),
            b'M' => Some(Self::Month),
            b'Y' => Some(Self::Year),
            _ => None,
        }
    }

    /// Single-letter wire code
    pub fn code(self) -> char {
        match self {
            Self::Hour => 'H',
            Self::Day => 'D',
            Self::Week => 'W',
            Self::Month => 'M',
            Self::Year => 'Y',
        }
    }

    /// Fields compared for this period, coarsest first
    pub fn granularities(self) -> &'static [Granularity] {
        match self {
            Self::Year => YEAR_FIELDS,
            Self::Month => MONTH_FIELDS,
            Self::Week => WEEK_FIELDS,
            Self::Day => DAY_FIELDS,
            Self::Hour => HOUR_FIELDS,
        }
    }

    /// Whether `now` is a recurrence of `target` for this period
    ///
    /// Seconds are never compared, so a match holds for a whole minute.
    pub fn matches(self, target: &Datetime, now: &Datetime) -> bool {
        self.granularities()
            .iter()
            .all(|field| field.matches(target, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datetime::Weekday;

    fn at(month: u8, day: u8, weekday: Weekday, hour: u8, minute: u8) -> Datetime {
        Datetime {
            year: 15,
            month,
            day,
            weekday,
            hour,
            minute,
            second: 0,
        }
    }

    #[test]
    fn test_codes() {
        for code in [b'H', b'D', b'W', b'M', b'Y'] {
            let period = IntervalPeriod::from_code(code).unwrap();
            assert_eq!(period.code() as u8, code);
        }
        assert_eq!(IntervalPeriod::from_code(b'X'), None);
    }

    #[test]
    fn test_hour_matches_minute_only() {
        let target = at(0, 1, Weekday::Sunday, 0, 30);
        assert!(IntervalPeriod::Hour.matches(&target, &at(5, 9, Weekday::Friday, 13, 30)));
        assert!(!IntervalPeriod::Hour.matches(&target, &at(0, 1, Weekday::Sunday, 0, 31)));
    }

    #[test]
    fn test_week_ignores_day_of_month() {
        let target = at(0, 1, Weekday::Tuesday, 3, 45);
        assert!(IntervalPeriod::Week.matches(&target, &at(6, 21, Weekday::Tuesday, 3, 45)));
        assert!(!IntervalPeriod::Week.matches(&target, &at(0, 1, Weekday::Wednesday, 3, 45)));
    }

    #[test]
    fn test_year_requires_month_and_day() {
        let target = at(6, 4, Weekday::Saturday, 0, 0);
        assert!(IntervalPeriod::Year.matches(&target, &at(6, 4, Weekday::Monday, 0, 0)));
        assert!(!IntervalPeriod::Year.matches(&target, &at(7, 4, Weekday::Saturday, 0, 0)));
        assert!(!IntervalPeriod::Year.matches(&target, &at(6, 5, Weekday::Saturday, 0, 0)));
        // Month period ignores the month
        assert!(IntervalPeriod::Month.matches(&target, &at(7, 4, Weekday::Saturday, 0, 0)));
    }
}
