//! Request types for the command protocol
//!
//! Every request is one line whose first byte selects the kind:
//!
//! | Tag | Kind            | Body                        |
//! |-----|-----------------|-----------------------------|
//! | `A` | `SET_RTC`       | `DDD YY-MM-DD HH:MM:SS`     |
//! | `B` | `GET_RTC`       | empty                       |
//! | `C` | `SET_ALARM`     | `AA RRP[ datetime][ Dnnnn]` |
//! | `D` | `CLEAR_ALARM`   | `AA`                        |
//! | `E` | `SET_TRIGGER`   | `I EXPR`                    |
//! | `F` | `CLEAR_TRIGGER` | `I`                         |
//! | `G` | `SET_IO_TYPE`   | `I IN` or `I OUT`           |
//! | `H` | `READ_INPUT`    | `I`                         |
//! | `I` | `RESET`         | empty                       |
//!
//! Replies start with `>` followed by the request tag.

use core::fmt::Write;

use heapless::String;
use relaytimer_core::alarm::{
    AlarmId, ALARM_SLOTS, DEFAULT_DURATION_MINUTES, MAX_INTERVAL_COUNT, MIN_INTERVAL_COUNT,
};
use relaytimer_core::datetime::{days_in_month, MAX_YEAR_OFFSET};
use relaytimer_core::io::IO_CHANNELS;
use relaytimer_core::{Alarm, CalendarError, Datetime, IntervalPeriod, IoDirection, IoIndex};

use crate::fields::{parse_decimal, FieldCursor};
use crate::frame::{is_message_byte, FrameError, Message, MAX_MESSAGE_LEN};

// Request tags
pub const MSG_SET_RTC: u8 = b'A';
pub const MSG_GET_RTC: u8 = b'B';
pub const MSG_SET_ALARM: u8 = b'C';
pub const MSG_CLEAR_ALARM: u8 = b'D';
pub const MSG_SET_TRIGGER: u8 = b'E';
pub const MSG_CLEAR_TRIGGER: u8 = b'F';
pub const MSG_SET_IO_TYPE: u8 = b'G';
pub const MSG_READ_INPUT: u8 = b'H';
pub const MSG_RESET: u8 = b'I';

/// First byte of every reply
pub const REPLY_TAG: u8 = b'>';

/// Length of a `DDD YY-MM-DD HH:MM:SS` datetime field
pub const DATETIME_FIELD_LEN: usize = 21;

/// Marker introducing the optional alarm duration
const DURATION_MARKER: &[u8] = b" D";

/// Why a message could not be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Zero-length message
    Empty,
    /// Longer than 32 bytes
    TooLong,
    /// Tag byte is not a request kind
    UnknownTag(u8),
    /// Wrong length, separator, digit or token
    Format,
    /// Numeric field outside its range
    Range,
    /// Fields in range but the date does not exist
    Calendar(CalendarError),
}

/// Request kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageKind {
    SetRtc,
    GetRtc,
    SetAlarm,
    ClearAlarm,
    SetTrigger,
    ClearTrigger,
    SetIoType,
    ReadInput,
    Reset,
}

impl MessageKind {
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            MSG_SET_RTC => Some(Self::SetRtc),
            MSG_GET_RTC => Some(Self::GetRtc),
            MSG_SET_ALARM => Some(Self::SetAlarm),
            MSG_CLEAR_ALARM => Some(Self::ClearAlarm),
            MSG_SET_TRIGGER => Some(Self::SetTrigger),
            MSG_CLEAR_TRIGGER => Some(Self::ClearTrigger),
            MSG_SET_IO_TYPE => Some(Self::SetIoType),
            MSG_READ_INPUT => Some(Self::ReadInput),
            MSG_RESET => Some(Self::Reset),
            _ => None,
        }
    }

    pub fn tag(self) -> u8 {
        match self {
            Self::SetRtc => MSG_SET_RTC,
            Self::GetRtc => MSG_GET_RTC,
            Self::SetAlarm => MSG_SET_ALARM,
            Self::ClearAlarm => MSG_CLEAR_ALARM,
            Self::SetTrigger => MSG_SET_TRIGGER,
            Self::ClearTrigger => MSG_CLEAR_TRIGGER,
            Self::SetIoType => MSG_SET_IO_TYPE,
            Self::ReadInput => MSG_READ_INPUT,
            Self::Reset => MSG_RESET,
        }
    }
}

/// A decoded request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Request<'a> {
    /// Set the real-time clock
    SetRtc(Datetime),
    /// Report the real-time clock
    GetRtc,
    /// Arm an alarm slot
    SetAlarm { id: AlarmId, alarm: Alarm },
    /// Disarm an alarm slot
    ClearAlarm(AlarmId),
    /// Store a trigger expression for a channel, verbatim
    SetTrigger { io: IoIndex, expression: &'a str },
    /// Remove a channel's trigger
    ClearTrigger(IoIndex),
    /// Switch a channel between input and output
    SetIoType { io: IoIndex, direction: IoDirection },
    /// Report a channel's level
    ReadInput(IoIndex),
    /// Clear all alarms and triggers
    Reset,
}

impl<'a> Request<'a> {
    /// Decode a complete message
    ///
    /// Every field is validated before a request is returned, so a handler
    /// never sees a partially valid request.
    pub fn decode(raw: &'a [u8]) -> Result<Self, DecodeError> {
        let (&tag, body) = raw.split_first().ok_or(DecodeError::Empty)?;
        if raw.len() > MAX_MESSAGE_LEN {
            return Err(DecodeError::TooLong);
        }
        if !raw.iter().all(|&b| is_message_byte(b)) {
            return Err(DecodeError::Format);
        }
        let kind = MessageKind::from_tag(tag).ok_or(DecodeError::UnknownTag(tag))?;

        let mut cursor = FieldCursor::new(body);
        let request = match kind {
            MessageKind::SetRtc => Request::SetRtc(decode_datetime(&mut cursor)?),
            MessageKind::GetRtc => Request::GetRtc,
            MessageKind::SetAlarm => {
                let (id, alarm) = decode_alarm(body)?;
                return Ok(Request::SetAlarm { id, alarm });
            }
            MessageKind::ClearAlarm => Request::ClearAlarm(decode_alarm_id(&mut cursor)?),
            MessageKind::SetTrigger => {
                let io = decode_io_index(&mut cursor)?;
                cursor.expect(b' ')?;
                let expression = core::str::from_utf8(cursor.take(cursor.rest().len())?)
                    .map_err(|_| DecodeError::Format)?;
                if expression.is_empty() {
                    return Err(DecodeError::Format);
                }
                Request::SetTrigger { io, expression }
            }
            MessageKind::ClearTrigger => Request::ClearTrigger(decode_io_index(&mut cursor)?),
            MessageKind::SetIoType => {
                let io = decode_io_index(&mut cursor)?;
                cursor.expect(b' ')?;
                let direction = IoDirection::from_token(cursor.take(cursor.rest().len())?)
                    .ok_or(DecodeError::Format)?;
                Request::SetIoType { io, direction }
            }
            MessageKind::ReadInput => Request::ReadInput(decode_io_index(&mut cursor)?),
            MessageKind::Reset => Request::Reset,
        };
        cursor.finish()?;
        Ok(request)
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            Request::SetRtc(_) => MessageKind::SetRtc,
            Request::GetRtc => MessageKind::GetRtc,
            Request::SetAlarm { .. } => MessageKind::SetAlarm,
            Request::ClearAlarm(_) => MessageKind::ClearAlarm,
            Request::SetTrigger { .. } => MessageKind::SetTrigger,
            Request::ClearTrigger(_) => MessageKind::ClearTrigger,
            Request::SetIoType { .. } => MessageKind::SetIoType,
            Request::ReadInput(_) => MessageKind::ReadInput,
            Request::Reset => MessageKind::Reset,
        }
    }

    /// Encode this request into its wire form
    pub fn encode(&self) -> Result<Message, FrameError> {
        let mut text: String<MAX_MESSAGE_LEN> = String::new();
        text.push(self.kind().tag() as char)
            .map_err(|_| FrameError::Overflow)?;
        self.write_body(&mut text)
            .map_err(|_| FrameError::Overflow)?;
        Ok(text.into_bytes())
    }

    fn write_body(&self, out: &mut String<MAX_MESSAGE_LEN>) -> core::fmt::Result {
        match self {
            Request::SetRtc(datetime) => write!(out, "{}", datetime),
            Request::GetRtc | Request::Reset => Ok(()),
            Request::SetAlarm { id, alarm } => {
                write!(
                    out,
                    "{:02} {:02}{}",
                    id.get(),
                    alarm.interval_count(),
                    alarm.period().code()
                )?;
                write_alarm_target(out, alarm)?;
                if alarm.duration_minutes() != DEFAULT_DURATION_MINUTES {
                    write!(out, " D{}", alarm.duration_minutes())?;
                }
                Ok(())
            }
            Request::ClearAlarm(id) => write!(out, "{:02}", id.get()),
            Request::SetTrigger { io, expression } => write!(out, "{} {}", io.get(), expression),
            Request::ClearTrigger(io) | Request::ReadInput(io) => write!(out, "{}", io.get()),
            Request::SetIoType { io, direction } => {
                write!(out, "{} {}", io.get(), direction.token())
            }
        }
    }
}

fn write_alarm_target(out: &mut String<MAX_MESSAGE_LEN>, alarm: &Alarm) -> core::fmt::Result {
    let t = alarm.target();
    match alarm.period() {
        IntervalPeriod::Year => write!(
            out,
            " {:02}-{:02} {:02}:{:02}",
            t.month + 1,
            t.day,
            t.hour,
            t.minute
        ),
        IntervalPeriod::Month => write!(out, " {:02} {:02}:{:02}", t.day, t.hour, t.minute),
        IntervalPeriod::Week => write!(
            out,
            " {} {:02}:{:02}",
            t.weekday.abbreviation(),
            t.hour,
            t.minute
        ),
        IntervalPeriod::Day => write!(out, " {:02}:{:02}", t.hour, t.minute),
        IntervalPeriod::Hour => write!(out, " {:02}", t.minute),
    }
}

fn decode_io_index(cursor: &mut FieldCursor<'_>) -> Result<IoIndex, DecodeError> {
    let index = cursor.digit(0..=(IO_CHANNELS as u8 - 1))?;
    IoIndex::new(index).ok_or(DecodeError::Range)
}

fn decode_alarm_id(cursor: &mut FieldCursor<'_>) -> Result<AlarmId, DecodeError> {
    let id = cursor.two_digits(0..=(ALARM_SLOTS as u8 - 1))?;
    AlarmId::new(id).ok_or(DecodeError::Range)
}

/// `DDD YY-MM-DD HH:MM:SS`
fn decode_datetime(cursor: &mut FieldCursor<'_>) -> Result<Datetime, DecodeError> {
    if cursor.rest().len() != DATETIME_FIELD_LEN {
        return Err(DecodeError::Format);
    }
    let weekday = cursor.weekday()?;
    cursor.expect(b' ')?;
    let year = cursor.two_digits(0..=MAX_YEAR_OFFSET)?;
    cursor.expect(b'-')?;
    let month = cursor.two_digits(1..=12)?;
    cursor.expect(b'-')?;
    let day = cursor.two_digits(1..=31)?;
    cursor.expect(b' ')?;
    let hour = cursor.two_digits(0..=23)?;
    cursor.expect(b':')?;
    let minute = cursor.two_digits(0..=59)?;
    cursor.expect(b':')?;
    let second = cursor.two_digits(0..=59)?;

    Datetime::new(year, month - 1, day, weekday, hour, minute, second)
        .map_err(DecodeError::Calendar)
}

/// `AA RRP[ datetime][ Dnnnn]`
fn decode_alarm(body: &[u8]) -> Result<(AlarmId, Alarm), DecodeError> {
    let (fields, duration) = split_duration(body)?;

    let mut cursor = FieldCursor::new(fields);
    let id = decode_alarm_id(&mut cursor)?;
    cursor.expect(b' ')?;
    let count = cursor.two_digits(MIN_INTERVAL_COUNT..=MAX_INTERVAL_COUNT)?;
    let period = IntervalPeriod::from_code(cursor.take(1)?[0]).ok_or(DecodeError::Format)?;
    let target = decode_alarm_target(&mut cursor, period)?;
    cursor.finish()?;

    Ok((id, Alarm::new(period, target, count, duration)))
}

/// Split off a trailing ` Dnnnn` duration; absent means zero (default)
fn split_duration(body: &[u8]) -> Result<(&[u8], u16), DecodeError> {
    match body
        .windows(DURATION_MARKER.len())
        .rposition(|window| window == DURATION_MARKER)
    {
        Some(at) => {
            let minutes = parse_decimal(&body[at + DURATION_MARKER.len()..])?;
            Ok((&body[..at], minutes))
        }
        None => Ok((body, 0)),
    }
}

/// Cascading optional datetime fields, depending on the period
fn decode_alarm_target(
    cursor: &mut FieldCursor<'_>,
    period: IntervalPeriod,
) -> Result<Datetime, DecodeError> {
    let mut target = Datetime::default();

    match period {
        IntervalPeriod::Year => {
            if cursor.accept(b' ') {
                target.month = cursor.two_digits(1..=12)? - 1;
                if cursor.accept(b'-') {
                    let day = cursor.two_digits(1..=31)?;
                    // Yearly alarms may target Feb 29
                    if day > days_in_month(target.month, true) {
                        return Err(DecodeError::Calendar(CalendarError::Day));
                    }
                    target.day = day;
                }
                decode_time_of_day(cursor, &mut target)?;
            }
        }
        IntervalPeriod::Month => {
            if cursor.accept(b' ') {
                target.day = cursor.two_digits(1..=31)?;
                decode_time_of_day(cursor, &mut target)?;
            }
        }
        IntervalPeriod::Week => {
            cursor.expect(b' ')?;
            target.weekday = cursor.weekday()?;
            decode_time_of_day(cursor, &mut target)?;
        }
        IntervalPeriod::Day => decode_time_of_day(cursor, &mut target)?,
        IntervalPeriod::Hour => {
            if cursor.accept(b' ') {
                target.minute = cursor.two_digits(0..=59)?;
            }
        }
    }

    Ok(target)
}

/// Optional ` HH:MM`
fn decode_time_of_day(
    cursor: &mut FieldCursor<'_>,
    target: &mut Datetime,
) -> Result<(), DecodeError> {
    if cursor.accept(b' ') {
        target.hour = cursor.two_digits(0..=23)?;
        cursor.expect(b':')?;
        target.minute = cursor.two_digits(0..=59)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use relaytimer_core::Weekday;

    fn decode(text: &str) -> Result<Request<'_>, DecodeError> {
        Request::decode(text.as_bytes())
    }

    fn set_alarm(text: &str) -> (AlarmId, Alarm) {
        match decode(text) {
            Ok(Request::SetAlarm { id, alarm }) => (id, alarm),
            other => panic!("{:?} decoded as {:?}", text, other),
        }
    }

    #[test]
    fn test_set_rtc() {
        let Ok(Request::SetRtc(dt)) = decode("ASAT 15-08-01 18:07:37") else {
            panic!("SET_RTC did not decode");
        };
        assert_eq!(dt.year, 15);
        assert_eq!(dt.month, 7);
        assert_eq!(dt.day, 1);
        assert_eq!(dt.weekday, Weekday::Saturday);
        assert_eq!((dt.hour, dt.minute, dt.second), (18, 7, 37));
    }

    #[test]
    fn test_set_rtc_rejects_bad_fields() {
        let cases = [
            ("ASAT 15-00-01 18:07:37", DecodeError::Range),
            ("ASAT 15-13-01 18:07:37", DecodeError::Range),
            ("ASAT 15-08-00 18:07:37", DecodeError::Range),
            ("ASAT 15-01-32 18:07:37", DecodeError::Range),
            ("ASAT 15-01-01 24:07:37", DecodeError::Range),
            ("ASAT 15-01-01 18:60:37", DecodeError::Range),
            ("ASAT 15-01-01 18:07:60", DecodeError::Range),
            (
                "ASAT 15-02-29 18:07:37",
                DecodeError::Calendar(CalendarError::Day),
            ),
            (
                "ASAT 15-04-31 18:07:37",
                DecodeError::Calendar(CalendarError::Day),
            ),
            ("AMAN 15-02-28 18:07:37", DecodeError::Format),
            ("ASAT 15-02-28 18:07", DecodeError::Format),
            ("ASAT 15/02/28 18:07:37", DecodeError::Format),
        ];
        for (text, expected) in cases {
            assert_eq!(decode(text), Err(expected), "{}", text);
        }
        assert!(decode("ASUN 16-02-29 00:00:00").is_ok());
    }

    #[test]
    fn test_set_alarm_weekly() {
        let (id, alarm) = set_alarm("C01 01W TUE 03:45");
        assert_eq!(id.get(), 1);
        assert_eq!(alarm.interval_count(), 1);
        assert_eq!(alarm.period(), IntervalPeriod::Week);
        assert_eq!(alarm.target().weekday, Weekday::Tuesday);
        assert_eq!((alarm.target().hour, alarm.target().minute), (3, 45));
        assert_eq!(alarm.duration_minutes(), 60);

        // The D ending WED is not a duration
        let (_, alarm) = set_alarm("C01 01W WED");
        assert_eq!(alarm.target().weekday, Weekday::Wednesday);
        assert_eq!((alarm.target().hour, alarm.target().minute), (0, 0));
        assert_eq!(alarm.duration_minutes(), 60);

        assert_eq!(decode("C01 01W"), Err(DecodeError::Format));
    }

    #[test]
    fn test_set_alarm_yearly_cascade() {
        let (_, full) = set_alarm("C01 01Y 10-09 03:45");
        assert_eq!(full.period(), IntervalPeriod::Year);
        assert_eq!((full.target().month, full.target().day), (9, 9));
        assert_eq!((full.target().hour, full.target().minute), (3, 45));
        assert_eq!(full.duration_minutes(), 60);

        let (_, with_duration) = set_alarm("C01 01Y 10-09 03:45 D1440");
        assert_eq!(with_duration.duration_minutes(), 1440);
        assert_eq!(with_duration.target(), full.target());

        let (_, partial) = set_alarm("C01 01Y 10-09");
        assert_eq!((partial.target().month, partial.target().day), (9, 9));
        assert_eq!((partial.target().hour, partial.target().minute), (0, 0));

        let (_, bare) = set_alarm("C01 01Y");
        assert_eq!((bare.target().month, bare.target().day), (0, 1));
        assert_eq!((bare.target().hour, bare.target().minute), (0, 0));

        let (_, leap_day) = set_alarm("C01 01Y 02-29");
        assert_eq!((leap_day.target().month, leap_day.target().day), (1, 29));
    }

    #[test]
    fn test_set_alarm_other_periods() {
        let (_, monthly) = set_alarm("C00 02M 15 12:30 D5");
        assert_eq!(monthly.target().day, 15);
        assert_eq!((monthly.target().hour, monthly.target().minute), (12, 30));
        assert_eq!(monthly.duration_minutes(), 5);

        let (_, daily) = set_alarm("C00 01D 06:00");
        assert_eq!((daily.target().hour, daily.target().minute), (6, 0));

        let (_, daily) = set_alarm("C00 01D D10");
        assert_eq!(daily.duration_minutes(), 10);

        let (_, hourly) = set_alarm("C00 01H 15");
        assert_eq!(hourly.target().minute, 15);
    }

    #[test]
    fn test_set_alarm_rejects_bad_fields() {
        let cases = [
            ("C", DecodeError::Format),
            ("C01 01A", DecodeError::Format),
            ("C01 01Y 13", DecodeError::Range),
            ("C01 01Y 12-32", DecodeError::Range),
            ("C01 01Y 04-31", DecodeError::Calendar(CalendarError::Day)),
            ("C01 01Y 12-31 24:00", DecodeError::Range),
            ("C01 01Y 12-31 23:60", DecodeError::Range),
            ("C01 01Y 12/31 2359", DecodeError::Format),
            ("C01 01Y 12-31 D", DecodeError::Format),
            ("C01 01Y D12345", DecodeError::Format),
            ("C17 01Y", DecodeError::Range),
            ("C01 51Y", DecodeError::Range),
            ("C01 00Y", DecodeError::Range),
            ("C0101Y", DecodeError::Format),
        ];
        for (text, expected) in cases {
            assert_eq!(decode(text), Err(expected), "{}", text);
        }
    }

    #[test]
    fn test_set_alarm_id_and_count_limits() {
        assert_eq!(set_alarm("C16 01Y").0.get(), 16);
        assert_eq!(set_alarm("C01 50Y").1.interval_count(), 50);
    }

    #[test]
    fn test_clear_alarm() {
        assert_eq!(
            decode("D16"),
            Ok(Request::ClearAlarm(AlarmId::new(16).unwrap()))
        );
        assert_eq!(decode("D17"), Err(DecodeError::Range));
        assert_eq!(decode("D1"), Err(DecodeError::Format));
        assert_eq!(decode("D011"), Err(DecodeError::Format));
    }

    #[test]
    fn test_set_trigger_is_verbatim() {
        assert_eq!(
            decode("E0 1&2|A1"),
            Ok(Request::SetTrigger {
                io: IoIndex::new(0).unwrap(),
                expression: "1&2|A1",
            })
        );
        assert_eq!(decode("E0 "), Err(DecodeError::Format));
        assert_eq!(decode("E4 1"), Err(DecodeError::Range));
    }

    #[test]
    fn test_io_requests() {
        assert_eq!(
            decode("G1 OUT"),
            Ok(Request::SetIoType {
                io: IoIndex::new(1).unwrap(),
                direction: IoDirection::Output,
            })
        );
        assert_eq!(decode("G4 IN"), Err(DecodeError::Range));
        assert_eq!(decode("G1 XX"), Err(DecodeError::Format));
        assert_eq!(
            decode("H3"),
            Ok(Request::ReadInput(IoIndex::new(3).unwrap()))
        );
        assert_eq!(decode("H4"), Err(DecodeError::Range));
        assert_eq!(
            decode("F2"),
            Ok(Request::ClearTrigger(IoIndex::new(2).unwrap()))
        );
    }

    #[test]
    fn test_framing_errors() {
        assert_eq!(Request::decode(b""), Err(DecodeError::Empty));
        assert_eq!(decode("Z"), Err(DecodeError::UnknownTag(b'Z')));
        assert_eq!(decode(">B"), Err(DecodeError::UnknownTag(b'>')));
        assert_eq!(decode("B extra"), Err(DecodeError::Format));
        assert_eq!(Request::decode(b"H\x001"), Err(DecodeError::Format));
        assert_eq!(
            Request::decode(&[b'E'; MAX_MESSAGE_LEN + 1]),
            Err(DecodeError::TooLong)
        );
        assert_eq!(decode("I"), Ok(Request::Reset));
        assert_eq!(decode("B"), Ok(Request::GetRtc));
    }

    #[test]
    fn test_encode_produces_decodable_messages() {
        let texts = [
            "ASAT 15-08-01 18:07:37",
            "B",
            "C01 01Y 10-09 03:45 D1440",
            "C16 50W TUE 03:45",
            "C00 02M 15 12:30 D5",
            "C03 01D 06:00",
            "C03 01H 15",
            "D16",
            "E3 0&!4",
            "F0",
            "G2 IN",
            "H1",
            "I",
        ];
        for text in texts {
            let request = decode(text).unwrap();
            let encoded = request.encode().unwrap();
            assert_eq!(&encoded[..], text.as_bytes());
        }
    }

    #[test]
    fn test_encode_overflow() {
        let long = "0|1|2|3|4|5|6|7|8|9|10|11|12|13";
        let request = Request::SetTrigger {
            io: IoIndex::new(0).unwrap(),
            expression: long,
        };
        assert_eq!(request.encode(), Err(FrameError::Overflow));
    }
}
