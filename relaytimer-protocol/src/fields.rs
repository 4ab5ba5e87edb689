//! Fixed-offset field readers for message bodies

use core::ops::RangeInclusive;

use relaytimer_core::Weekday;

use crate::messages::DecodeError;

/// Sequential reader over the bytes of a message body
#[derive(Debug, Clone)]
pub struct FieldCursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> FieldCursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Offset of the next unread byte
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Whether every byte has been read
    pub fn is_empty(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    /// Unread bytes
    pub fn rest(&self) -> &'a [u8] {
        self.bytes.get(self.pos..).unwrap_or(&[])
    }

    pub fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    /// Take exactly `len` bytes
    pub fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let end = self.pos.checked_add(len).ok_or(DecodeError::Format)?;
        let taken = self.bytes.get(self.pos..end).ok_or(DecodeError::Format)?;
        self.pos = end;
        Ok(taken)
    }

    /// Consume `byte` or fail
    pub fn expect(&mut self, byte: u8) -> Result<(), DecodeError> {
        if self.accept(byte) {
            Ok(())
        } else {
            Err(DecodeError::Format)
        }
    }

    /// Consume `byte` if it is next
    pub fn accept(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Read a single ASCII digit within `range`
    pub fn digit(&mut self, range: RangeInclusive<u8>) -> Result<u8, DecodeError> {
        let value = ascii_digit(self.take(1)?[0])?;
        in_range(value, range)
    }

    /// Read two ASCII digits as a number within `range`
    pub fn two_digits(&mut self, range: RangeInclusive<u8>) -> Result<u8, DecodeError> {
        let pair = self.take(2)?;
        let value = ascii_digit(pair[0])? * 10 + ascii_digit(pair[1])?;
        in_range(value, range)
    }

    /// Read a three-letter upper-case weekday name
    pub fn weekday(&mut self) -> Result<Weekday, DecodeError> {
        Weekday::from_abbreviation(self.take(3)?).ok_or(DecodeError::Format)
    }

    /// Fail unless every byte has been read
    pub fn finish(&self) -> Result<(), DecodeError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DecodeError::Format)
        }
    }
}

fn ascii_digit(byte: u8) -> Result<u8, DecodeError> {
    if byte.is_ascii_digit() {
        Ok(byte - b'0')
    } else {
        Err(DecodeError::Format)
    }
}

fn in_range(value: u8, range: RangeInclusive<u8>) -> Result<u8, DecodeError> {
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(DecodeError::Range)
    }
}

/// Parse 1-4 ASCII digits as a number
pub fn parse_decimal(digits: &[u8]) -> Result<u16, DecodeError> {
    if digits.is_empty() || digits.len() > 4 {
        return Err(DecodeError::Format);
    }
    digits
        .iter()
        .try_fold(0u16, |acc, &b| Ok(acc * 10 + ascii_digit(b)? as u16))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_digits() {
        let mut cursor = FieldCursor::new(b"0913x5");
        assert_eq!(cursor.two_digits(1..=12), Ok(9));
        assert_eq!(cursor.two_digits(1..=12), Err(DecodeError::Range));
        assert_eq!(cursor.two_digits(0..=99), Err(DecodeError::Format));
    }

    #[test]
    fn test_take_past_end() {
        let mut cursor = FieldCursor::new(b"1");
        assert_eq!(cursor.two_digits(0..=99), Err(DecodeError::Format));
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.digit(0..=3), Ok(1));
        assert!(cursor.is_empty());
        assert_eq!(cursor.finish(), Ok(()));
    }

    #[test]
    fn test_separators() {
        let mut cursor = FieldCursor::new(b" -");
        assert!(!cursor.accept(b'-'));
        assert_eq!(cursor.expect(b' '), Ok(()));
        assert_eq!(cursor.rest(), b"-");
        assert_eq!(cursor.finish(), Err(DecodeError::Format));
    }

    #[test]
    fn test_weekday() {
        assert_eq!(FieldCursor::new(b"TUE").weekday(), Ok(Weekday::Tuesday));
        assert_eq!(FieldCursor::new(b"MAN").weekday(), Err(DecodeError::Format));
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal(b"1440"), Ok(1440));
        assert_eq!(parse_decimal(b"0"), Ok(0));
        assert_eq!(parse_decimal(b""), Err(DecodeError::Format));
        assert_eq!(parse_decimal(b"12345"), Err(DecodeError::Format));
        assert_eq!(parse_decimal(b"1a"), Err(DecodeError::Format));
    }
}
