//! Line framing for the command protocol
//!
//! Messages are plain ASCII lines:
//! - TAG (1 byte): message kind, `A`-`I` for requests, `>` for replies
//! - BODY (0-31 bytes): kind-specific fields
//! - TERMINATOR: `\r` or `\n` (not part of the message)
//!
//! A message never exceeds 32 bytes and never contains NUL.

use core::mem;

use heapless::Vec;

/// Longest message, tag included
pub const MAX_MESSAGE_LEN: usize = 32;

/// A complete message without its terminator
pub type Message = Vec<u8, MAX_MESSAGE_LEN>;

/// Errors that can occur while assembling or encoding a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Line longer than a message can be
    Overflow,
    /// NUL or non-ASCII byte in a line
    InvalidByte,
}

fn is_terminator(byte: u8) -> bool {
    byte == b'\r' || byte == b'\n'
}

/// Bytes that may appear inside a message
pub fn is_message_byte(byte: u8) -> bool {
    byte != 0 && byte.is_ascii() && !is_terminator(byte)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssemblerState {
    /// Accumulating message bytes
    Collecting,
    /// Dropping a bad line up to its terminator
    Discarding,
}

/// State machine splitting a byte stream into messages
#[derive(Debug, Clone)]
pub struct LineAssembler {
    state: AssemblerState,
    buffer: Message,
}

impl Default for LineAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl LineAssembler {
    pub fn new() -> Self {
        Self {
            state: AssemblerState::Collecting,
            buffer: Vec::new(),
        }
    }

    /// Drop any partial line
    pub fn reset(&mut self) {
        self.state = AssemblerState::Collecting;
        self.buffer.clear();
    }

    /// Feed a single byte
    ///
    /// Returns `Ok(Some(message))` when a terminator completes a non-empty
    /// line, `Ok(None)` when more bytes are needed, or `Err` when the
    /// current line is bad. A bad line is discarded up to its terminator.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Message>, FrameError> {
        match self.state {
            AssemblerState::Discarding => {
                if is_terminator(byte) {
                    self.state = AssemblerState::Collecting;
                }
                Ok(None)
            }
            AssemblerState::Collecting => {
                if is_terminator(byte) {
                    if self.buffer.is_empty() {
                        return Ok(None);
                    }
                    return Ok(Some(mem::take(&mut self.buffer)));
                }

                if !is_message_byte(byte) {
                    self.discard();
                    return Err(FrameError::InvalidByte);
                }

                if self.buffer.push(byte).is_err() {
                    self.discard();
                    return Err(FrameError::Overflow);
                }
                Ok(None)
            }
        }
    }

    /// Feed multiple bytes
    ///
    /// Returns the first complete message found, if any.
    /// Remaining bytes after a complete message are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<Message>, FrameError> {
        for &byte in bytes {
            if let Some(message) = self.feed(byte)? {
                return Ok(Some(message));
            }
        }
        Ok(None)
    }

    fn discard(&mut self) {
        self.buffer.clear();
        self.state = AssemblerState::Discarding;
    }
}
