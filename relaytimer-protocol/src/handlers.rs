//! Application callbacks invoked by the dispatcher
//!
//! Every request method has a default body returning
//! [`HandlerError::Missing`], so an application only implements the
//! requests it supports. Only [`MessageHandlers::reply`] is required.

use relaytimer_core::{Alarm, AlarmId, Datetime, IoDirection, IoIndex, IoState};

/// Why a handler did not carry out a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandlerError {
    /// The application does not handle this request
    Missing,
    /// The application refused or failed to apply the request
    Rejected,
}

pub type HandlerResult<T = ()> = Result<T, HandlerError>;

/// Capability table for the message dispatcher
pub trait MessageHandlers {
    fn set_rtc(&mut self, _datetime: &Datetime) -> HandlerResult {
        Err(HandlerError::Missing)
    }

    fn get_current_rtc(&mut self) -> HandlerResult<Datetime> {
        Err(HandlerError::Missing)
    }

    fn set_alarm(&mut self, _id: AlarmId, _alarm: &Alarm) -> HandlerResult {
        Err(HandlerError::Missing)
    }

    fn clear_alarm(&mut self, _id: AlarmId) -> HandlerResult {
        Err(HandlerError::Missing)
    }

    /// `expression` is the raw text after the channel index
    fn set_trigger(&mut self, _io: IoIndex, _expression: &str) -> HandlerResult {
        Err(HandlerError::Missing)
    }

    fn clear_trigger(&mut self, _io: IoIndex) -> HandlerResult {
        Err(HandlerError::Missing)
    }

    fn set_io_type(&mut self, _io: IoIndex, _direction: IoDirection) -> HandlerResult {
        Err(HandlerError::Missing)
    }

    fn read_io_state(&mut self, _io: IoIndex) -> HandlerResult<IoState> {
        Err(HandlerError::Missing)
    }

    /// Clear all alarms and triggers
    fn reset(&mut self) -> HandlerResult {
        Err(HandlerError::Missing)
    }

    /// Send a reply to the peer
    fn reply(&mut self, message: &[u8]) -> HandlerResult;
}
