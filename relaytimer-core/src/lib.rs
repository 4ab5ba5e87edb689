//! Board-agnostic core logic for the relaytimer controller
//!
//! This crate contains the application logic that does not depend on
//! specific hardware or on the wire protocol:
//!
//! - Calendar date/time arithmetic for the two-digit-year RTC
//! - Digital I/O channel types
//! - Recurring alarm state machine
//! - Trigger expression engine (lexer, parser, node arena, evaluator)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod alarm;
pub mod datetime;
pub mod expr;
pub mod io;

pub use alarm::{Alarm, AlarmId, IntervalPeriod};
pub use datetime::{CalendarError, Datetime, Weekday};
pub use io::{IoDirection, IoIndex, IoState};
