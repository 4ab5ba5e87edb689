//! Relaytimer Controller
//!
//! Ties the core logic to the board: stores the alarms and triggers armed
//! over the command protocol, ticks them against the real-time clock and
//! drives the output channels.
//!
//! ```text
//!  UART ──► Console ──► MessageDispatcher ──► Controller ──► FlexPin x4
//!                                                 │
//!                                          RealTimeClock
//! ```
//!
//! The main loop calls [`Console::poll`] whenever serial data arrives and
//! [`Controller::tick`] at least once per second.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

#[macro_use]
mod fmt;

pub mod config;
pub mod console;
pub mod controller;
pub mod slots;
pub mod sources;

pub use config::{ConfigError, DeviceConfig};
pub use console::Console;
pub use controller::{Controller, TickReport};
pub use slots::{AlarmTable, IoBank, TriggerTable, TriggerText, MAX_TRIGGER_LEN};
pub use sources::{Snapshot, Source, SourceMap};
