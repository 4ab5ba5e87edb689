//! Relaytimer Hardware Abstraction Layer
//!
//! Narrow traits through which the controller reaches the board: the four
//! digital channels, the serial link carrying the command protocol and the
//! real-time clock. Board crates implement them; the application only sees
//! the traits.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  relaytimer-app (controller, console)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  relaytimer-hal (this crate - traits)   │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┼───────────┐
//!         ▼           ▼           ▼
//! ┌─────────────┐ ┌─────────┐ ┌─────────────┐
//! │ GPIO pins   │ │ UART /  │ │ RTC chip or │
//! │             │ │ io port │ │ SoftRtc     │
//! └─────────────┘ └─────────┘ └─────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`], [`gpio::FlexPin`] - Digital I/O
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial communication
//! - [`rtc::RealTimeClock`] - Calendar clock

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod gpio;
pub mod rtc;
pub mod uart;

pub use gpio::{FlexPin, InputPin, OutputPin, PinError};
pub use rtc::{RealTimeClock, RtcError, SoftRtc};
pub use uart::{IoSerial, UartRx, UartTx};
