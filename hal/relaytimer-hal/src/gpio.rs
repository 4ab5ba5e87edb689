//! GPIO pin abstractions
//!
//! Each relaytimer channel is one physical pin that can be switched between
//! input and output while the device runs.

use relaytimer_core::IoDirection;

/// Failure reported by a pin implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// The pin cannot take the requested direction
    Unsupported,
    /// The pin driver did not respond
    Hardware,
}

/// Digital output pin
pub trait OutputPin {
    /// Drive the pin high
    fn set_high(&mut self);

    /// Drive the pin low
    fn set_low(&mut self);

    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Level the pin is currently driven to
    fn is_set_high(&self) -> bool;
}

/// Digital input pin
pub trait InputPin {
    /// Sample the pin
    fn is_high(&self) -> Result<bool, PinError>;

    fn is_low(&self) -> Result<bool, PinError> {
        self.is_high().map(|high| !high)
    }
}

/// Pin whose direction is chosen at runtime
///
/// Switching to [`IoDirection::Output`] must leave the pin driven low.
pub trait FlexPin: OutputPin + InputPin {
    fn set_direction(&mut self, direction: IoDirection) -> Result<(), PinError>;

    fn direction(&self) -> IoDirection;
}
