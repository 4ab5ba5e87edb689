//! Digital I/O channel types
//!
//! The device exposes four channels, each configurable as an input or an
//! output at runtime.

/// Number of digital channels
pub const IO_CHANNELS: usize = 4;

/// Index of a digital channel (0-3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IoIndex(u8);

impl IoIndex {
    /// Create an index, returning `None` if it is not a valid channel
    pub fn new(index: u8) -> Option<Self> {
        if (index as usize) < IO_CHANNELS {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Raw channel number
    pub fn get(self) -> u8 {
        self.0
    }

    /// Channel number as an array index
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Iterate over every channel in order
    pub fn all() -> impl Iterator<Item = IoIndex> {
        (0..IO_CHANNELS as u8).map(IoIndex)
    }
}

/// Direction of a digital channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum IoDirection {
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "in"))]
    Input,
    #[cfg_attr(feature = "serde", serde(rename = "out"))]
    Output,
}

impl IoDirection {
    /// Parse the wire token (`IN` or `OUT`)
    pub fn from_token(token: &[u8]) -> Option<Self> {
        match token {
            b"IN" => Some(Self::Input),
            b"OUT" => Some(Self::Output),
            _ => None,
        }
    }

    /// Wire token for this direction
    pub fn token(self) -> &'static str {
        match self {
            Self::Input => "IN",
            Self::Output => "OUT",
        }
    }
}

/// Sampled level of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoState {
    On,
    Off,
    /// The channel could not be read
    Unknown,
}

impl IoState {
    /// Character used in a READ_INPUT reply
    pub fn reply_char(self) -> char {
        match self {
            Self::On => '1',
            Self::Off => '0',
            Self::Unknown => '?',
        }
    }

    /// Logic level, treating `Unknown` as low
    pub fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

impl From<bool> for IoState {
    fn from(high: bool) -> Self {
        if high {
            Self::On
        } else {
            Self::Off
        }
    }
}
