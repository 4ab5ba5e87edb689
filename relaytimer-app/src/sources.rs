//! Trigger function sources
//!
//! Trigger expressions reference numbered functions. On the device each
//! function id is bound to a channel level, an alarm or a constant.

use relaytimer_core::alarm::ALARM_SLOTS;
use relaytimer_core::expr::{FunctionId, FunctionTable, MAX_FUNCTIONS};
use relaytimer_core::io::IO_CHANNELS;
use relaytimer_core::{AlarmId, IoIndex};

/// What a function id reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Source {
    /// Level of a channel
    Input(IoIndex),
    /// Whether an alarm is currently triggered
    Alarm(AlarmId),
    Always,
    Never,
}

/// Binding of every function id to a [`Source`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SourceMap {
    sources: [Source; MAX_FUNCTIONS],
}

impl Default for SourceMap {
    /// Ids 0-3 read channels 0-3, ids 4-15 read alarms 0-11
    fn default() -> Self {
        let mut sources = [Source::Never; MAX_FUNCTIONS];
        for (id, source) in sources.iter_mut().enumerate() {
            let id = id as u8;
            *source = match IoIndex::new(id) {
                Some(io) => Source::Input(io),
                None => AlarmId::new(id - IO_CHANNELS as u8)
                    .map(Source::Alarm)
                    .unwrap_or(Source::Never),
            };
        }
        Self { sources }
    }
}

impl SourceMap {
    pub fn get(&self, id: FunctionId) -> Source {
        self.sources[id.as_usize()]
    }

    pub fn set(&mut self, id: FunctionId, source: Source) {
        self.sources[id.as_usize()] = source;
    }
}

/// Values of all sources captured at one instant
///
/// Every function call during one evaluation sees the same state.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    map: &'a SourceMap,
    inputs: [bool; IO_CHANNELS],
    alarms: [bool; ALARM_SLOTS],
}

impl<'a> Snapshot<'a> {
    pub fn new(map: &'a SourceMap, inputs: [bool; IO_CHANNELS], alarms: [bool; ALARM_SLOTS]) -> Self {
        Self {
            map,
            inputs,
            alarms,
        }
    }
}

impl FunctionTable for Snapshot<'_> {
    fn call(&self, id: FunctionId) -> bool {
        match self.map.get(id) {
            Source::Input(io) => self.inputs[io.as_usize()],
            Source::Alarm(alarm) => self.alarms[alarm.as_usize()],
            Source::Always => true,
            Source::Never => false,
        }
    }
}
