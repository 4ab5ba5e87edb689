//! Fixed slot tables for alarms, triggers and channel state

use heapless::String;

use relaytimer_core::alarm::ALARM_SLOTS;
use relaytimer_core::io::IO_CHANNELS;
use relaytimer_core::{Alarm, AlarmId, IoDirection, IoIndex};

/// Longest trigger expression that can be stored
pub const MAX_TRIGGER_LEN: usize = 30;

/// Stored trigger expression text
pub type TriggerText = String<MAX_TRIGGER_LEN>;

/// Alarm slots, indexed by [`AlarmId`]
#[derive(Debug, Clone, Default)]
pub struct AlarmTable {
    slots: [Option<Alarm>; ALARM_SLOTS],
}

impl AlarmTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `alarm` in slot `id`, replacing whatever was there
    pub fn set(&mut self, id: AlarmId, alarm: Alarm) {
        self.slots[id.as_usize()] = Some(alarm);
    }

    pub fn clear(&mut self, id: AlarmId) {
        self.slots[id.as_usize()] = None;
    }

    pub fn clear_all(&mut self) {
        self.slots = [None; ALARM_SLOTS];
    }

    pub fn get(&self, id: AlarmId) -> Option<&Alarm> {
        self.slots[id.as_usize()].as_ref()
    }

    /// Armed alarms with their ids
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (AlarmId, &mut Alarm)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| Some((AlarmId::new(i as u8)?, slot.as_mut()?)))
    }

    /// Triggered state of every slot; empty slots read `false`
    pub fn active_mask(&self) -> [bool; ALARM_SLOTS] {
        let mut mask = [false; ALARM_SLOTS];
        for (active, slot) in mask.iter_mut().zip(self.slots.iter()) {
            *active = slot.is_some_and(|alarm| alarm.is_triggered());
        }
        mask
    }

    pub fn armed_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

/// Trigger expressions, one optional slot per channel
#[derive(Debug, Clone, Default)]
pub struct TriggerTable {
    slots: [Option<TriggerText>; IO_CHANNELS],
}

impl TriggerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `expression` for channel `io`
    ///
    /// Fails without touching the slot if the text is longer than
    /// [`MAX_TRIGGER_LEN`].
    pub fn set(&mut self, io: IoIndex, expression: &str) -> Result<(), ()> {
        let mut text = TriggerText::new();
        text.push_str(expression)?;
        self.slots[io.as_usize()] = Some(text);
        Ok(())
    }

    pub fn clear(&mut self, io: IoIndex) {
        self.slots[io.as_usize()] = None;
    }

    pub fn clear_all(&mut self) {
        self.slots = Default::default();
    }

    pub fn get(&self, io: IoIndex) -> Option<&str> {
        self.slots[io.as_usize()].as_deref()
    }

    pub fn armed_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

/// Direction and last driven level of each channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IoBank {
    directions: [IoDirection; IO_CHANNELS],
    levels: [bool; IO_CHANNELS],
}

impl IoBank {
    pub fn new(directions: [IoDirection; IO_CHANNELS]) -> Self {
        Self {
            directions,
            levels: [false; IO_CHANNELS],
        }
    }

    pub fn direction(&self, io: IoIndex) -> IoDirection {
        self.directions[io.as_usize()]
    }

    /// Record a direction change; a channel always starts low
    pub fn set_direction(&mut self, io: IoIndex, direction: IoDirection) {
        self.directions[io.as_usize()] = direction;
        self.levels[io.as_usize()] = false;
    }

    pub fn level(&self, io: IoIndex) -> bool {
        self.levels[io.as_usize()]
    }

    /// Record the level driven on an output; returns whether it changed
    pub fn set_level(&mut self, io: IoIndex, high: bool) -> bool {
        let changed = self.levels[io.as_usize()] != high;
        self.levels[io.as_usize()] = high;
        changed
    }

    pub fn outputs(&self) -> impl Iterator<Item = IoIndex> + '_ {
        IoIndex::all().filter(|&io| self.direction(io) == IoDirection::Output)
    }
}
