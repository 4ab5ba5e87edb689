//! Main controller
//!
//! The controller owns the clock, the channel pins and every armed alarm
//! and trigger. It:
//! - Applies requests decoded by the protocol dispatcher
//! - Advances alarms on each tick
//! - Evaluates the trigger of every output channel and drives its pin

use relaytimer_core::expr::Parser;
use relaytimer_core::io::IO_CHANNELS;
use relaytimer_core::{Alarm, AlarmId, Datetime, IoDirection, IoIndex, IoState};
use relaytimer_hal::{FlexPin, RealTimeClock, RtcError};
use relaytimer_protocol::{HandlerError, HandlerResult, Message, MessageHandlers};

use crate::config::DeviceConfig;
use crate::slots::{AlarmTable, IoBank, TriggerTable, MAX_TRIGGER_LEN};
use crate::sources::Snapshot;

/// Outcome of one [`Controller::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// Clock reading the tick was evaluated at
    pub now: Datetime,
    /// Alarms that became triggered
    pub fired: u8,
    /// Alarms whose duration ran out
    pub expired: u8,
    /// Output channels whose level changed
    pub switched: u8,
}

/// Controller state for the relay timer
pub struct Controller<R, P> {
    rtc: R,
    pins: [P; IO_CHANNELS],
    config: DeviceConfig,
    alarms: AlarmTable,
    triggers: TriggerTable,
    bank: IoBank,
    parser: Parser,
    /// Reply waiting to be sent to the host
    outbox: Option<Message>,
}

impl<R: RealTimeClock, P: FlexPin> Controller<R, P> {
    /// Create a controller and apply the boot configuration
    pub fn new(rtc: R, pins: [P; IO_CHANNELS], config: DeviceConfig) -> Self {
        let mut controller = Self {
            rtc,
            pins,
            config,
            alarms: AlarmTable::new(),
            triggers: TriggerTable::new(),
            bank: IoBank::default(),
            parser: Parser::new(),
            outbox: None,
        };
        controller.apply_config();
        controller
    }

    /// Restore directions and triggers from the configuration
    fn apply_config(&mut self) {
        self.triggers = self.config.triggers.clone();
        for io in IoIndex::all() {
            let direction = self.config.directions[io.as_usize()];
            if self.configure_pin(io, direction).is_err() {
                warn!("channel {} cannot be set to {}", io.get(), direction.token());
            }
        }
    }

    fn configure_pin(&mut self, io: IoIndex, direction: IoDirection) -> HandlerResult {
        let pin = &mut self.pins[io.as_usize()];
        pin.set_direction(direction).map_err(|_| HandlerError::Rejected)?;
        if direction == IoDirection::Output {
            pin.set_low();
        }
        self.bank.set_direction(io, direction);
        Ok(())
    }

    pub fn alarms(&self) -> &AlarmTable {
        &self.alarms
    }

    pub fn triggers(&self) -> &TriggerTable {
        &self.triggers
    }

    pub fn bank(&self) -> &IoBank {
        &self.bank
    }

    pub fn pin(&self, io: IoIndex) -> &P {
        &self.pins[io.as_usize()]
    }

    pub fn rtc_mut(&mut self) -> &mut R {
        &mut self.rtc
    }

    /// Take the last reply produced by a request
    pub fn take_reply(&mut self) -> Option<Message> {
        self.outbox.take()
    }

    /// Level of a channel: sampled for inputs, last driven for outputs
    fn sample(&self, io: IoIndex) -> IoState {
        match self.bank.direction(io) {
            IoDirection::Input => match self.pins[io.as_usize()].is_high() {
                Ok(high) => IoState::from(high),
                Err(_) => IoState::Unknown,
            },
            IoDirection::Output => IoState::from(self.bank.level(io)),
        }
    }

    /// Advance alarms to the current time and update every output
    ///
    /// Call at least once per second with a clock that never runs
    /// backwards.
    pub fn tick(&mut self) -> Result<TickReport, RtcError> {
        let now = self.rtc.now()?;
        let mut report = TickReport {
            now,
            fired: 0,
            expired: 0,
            switched: 0,
        };

        for (id, alarm) in self.alarms.iter_mut() {
            let was_triggered = alarm.is_triggered();
            let triggered = alarm.set_current_time(&now);
            if triggered && !was_triggered {
                info!("alarm {} fired", id.get());
                report.fired += 1;
            } else if was_triggered && !triggered {
                info!("alarm {} expired", id.get());
                report.expired += 1;
            }
        }

        let mut inputs = [false; IO_CHANNELS];
        for (io, level) in IoIndex::all().zip(inputs.iter_mut()) {
            *level = self.sample(io).is_on();
        }
        let snapshot = Snapshot::new(&self.config.sources, inputs, self.alarms.active_mask());

        for io in IoIndex::all() {
            if self.bank.direction(io) != IoDirection::Output {
                continue;
            }
            let level = match self.triggers.get(io) {
                Some(text) => match self.parser.parse(text) {
                    Ok(expression) => expression.evaluate(&snapshot),
                    Err(_) => {
                        warn!("trigger on channel {} does not parse", io.get());
                        false
                    }
                },
                None => false,
            };

            self.pins[io.as_usize()].set_state(level);
            if self.bank.set_level(io, level) {
                debug!("channel {} -> {}", io.get(), level);
                report.switched += 1;
            }
        }

        Ok(report)
    }
}

impl<R: RealTimeClock, P: FlexPin> MessageHandlers for Controller<R, P> {
    fn set_rtc(&mut self, datetime: &Datetime) -> HandlerResult {
        self.rtc.set(datetime).map_err(|_| HandlerError::Rejected)
    }

    fn get_current_rtc(&mut self) -> HandlerResult<Datetime> {
        self.rtc.now().map_err(|_| HandlerError::Rejected)
    }

    fn set_alarm(&mut self, id: AlarmId, alarm: &Alarm) -> HandlerResult {
        debug!("alarm {} armed", id.get());
        self.alarms.set(id, *alarm);
        Ok(())
    }

    fn clear_alarm(&mut self, id: AlarmId) -> HandlerResult {
        self.alarms.clear(id);
        Ok(())
    }

    fn set_trigger(&mut self, io: IoIndex, expression: &str) -> HandlerResult {
        if expression.len() > MAX_TRIGGER_LEN {
            return Err(HandlerError::Rejected);
        }
        if let Err(_e) = self.parser.parse(expression) {
            debug!("trigger rejected: {}", _e);
            return Err(HandlerError::Rejected);
        }
        self.triggers
            .set(io, expression)
            .map_err(|_| HandlerError::Rejected)
    }

    fn clear_trigger(&mut self, io: IoIndex) -> HandlerResult {
        self.triggers.clear(io);
        Ok(())
    }

    fn set_io_type(&mut self, io: IoIndex, direction: IoDirection) -> HandlerResult {
        self.configure_pin(io, direction)
    }

    fn read_io_state(&mut self, io: IoIndex) -> HandlerResult<IoState> {
        Ok(self.sample(io))
    }

    fn reset(&mut self) -> HandlerResult {
        info!("reset");
        self.alarms.clear_all();
        self.apply_config();
        Ok(())
    }

    fn reply(&mut self, message: &[u8]) -> HandlerResult {
        let reply = Message::from_slice(message).map_err(|_| HandlerError::Rejected)?;
        self.outbox = Some(reply);
        Ok(())
    }
}
