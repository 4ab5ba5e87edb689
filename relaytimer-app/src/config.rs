//! Device configuration
//!
//! Boot-time settings read from a TOML document: channel directions,
//! function id bindings and triggers armed at power-up. Every field is
//! optional; anything left out keeps its default.
//!
//! ```toml
//! [[io]]
//! index = 3
//! direction = "out"
//!
//! [[function]]
//! id = 15
//! source = "always"
//!
//! [[trigger]]
//! io = 3
//! expression = "0&!4"
//! ```

use alloc::string::String;
use alloc::vec::Vec;

use serde::Deserialize;

use relaytimer_core::expr::{FunctionId, ParseError, Parser};
use relaytimer_core::io::IO_CHANNELS;
use relaytimer_core::{AlarmId, IoDirection, IoIndex};

use crate::slots::{TriggerTable, MAX_TRIGGER_LEN};
use crate::sources::{Source, SourceMap};

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The document is not valid TOML or has the wrong shape
    Toml,
    /// A channel or alarm index is out of range
    InvalidIndex(u8),
    /// A function id is above 15
    InvalidFunctionId(u8),
    /// A trigger expression does not parse
    Expression(ParseError),
    /// A trigger expression is longer than a trigger slot
    ExpressionTooLong,
    /// More entries than the device has slots for
    TooManyItems,
}

impl From<ParseError> for ConfigError {
    fn from(e: ParseError) -> Self {
        ConfigError::Expression(e)
    }
}

#[derive(Debug, Deserialize)]
struct IoEntry {
    index: u8,
    direction: IoDirection,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum SourceKind {
    Input,
    Alarm,
    Always,
    Never,
}

#[derive(Debug, Deserialize)]
struct FunctionEntry {
    id: u8,
    source: SourceKind,
    #[serde(default)]
    index: u8,
}

#[derive(Debug, Deserialize)]
struct TriggerEntry {
    io: u8,
    expression: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    io: Vec<IoEntry>,
    #[serde(default)]
    function: Vec<FunctionEntry>,
    #[serde(default)]
    trigger: Vec<TriggerEntry>,
}

/// Validated device configuration
#[derive(Debug, Clone, Default)]
pub struct DeviceConfig {
    pub directions: [IoDirection; IO_CHANNELS],
    pub sources: SourceMap,
    pub triggers: TriggerTable,
}

impl DeviceConfig {
    /// Parse and validate a TOML document
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(text).map_err(|_| {
            warn!("config TOML rejected");
            ConfigError::Toml
        })?;

        let config = Self::from_raw(raw)?;
        log_config_summary(&config);
        Ok(config)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if raw.io.len() > IO_CHANNELS || raw.trigger.len() > IO_CHANNELS {
            return Err(ConfigError::TooManyItems);
        }

        for entry in &raw.io {
            let io = IoIndex::new(entry.index).ok_or(ConfigError::InvalidIndex(entry.index))?;
            config.directions[io.as_usize()] = entry.direction;
        }

        for entry in &raw.function {
            let id = FunctionId::new(entry.id).ok_or(ConfigError::InvalidFunctionId(entry.id))?;
            config.sources.set(id, source_for(entry)?);
        }

        let mut parser = Parser::new();
        for entry in &raw.trigger {
            let io = IoIndex::new(entry.io).ok_or(ConfigError::InvalidIndex(entry.io))?;
            if entry.expression.len() > MAX_TRIGGER_LEN {
                return Err(ConfigError::ExpressionTooLong);
            }
            parser.parse(&entry.expression)?;
            config
                .triggers
                .set(io, &entry.expression)
                .map_err(|_| ConfigError::ExpressionTooLong)?;
        }

        Ok(config)
    }
}

fn source_for(entry: &FunctionEntry) -> Result<Source, ConfigError> {
    let source = match entry.source {
        SourceKind::Input => Source::Input(
            IoIndex::new(entry.index).ok_or(ConfigError::InvalidIndex(entry.index))?,
        ),
        SourceKind::Alarm => Source::Alarm(
            AlarmId::new(entry.index).ok_or(ConfigError::InvalidIndex(entry.index))?,
        ),
        SourceKind::Always => Source::Always,
        SourceKind::Never => Source::Never,
    };
    Ok(source)
}

/// Log a summary of the loaded configuration
pub fn log_config_summary(config: &DeviceConfig) {
    info!("Configuration loaded");
    for io in IoIndex::all() {
        debug!(
            "  channel {}: {}",
            io.get(),
            config.directions[io.as_usize()].token()
        );
    }
    debug!("  {} triggers", config.triggers.armed_count());
}
