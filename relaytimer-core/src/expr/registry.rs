//! Function table referenced by numeric ids in expressions

use super::error::RegistryError;

/// Number of function slots (ids 0-15)
pub const MAX_FUNCTIONS: usize = 16;

/// Identifier of a boolean function
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FunctionId(u8);

impl FunctionId {
    pub fn new(id: u8) -> Option<Self> {
        if (id as usize) < MAX_FUNCTIONS {
            Some(Self(id))
        } else {
            None
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Source of values for function references during evaluation
pub trait FunctionTable {
    /// Current value of function `id`
    fn call(&self, id: FunctionId) -> bool;
}

/// Nullary boolean function
pub type BoolFn = fn() -> bool;

/// Late-bound table of plain functions
///
/// Slots that were never registered evaluate to `false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FunctionRegistry {
    slots: [Option<BoolFn>; MAX_FUNCTIONS],
}

impl FunctionRegistry {
    pub const fn new() -> Self {
        Self {
            slots: [None; MAX_FUNCTIONS],
        }
    }

    /// Bind `function` to id `id`, replacing any previous binding
    pub fn register(&mut self, id: u8, function: BoolFn) -> Result<(), RegistryError> {
        let id = FunctionId::new(id).ok_or(RegistryError::InvalidFunctionId(id))?;
        self.slots[id.as_usize()] = Some(function);
        Ok(())
    }

    /// Return id `id` to the default `false` function
    pub fn unregister(&mut self, id: FunctionId) {
        self.slots[id.as_usize()] = None;
    }

    pub fn is_registered(&self, id: FunctionId) -> bool {
        self.slots[id.as_usize()].is_some()
    }
}

impl FunctionTable for FunctionRegistry {
    fn call(&self, id: FunctionId) -> bool {
        self.slots[id.as_usize()].is_some_and(|function| function())
    }
}

impl FunctionTable for [bool; MAX_FUNCTIONS] {
    fn call(&self, id: FunctionId) -> bool {
        self[id.as_usize()]
    }
}
