// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::collections::BTreeMap;

use crate::backend::LifetimeId;

use super::{MachineType, VirtualRegister};

/// The constant a single-definition register is known to hold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SymbolConstant {
    Int(i32),
    Float(f64),
    /// A tagged pointer to runtime data.
    Address(u64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub machine_type: MachineType,
    pub(crate) constant: Option<SymbolConstant>,
    pub(crate) definition_count: u32,

    /// Outgoing-argument slot. Such a register never gets a lifetime.
    pub is_arg_slot: bool,

    /// Backs a user-visible local that the debugger may inspect.
    pub is_non_temp_local: bool,

    pub(crate) lifetime: Option<LifetimeId>,
}

impl Symbol {
    #[must_use]
    pub const fn new(machine_type: MachineType) -> Self {
        Self {
            machine_type,
            constant: None,
            definition_count: 0,
            is_arg_slot: false,
            is_non_temp_local: false,
            lifetime: None,
        }
    }

    /// Constant-ness is only known for registers with exactly one definition.
    #[must_use]
    pub fn constant(&self) -> Option<SymbolConstant> {
        if self.definition_count == 1 {
            self.constant
        } else {
            None
        }
    }

    #[must_use]
    pub fn int_constant(&self) -> Option<i32> {
        match self.constant()? {
            SymbolConstant::Int(value) => Some(value),
            _ => None,
        }
    }

    /// A constant that is neither an int nor a float, i.e. an address.
    #[must_use]
    pub fn address_constant(&self) -> Option<u64> {
        match self.constant()? {
            SymbolConstant::Address(address) => Some(address),
            _ => None,
        }
    }

    #[must_use]
    pub const fn lifetime(&self) -> Option<LifetimeId> {
        self.lifetime
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    symbols: BTreeMap<VirtualRegister, Symbol>,
}

impl SymbolTable {
    pub fn insert(&mut self, register: VirtualRegister, symbol: Symbol) {
        let previous = self.symbols.insert(register, symbol);
        debug_assert!(previous.is_none(), "Register {register} is al gedeclareerd");
    }

    #[must_use]
    pub fn get(&self, register: VirtualRegister) -> Option<&Symbol> {
        self.symbols.get(&register)
    }

    #[must_use]
    pub fn get_mut(&mut self, register: VirtualRegister) -> Option<&mut Symbol> {
        self.symbols.get_mut(&register)
    }

    #[must_use]
    pub fn contains(&self, register: VirtualRegister) -> bool {
        self.symbols.contains_key(&register)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&VirtualRegister, &Symbol)> {
        self.symbols.iter()
    }

    pub(crate) fn clear_lifetimes(&mut self) {
        for symbol in self.symbols.values_mut() {
            symbol.lifetime = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_requires_single_definition() {
        let mut symbol = Symbol::new(MachineType::Int32);
        symbol.constant = Some(SymbolConstant::Int(4));
        symbol.definition_count = 1;
        assert_eq!(symbol.int_constant(), Some(4));

        symbol.definition_count = 2;
        assert_eq!(symbol.constant(), None);
    }

    #[test]
    fn address_constant_is_not_int() {
        let mut symbol = Symbol::new(MachineType::Int64);
        symbol.constant = Some(SymbolConstant::Address(0x1000));
        symbol.definition_count = 1;

        assert_eq!(symbol.int_constant(), None);
        assert_eq!(symbol.address_constant(), Some(0x1000));
    }
}
