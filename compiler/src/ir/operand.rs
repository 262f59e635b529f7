// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::fmt::{Display, Write};

use super::MachineType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Immediate {
    Integer8(i8),
    Integer16(i16),
    Integer32(i32),
    Integer64(i64),
}

impl Immediate {
    #[must_use]
    pub fn shrink_if_possible(self) -> Self {
        let value = self.as_i64();

        if let Ok(i8) = i8::try_from(value) {
            return Self::Integer8(i8);
        }

        if let Ok(i16) = i16::try_from(value) {
            return Self::Integer16(i16);
        }

        if let Ok(i32) = i32::try_from(value) {
            return Self::Integer32(i32);
        }

        Self::Integer64(value)
    }

    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        match self {
            Self::Integer8(i) => *i as i64,
            Self::Integer16(i) => *i as i64,
            Self::Integer32(i) => *i as i64,
            Self::Integer64(i) => *i,
        }
    }
}

impl Display for Immediate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer8(val) => val.fmt(f),
            Self::Integer16(val) => val.fmt(f),
            Self::Integer32(val) => val.fmt(f),
            Self::Integer64(val) => val.fmt(f),
        }
    }
}

/// A compiler-generated register, which isn't bound to a machine register yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VirtualRegister {
    number: usize,
}

impl VirtualRegister {
    #[must_use]
    pub const fn new(number: usize) -> Self {
        Self { number }
    }

    #[must_use]
    pub const fn number(&self) -> usize {
        self.number
    }
}

impl Display for VirtualRegister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_char('r')?;
        self.number.fmt(f)
    }
}

#[derive(Debug)]
pub struct RegisterAllocator {
    next_number: usize,
}

impl RegisterAllocator {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next_number: 1,
        }
    }

    #[must_use]
    pub const fn next(&mut self) -> VirtualRegister {
        let reg = VirtualRegister { number: self.next_number };

        self.next_number += 1;

        reg
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhysicalRegister {
    number: u8,
}

impl PhysicalRegister {
    #[must_use]
    pub const fn new(number: u8) -> Self {
        debug_assert!(number < 64);
        Self { number }
    }

    #[must_use]
    pub const fn number(&self) -> u8 {
        self.number
    }
}

impl Display for PhysicalRegister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("phys")?;
        self.number.fmt(f)
    }
}

/// A bit set of physical registers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RegisterSet {
    bits: u64,
}

impl RegisterSet {
    pub fn insert(&mut self, register: PhysicalRegister) {
        self.bits |= 1u64 << register.number();
    }

    #[must_use]
    pub const fn contains(&self, register: PhysicalRegister) -> bool {
        self.bits & (1u64 << register.number()) != 0
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }
}

/// A register operand. Either `register` or `physical` (or both) is present: a pure
/// physical register has no symbol and therefore no lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterOperand {
    pub register: Option<VirtualRegister>,
    pub physical: Option<PhysicalRegister>,
    pub machine_type: MachineType,
}

impl RegisterOperand {
    #[must_use]
    pub const fn virtual_register(register: VirtualRegister, machine_type: MachineType) -> Self {
        Self {
            register: Some(register),
            physical: None,
            machine_type,
        }
    }

    #[must_use]
    pub const fn physical_register(physical: PhysicalRegister, machine_type: MachineType) -> Self {
        Self {
            register: None,
            physical: Some(physical),
            machine_type,
        }
    }
}

impl Display for RegisterOperand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.register, self.physical) {
            (Some(register), Some(physical)) => write!(f, "{register}({physical})"),
            (Some(register), None) => register.fmt(f),
            (None, Some(physical)) => physical.fmt(f),
            (None, None) => f.write_str("<leeg>"),
        }
    }
}

/// `[base + (index << scale) + offset]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndirectOperand {
    pub base: RegisterOperand,
    pub index: Option<RegisterOperand>,
    pub scale: u8,
    pub offset: i32,
    pub machine_type: MachineType,
}

impl Display for IndirectOperand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}", self.base)?;

        if let Some(index) = &self.index {
            write!(f, " + {index}")?;
            if self.scale != 0 {
                write!(f, " << {}", self.scale)?;
            }
        }

        if self.offset != 0 {
            write!(f, " + {}", self.offset)?;
        }

        f.write_char(']')
    }
}

/// A memory access at a fixed address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryReference {
    pub address: u64,
    pub machine_type: MachineType,
}

impl Display for MemoryReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:#x}]", self.address)
    }
}

/// An incoming parameter that still lives in its stack slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterSlotOperand {
    pub register: VirtualRegister,
    pub slot: u16,
    /// Implicit parameters are passed by the runtime (function object, call info), explicit
    /// ones by the caller.
    pub implicit: bool,
    pub machine_type: MachineType,
}

impl Display for ParameterSlotOperand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = if self.implicit { "impliciet" } else { "param" };
        write!(f, "{}<{kind}{}>", self.register, self.slot)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Immediate(Immediate),
    Register(RegisterOperand),
    Indirect(IndirectOperand),
    MemoryReference(MemoryReference),
    ParameterSlot(ParameterSlotOperand),
}

impl Operand {
    #[must_use]
    pub const fn as_immediate(&self) -> Option<Immediate> {
        match self {
            Self::Immediate(immediate) => Some(*immediate),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_register(&self) -> Option<&RegisterOperand> {
        match self {
            Self::Register(register) => Some(register),
            _ => None,
        }
    }

    /// Iterates over the virtual registers this operand reads or writes.
    pub fn virtual_registers(&self) -> impl Iterator<Item = VirtualRegister> {
        let (first, second) = match self {
            Self::Register(reg) => (reg.register, None),
            Self::Indirect(indirect) => (indirect.base.register, indirect.index.and_then(|index| index.register)),
            Self::ParameterSlot(slot) => (Some(slot.register), None),
            Self::Immediate(..) | Self::MemoryReference(..) => (None, None),
        };

        first.into_iter().chain(second)
    }
}

impl Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Immediate(immediate) => immediate.fmt(f),
            Self::Register(register) => register.fmt(f),
            Self::Indirect(indirect) => indirect.fmt(f),
            Self::MemoryReference(memory) => memory.fmt(f),
            Self::ParameterSlot(slot) => slot.fmt(f),
        }
    }
}

impl From<Immediate> for Operand {
    fn from(value: Immediate) -> Self {
        Self::Immediate(value)
    }
}

impl From<RegisterOperand> for Operand {
    fn from(value: RegisterOperand) -> Self {
        Self::Register(value)
    }
}

impl From<IndirectOperand> for Operand {
    fn from(value: IndirectOperand) -> Self {
        Self::Indirect(value)
    }
}
