// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use serde::Deserialize;

use crate::{InstructionKind, PhysicalRegister};

/// Windows x64 argument registers, by encoding number (rcx, rdx, r8, r9).
const X86_64_ARGUMENT_REGISTERS: [PhysicalRegister; 4] = [
    PhysicalRegister::new(1),
    PhysicalRegister::new(2),
    PhysicalRegister::new(8),
    PhysicalRegister::new(9),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum Architecture {
    #[serde(rename = "x86")]
    X86,

    #[default]
    #[serde(rename = "x86-64")]
    X86_64,

    #[serde(rename = "arm")]
    Arm,

    #[serde(rename = "aarch64")]
    AArch64,
}

impl Architecture {
    #[must_use]
    pub const fn is_64_bit(&self) -> bool {
        matches!(self, Self::X86_64 | Self::AArch64)
    }

    #[must_use]
    pub const fn pointer_size(&self) -> usize {
        if self.is_64_bit() { 8 } else { 4 }
    }

    /// 32-bit ARM has no addressing mode that takes an arbitrary absolute address.
    #[must_use]
    pub const fn can_fold_indirect_operands(&self) -> bool {
        !matches!(self, Self::Arm)
    }

    /// Memory operands on x86-64 only encode a sign-extended 32-bit displacement.
    #[must_use]
    pub const fn fits_in_displacement(&self, address: u64) -> bool {
        match self {
            Self::X86_64 => address as i64 == address as i32 as i64,
            _ => true,
        }
    }

    /// Instructions whose destination register is also one of their inputs.
    #[must_use]
    pub const fn reads_destination(&self, kind: &InstructionKind) -> bool {
        match self {
            Self::X86 | Self::X86_64 => matches!(kind, InstructionKind::Shuffle),
            _ => false,
        }
    }

    /// The register a parameter arrives in, if any. The first two implicit parameters
    /// (function object and call info) come first, followed by the explicit ones.
    #[must_use]
    pub const fn parameter_register(&self, slot: u16, implicit: bool) -> Option<PhysicalRegister> {
        match self {
            Self::X86_64 => {
                let index = match (implicit, slot) {
                    (true, 1) => 0,
                    (true, 2) => 1,
                    (false, 1) => 2,
                    (false, 2) => 3,
                    _ => return None,
                };
                Some(X86_64_ARGUMENT_REGISTERS[index])
            }
            _ => None,
        }
    }
}
