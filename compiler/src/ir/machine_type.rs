// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::fmt::Display;

use strum::{AsRefStr, EnumIter};

/// The machine-level type of a register or memory operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, EnumIter)]
pub enum MachineType {
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    Simd128F4,
    Simd128I4,
    Simd128I8,
    Simd128I16,
    Simd128U4,
    Simd128U8,
    Simd128U16,
    Simd128B4,
    Simd128B8,
    Simd128B16,
    Simd128D2,
}

impl MachineType {
    /// Size in bytes.
    #[must_use]
    pub const fn size(&self) -> u8 {
        match self {
            Self::Int8 | Self::Uint8 => 1,
            Self::Int16 | Self::Uint16 => 2,
            Self::Int32 | Self::Uint32 | Self::Float32 => 4,
            Self::Int64 | Self::Uint64 | Self::Float64 => 8,
            _ => 16,
        }
    }

    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    #[must_use]
    pub const fn is_simd128(&self) -> bool {
        self.size() == 16
    }

    #[must_use]
    pub const fn is_integer(&self) -> bool {
        !self.is_float() && !self.is_simd128()
    }
}

impl Display for MachineType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_type_is_exactly_one_class() {
        for ty in MachineType::iter() {
            let classes = [ty.is_integer(), ty.is_float(), ty.is_simd128()];
            assert_eq!(classes.iter().filter(|x| **x).count(), 1, "{ty} heeft meerdere klassen");
        }
    }
}
