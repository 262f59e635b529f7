// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::fmt::Display;

use crate::{analysis::{Value, ValueNumber}, VirtualRegister};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundDirection {
    Lower,
    Upper,
}

impl BoundDirection {
    #[must_use]
    pub const fn opposite(&self) -> Self {
        match self {
            Self::Lower => Self::Upper,
            Self::Upper => Self::Lower,
        }
    }

    /// Whether a bound at `offset` in this direction is impossible given a bound at
    /// `opposite_offset` on the same base in the opposite direction, e.g. `x >= b + 3`
    /// together with `x <= b + 2`.
    #[must_use]
    pub const fn contradicts(&self, offset: i32, opposite_offset: i32) -> bool {
        match self {
            Self::Lower => offset > opposite_offset,
            Self::Upper => offset < opposite_offset,
        }
    }
}

/// How two bounds on the same base are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MergeMode {
    /// Both facts hold on the current path: keep the tighter one.
    Aggressive,

    /// Only one of the facts holds (control-flow join): keep the weaker one.
    Conservative,
}

/// `value (>= | <=) base + offset`, where the direction is determined by the set the bound
/// is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelativeBound {
    base_value_number: ValueNumber,
    base_register: Option<VirtualRegister>,
    offset: i32,
    was_established_explicitly: bool,
}

impl RelativeBound {
    #[must_use]
    pub fn new(base: &Value, offset: i32, was_established_explicitly: bool) -> Self {
        Self {
            base_value_number: base.number(),
            base_register: base.info().symbol_store(),
            offset,
            was_established_explicitly,
        }
    }

    #[must_use]
    pub const fn base_value_number(&self) -> ValueNumber {
        self.base_value_number
    }

    /// A register holding the base value, which a bound check can reference.
    #[must_use]
    pub const fn base_register(&self) -> Option<VirtualRegister> {
        self.base_register
    }

    #[must_use]
    pub const fn offset(&self) -> i32 {
        self.offset
    }

    pub fn set_offset(&mut self, offset: i32) {
        self.offset = offset;
    }

    #[must_use]
    pub const fn was_established_explicitly(&self) -> bool {
        self.was_established_explicitly
    }

    pub fn set_was_established_explicitly(&mut self) {
        self.was_established_explicitly = true;
    }

    /// Shifts the offset by `n`. Returns `false` and leaves the bound untouched on overflow.
    #[must_use]
    pub fn add(&mut self, n: i32) -> bool {
        match self.offset.checked_add(n) {
            Some(offset) => {
                self.offset = offset;
                true
            }
            None => false,
        }
    }

    pub fn merge(&mut self, direction: BoundDirection, mode: MergeMode, other: &RelativeBound) {
        debug_assert_eq!(self.base_value_number, other.base_value_number);

        if self.base_register.is_none() {
            self.base_register = other.base_register;
        }

        self.merge_constant_value(direction, mode, other.offset);

        let aggressive = mode == MergeMode::Aggressive;
        if other.was_established_explicitly == aggressive {
            self.was_established_explicitly = aggressive;
        }
    }

    /// Merges down for a conservative lower or aggressive upper bound, and up for a
    /// conservative upper or aggressive lower bound.
    pub fn merge_constant_value(&mut self, direction: BoundDirection, mode: MergeMode, value: i32) {
        let lower = direction == BoundDirection::Lower;
        let aggressive = mode == MergeMode::Aggressive;

        let replace = if lower ^ aggressive {
            value < self.offset
        } else {
            value > self.offset
        };

        if replace {
            self.offset = value;
        }
    }
}

impl Display for RelativeBound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.base_value_number)?;

        if self.offset != 0 {
            write!(f, " {} {}", if self.offset < 0 { '-' } else { '+' }, self.offset.unsigned_abs())?;
        }

        if self.was_established_explicitly {
            f.write_str(" (expliciet)")?;
        }

        Ok(())
    }
}
