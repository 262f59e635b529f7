// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::fmt::Display;

use crate::VirtualRegister;

use super::{IntBounds, IntConstantBounds};

/// Identifies values that are known to be equal at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueNumber(u32);

impl ValueNumber {
    #[must_use]
    pub const fn new(number: u32) -> Self {
        Self(number)
    }

    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl Display for ValueNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Definitely an int32.
    Int,

    /// Profiled as an int32, but not proven yet. Constant bounds are only meaningful once a
    /// fact is attached, since the value may not be an int at all.
    LikelyInt,
}

impl ValueType {
    #[must_use]
    pub const fn is_int(&self) -> bool {
        matches!(self, Self::Int)
    }

    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        if self.is_int() && other.is_int() {
            Self::Int
        } else {
            Self::LikelyInt
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ValueStructure {
    Unknown,
    IntConstant(i32),
    IntRange(IntConstantBounds),
    IntBounded(IntBounds),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueInfo {
    value_type: ValueType,
    structure: ValueStructure,
    symbol_store: Option<VirtualRegister>,
}

impl ValueInfo {
    #[must_use]
    pub const fn likely_int() -> Self {
        Self {
            value_type: ValueType::LikelyInt,
            structure: ValueStructure::Unknown,
            symbol_store: None,
        }
    }

    #[must_use]
    pub const fn int_constant(value: i32) -> Self {
        Self {
            value_type: ValueType::Int,
            structure: ValueStructure::IntConstant(value),
            symbol_store: None,
        }
    }

    #[must_use]
    pub fn int_range(lower_bound: i32, upper_bound: i32) -> Self {
        if lower_bound == upper_bound {
            return Self::int_constant(lower_bound);
        }

        Self {
            value_type: ValueType::Int,
            structure: ValueStructure::IntRange(IntConstantBounds::new(lower_bound, upper_bound)),
            symbol_store: None,
        }
    }

    /// A value that carries a range fact. Keeps the type and symbol store of `template`.
    #[must_use]
    pub fn int_bounded(template: &ValueInfo, bounds: IntBounds) -> Self {
        Self {
            value_type: template.value_type,
            structure: ValueStructure::IntBounded(bounds),
            symbol_store: template.symbol_store,
        }
    }

    /// A plain range (or constant). Keeps the type and symbol store of `template`.
    #[must_use]
    pub fn int_range_like(template: &ValueInfo, lower_bound: i32, upper_bound: i32) -> Self {
        Self {
            symbol_store: template.symbol_store,
            ..Self::int_range(lower_bound, upper_bound)
        }
    }

    #[must_use]
    pub fn with_symbol_store(mut self, register: VirtualRegister) -> Self {
        self.symbol_store = Some(register);
        self
    }

    #[must_use]
    pub fn with_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        self.value_type
    }

    #[must_use]
    pub const fn is_int(&self) -> bool {
        self.value_type.is_int()
    }

    /// The register that holds this value, if any.
    #[must_use]
    pub const fn symbol_store(&self) -> Option<VirtualRegister> {
        self.symbol_store
    }

    #[must_use]
    pub const fn int_bounds(&self) -> Option<&IntBounds> {
        match &self.structure {
            ValueStructure::IntBounded(bounds) => Some(bounds),
            _ => None,
        }
    }

    #[must_use]
    pub fn constant_bounds(&self) -> IntConstantBounds {
        match &self.structure {
            ValueStructure::IntBounded(bounds) => bounds.constant_bounds(),
            ValueStructure::IntConstant(value) if self.is_int() => IntConstantBounds::constant(*value),
            ValueStructure::IntRange(range) if self.is_int() => *range,
            _ => IntConstantBounds::FULL,
        }
    }

    /// The constant this value holds, including likely-int values whose fact pins them down.
    #[must_use]
    pub fn int_constant_value(&self) -> Option<i32> {
        match &self.structure {
            ValueStructure::IntConstant(value) if self.is_int() => Some(*value),
            ValueStructure::IntBounded(bounds) => bounds.constant_bounds().constant_value(),
            _ => None,
        }
    }

    /// Definitely an int, and a constant one.
    #[must_use]
    pub fn has_int_constant_value(&self) -> bool {
        self.is_int() && self.int_constant_value().is_some()
    }

    #[must_use]
    pub fn add_cannot_overflow(&self, n: i32) -> bool {
        let constant_bounds = self.constant_bounds();
        let bound = if n >= 0 { constant_bounds.upper_bound() } else { constant_bounds.lower_bound() };
        if bound.checked_add(n).is_some() {
            return true;
        }

        n != 0 && self.int_bounds().is_some_and(|bounds| bounds.add_cannot_overflow_based_on_relative_bounds(n))
    }

    #[must_use]
    pub fn sub_cannot_overflow(&self, n: i32) -> bool {
        let constant_bounds = self.constant_bounds();
        let bound = if n >= 0 { constant_bounds.lower_bound() } else { constant_bounds.upper_bound() };
        if bound.checked_sub(n).is_some() {
            return true;
        }

        n != 0 && self.int_bounds().is_some_and(|bounds| bounds.sub_cannot_overflow_based_on_relative_bounds(n))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    number: ValueNumber,
    info: ValueInfo,
}

impl Value {
    #[must_use]
    pub const fn new(number: ValueNumber, info: ValueInfo) -> Self {
        Self { number, info }
    }

    #[must_use]
    pub const fn number(&self) -> ValueNumber {
        self.number
    }

    #[must_use]
    pub const fn info(&self) -> &ValueInfo {
        &self.info
    }
}

/// Owns every value of a function. Value numbers index into the table.
#[derive(Debug, Clone, Default)]
pub struct ValueTable {
    values: Vec<Value>,
}

impl ValueTable {
    pub fn new_value(&mut self, info: ValueInfo) -> ValueNumber {
        let number = ValueNumber(self.values.len() as u32);
        self.values.push(Value::new(number, info));
        number
    }

    #[must_use]
    pub fn get(&self, number: ValueNumber) -> &Value {
        &self.values[number.0 as usize]
    }

    pub fn set_info(&mut self, number: ValueNumber, info: ValueInfo) {
        self.values[number.0 as usize].info = info;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn likely_int_has_no_known_range() {
        let info = ValueInfo::int_range(0, 10).with_type(ValueType::LikelyInt);
        assert_eq!(info.constant_bounds(), IntConstantBounds::FULL);
        assert_eq!(info.int_constant_value(), None);
    }

    #[test]
    fn range_of_one_value_is_a_constant() {
        let info = ValueInfo::int_range(7, 7);
        assert!(info.has_int_constant_value());
        assert_eq!(info.int_constant_value(), Some(7));
    }

    #[rstest]
    #[case(0, 10, 5, true)]
    #[case(0, i32::MAX, 1, false)]
    #[case(i32::MIN, 0, -1, false)]
    #[case(i32::MIN, 0, 1, true)]
    fn add_overflow_from_constant_bounds(#[case] lower: i32, #[case] upper: i32, #[case] n: i32, #[case] cannot_overflow: bool) {
        let info = ValueInfo::int_range(lower, upper);
        assert_eq!(info.add_cannot_overflow(n), cannot_overflow);
    }
}
