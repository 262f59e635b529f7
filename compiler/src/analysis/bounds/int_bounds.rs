// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::fmt::Display;

use log::trace;

use crate::analysis::{Value, ValueNumber, ValueType};

use super::{BoundDirection, IntConstantBounds, MergeMode, RelativeBound, RelativeBoundSet};

/// A range fact: constant bounds plus bounds relative to other values.
///
/// Every fact is sound on the path it is attached to: a bound may be weaker than the truth,
/// but never tighter. Operations that would overflow or contradict an existing bound drop
/// the new information instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntBounds {
    constant_lower_bound: i32,
    constant_upper_bound: i32,
    was_constant_upper_bound_established_explicitly: bool,
    relative_lower_bounds: RelativeBoundSet,
    relative_upper_bounds: RelativeBoundSet,
}

impl IntBounds {
    /// Creates a fact, or `None` if it would not carry any information.
    #[must_use]
    pub fn new(constant_bounds: IntConstantBounds, was_constant_upper_bound_established_explicitly: bool) -> Option<Self> {
        let bounds = Self::with_constant_bounds(constant_bounds, was_constant_upper_bound_established_explicitly);
        bounds.has_bounds().then_some(bounds)
    }

    /// Creates a working fact that may not carry any information yet.
    #[must_use]
    pub fn with_constant_bounds(constant_bounds: IntConstantBounds, was_constant_upper_bound_established_explicitly: bool) -> Self {
        Self {
            constant_lower_bound: constant_bounds.lower_bound(),
            constant_upper_bound: constant_bounds.upper_bound(),
            was_constant_upper_bound_established_explicitly,
            relative_lower_bounds: RelativeBoundSet::default(),
            relative_upper_bounds: RelativeBoundSet::default(),
        }
    }

    fn verify(&self) {
        debug_assert!(self.constant_lower_bound <= self.constant_upper_bound);
        debug_assert!(self.has_bounds());
    }

    #[must_use]
    pub fn has_bounds(&self) -> bool {
        self.constant_lower_bound != i32::MIN
            || self.constant_upper_bound != i32::MAX
            || self.requires_int_bounded_value_info()
    }

    /// Whether the fact holds more than a plain constant range can express.
    #[must_use]
    pub fn requires_int_bounded_value_info(&self) -> bool {
        self.was_constant_upper_bound_established_explicitly
            || !self.relative_lower_bounds.is_empty()
            || !self.relative_upper_bounds.is_empty()
    }

    /// A likely-int value needs the fact to carry its range at all.
    #[must_use]
    pub fn requires_int_bounded_value_info_for(&self, value_type: ValueType) -> bool {
        !value_type.is_int() || self.requires_int_bounded_value_info()
    }

    #[must_use]
    pub const fn constant_lower_bound(&self) -> i32 {
        self.constant_lower_bound
    }

    #[must_use]
    pub const fn constant_upper_bound(&self) -> i32 {
        self.constant_upper_bound
    }

    #[must_use]
    pub const fn constant_bounds(&self) -> IntConstantBounds {
        IntConstantBounds::new(self.constant_lower_bound, self.constant_upper_bound)
    }

    #[must_use]
    pub const fn was_constant_upper_bound_established_explicitly(&self) -> bool {
        self.was_constant_upper_bound_established_explicitly
    }

    #[must_use]
    pub const fn relative_lower_bounds(&self) -> &RelativeBoundSet {
        &self.relative_lower_bounds
    }

    #[must_use]
    pub const fn relative_upper_bounds(&self) -> &RelativeBoundSet {
        &self.relative_upper_bounds
    }

    #[must_use]
    pub const fn relative_bounds(&self, direction: BoundDirection) -> &RelativeBoundSet {
        match direction {
            BoundDirection::Lower => &self.relative_lower_bounds,
            BoundDirection::Upper => &self.relative_upper_bounds,
        }
    }

    /// The set for `direction`, and the one for the opposite direction.
    fn relative_bounds_mut(&mut self, direction: BoundDirection) -> (&mut RelativeBoundSet, &RelativeBoundSet) {
        match direction {
            BoundDirection::Lower => (&mut self.relative_lower_bounds, &self.relative_upper_bounds),
            BoundDirection::Upper => (&mut self.relative_upper_bounds, &self.relative_lower_bounds),
        }
    }

    /// Raises the constant lower bound. Only takes effect when strictly tighter and not past
    /// the upper bound.
    pub fn set_lower_bound(&mut self, constant_bound: i32) {
        if self.constant_lower_bound < constant_bound && constant_bound <= self.constant_upper_bound {
            self.constant_lower_bound = constant_bound;
        }
    }

    pub fn set_upper_bound(&mut self, constant_bound: i32, was_established_explicitly: bool) {
        if self.constant_lower_bound <= constant_bound && constant_bound < self.constant_upper_bound {
            self.constant_upper_bound = constant_bound;
        }

        if was_established_explicitly {
            self.was_constant_upper_bound_established_explicitly = true;
        }
    }

    /// `value >= constant_bound_base + offset`, ignored when the sum overflows.
    pub fn set_lower_bound_with_offset(&mut self, constant_bound_base: i32, offset: i32) {
        self.set_bound_with_offset(BoundDirection::Lower, constant_bound_base, offset, false);
    }

    /// `value <= constant_bound_base + offset`, ignored when the sum overflows.
    pub fn set_upper_bound_with_offset(&mut self, constant_bound_base: i32, offset: i32, was_established_explicitly: bool) {
        self.set_bound_with_offset(BoundDirection::Upper, constant_bound_base, offset, was_established_explicitly);
    }

    fn set_bound_with_offset(&mut self, direction: BoundDirection, constant_bound_base: i32, offset: i32, was_established_explicitly: bool) {
        let constant_bound = if offset == 0 {
            constant_bound_base
        } else {
            match constant_bound_base.checked_add(offset) {
                Some(bound) => bound,
                None => return,
            }
        };

        match direction {
            BoundDirection::Lower => self.set_lower_bound(constant_bound),
            BoundDirection::Upper => self.set_upper_bound(constant_bound, was_established_explicitly),
        }
    }

    /// `my_value >= base + offset`.
    pub fn set_lower_bound_relative(&mut self, my_value_number: ValueNumber, base: &Value, offset: i32, was_established_explicitly: bool) {
        self.set_bound_relative(BoundDirection::Lower, my_value_number, base, offset, was_established_explicitly);
    }

    /// `my_value <= base + offset`.
    pub fn set_upper_bound_relative(&mut self, my_value_number: ValueNumber, base: &Value, offset: i32, was_established_explicitly: bool) {
        self.set_bound_relative(BoundDirection::Upper, my_value_number, base, offset, was_established_explicitly);
    }

    fn set_bound_relative(
        &mut self,
        direction: BoundDirection,
        my_value_number: ValueNumber,
        base: &Value,
        offset: i32,
        was_established_explicitly: bool,
    ) {
        debug_assert_ne!(base.number(), my_value_number);

        // The constant bound of the base carries over, adjusted by the offset.
        let base_info = base.info();
        let base_constant_bounds = base_info.constant_bounds();
        let constant_bound_base = match direction {
            BoundDirection::Lower => base_constant_bounds.lower_bound(),
            BoundDirection::Upper => base_constant_bounds.upper_bound(),
        };
        let is_bound_constant = base_info.has_int_constant_value();
        self.set_bound_with_offset(direction, constant_bound_base, offset, was_established_explicitly && is_bound_constant);

        if is_bound_constant {
            return;
        }

        // So do the base's own relative bounds in the same direction.
        if let Some(base_bounds) = base_info.int_bounds() {
            for bound in base_bounds.relative_bounds(direction).iter() {
                let mut bound = *bound;
                if bound.base_value_number() == my_value_number || !bound.add(offset) {
                    continue;
                }

                self.insert_relative_bound(direction, bound);
            }
        }

        self.insert_relative_bound(direction, RelativeBound::new(base, offset, was_established_explicitly));
    }

    /// Adds a bound, merging it with an existing one on the same base. A bound that
    /// contradicts the opposite bound on the same base is dropped.
    fn insert_relative_bound(&mut self, direction: BoundDirection, bound: RelativeBound) -> bool {
        let base = bound.base_value_number();
        let (bound_set, opposite_bound_set) = self.relative_bounds_mut(direction);

        if let Some(opposite) = opposite_bound_set.get(base) {
            if direction.contradicts(bound.offset(), opposite.offset()) {
                trace!("Tegenstrijdige {direction:?}-grens {bound} genegeerd (tegenover {opposite})");
                return false;
            }
        }

        match bound_set.get_mut(base) {
            Some(existing) => existing.merge(direction, MergeMode::Aggressive, &bound),
            None => bound_set.insert(bound),
        }

        true
    }

    /// Narrows the constant bounds given `value != constant_value`. Returns whether
    /// anything changed.
    pub fn set_is_not_constant(&mut self, constant_value: i32, is_explicit: bool) -> bool {
        if self.constant_lower_bound == self.constant_upper_bound {
            return false;
        }

        debug_assert!(self.constant_lower_bound < self.constant_upper_bound);
        if constant_value == self.constant_lower_bound {
            self.constant_lower_bound += 1;
            return true;
        }

        if constant_value == self.constant_upper_bound {
            self.constant_upper_bound -= 1;
            if is_explicit {
                self.was_constant_upper_bound_established_explicitly = true;
            }
            return true;
        }

        false
    }

    /// Narrows the fact given `value != other`. A zero-offset relative bound on `other` is
    /// tightened by one, unless both directions have one (either would contradict the other).
    pub fn set_is_not_value(&mut self, other: &Value, is_explicit: bool) -> bool {
        let info = other.info();

        let changed = match info.int_constant_value() {
            Some(constant_value) => {
                let changed = self.set_is_not_constant(constant_value, is_explicit);
                if info.is_int() {
                    return changed;
                }
                changed
            }
            None => false,
        };

        let value_number = other.number();
        let lower_is_zero = self.relative_lower_bounds.get(value_number).is_some_and(|bound| bound.offset() == 0);
        let upper_is_zero = self.relative_upper_bounds.get(value_number).is_some_and(|bound| bound.offset() == 0);

        if lower_is_zero == upper_is_zero {
            return changed;
        }

        if lower_is_zero {
            if let Some(bound) = self.relative_lower_bounds.get_mut(value_number) {
                bound.set_offset(1);
            }
        } else if let Some(bound) = self.relative_upper_bounds.get_mut(value_number) {
            bound.set_offset(-1);
            if is_explicit {
                bound.set_was_established_explicitly();
            }
        }

        true
    }

    /// Whether `constant_value >= constant_bound_base + offset`, where a sum that
    /// overflows is treated as unbounded in the direction of the overflow.
    #[must_use]
    pub fn is_constant_greater_than_or_equal_to(constant_value: i32, constant_bound_base: i32, offset: i32) -> bool {
        if offset == 0 {
            return constant_value >= constant_bound_base;
        }

        if offset == 1 {
            return constant_value > constant_bound_base;
        }

        let constant_bound = (constant_bound_base as u32).wrapping_add(offset as u32) as i32;
        if offset >= 0 {
            constant_bound >= constant_bound_base && constant_value >= constant_bound
        } else {
            constant_bound >= constant_bound_base || constant_value >= constant_bound
        }
    }

    /// Whether `constant_value <= constant_bound_base + offset`, see
    /// [`Self::is_constant_greater_than_or_equal_to`].
    #[must_use]
    pub fn is_constant_less_than_or_equal_to(constant_value: i32, constant_bound_base: i32, offset: i32) -> bool {
        if offset == 0 {
            return constant_value <= constant_bound_base;
        }

        if offset == -1 {
            return constant_value < constant_bound_base;
        }

        let constant_bound = (constant_bound_base as u32).wrapping_add(offset as u32) as i32;
        if offset >= 0 {
            constant_bound < constant_bound_base || constant_value <= constant_bound
        } else {
            constant_bound < constant_bound_base && constant_value <= constant_bound
        }
    }

    #[must_use]
    pub fn is_greater_than_or_equal_to_constant(&self, constant_bound_base: i32, offset: i32) -> bool {
        Self::is_constant_greater_than_or_equal_to(self.constant_lower_bound, constant_bound_base, offset)
    }

    #[must_use]
    pub fn is_less_than_or_equal_to_constant(&self, constant_bound_base: i32, offset: i32) -> bool {
        Self::is_constant_less_than_or_equal_to(self.constant_upper_bound, constant_bound_base, offset)
    }

    /// Whether the value is provably `>= other + offset`.
    #[must_use]
    pub fn is_greater_than_or_equal_to(&self, other: &Value, offset: i32) -> bool {
        let info = other.info();
        if self.is_greater_than_or_equal_to_constant(info.constant_bounds().upper_bound(), offset) {
            return true;
        }

        if info.has_int_constant_value() {
            return false;
        }

        self.relative_lower_bounds.get(other.number()).is_some_and(|bound| bound.offset() >= offset)
    }

    /// Whether the value is provably `<= other + offset`.
    #[must_use]
    pub fn is_less_than_or_equal_to(&self, other: &Value, offset: i32) -> bool {
        let info = other.info();
        if self.is_less_than_or_equal_to_constant(info.constant_bounds().lower_bound(), offset) {
            return true;
        }

        if info.has_int_constant_value() {
            return false;
        }

        self.relative_upper_bounds.get(other.number()).is_some_and(|bound| bound.offset() <= offset)
    }

    /// The fact for `base + n`. The caller computes `new_constant_bounds`, since inside a loop
    /// the base is not precise and only the caller knows how far to widen.
    #[must_use]
    pub fn add(base: &Value, n: i32, base_info_is_precise: bool, new_constant_bounds: IntConstantBounds) -> Self {
        let base_info = base.info();
        let base_bounds = base_info.int_bounds();

        let explicit_upper = base_bounds
            .filter(|bounds| bounds.was_constant_upper_bound_established_explicitly())
            .and_then(|bounds| bounds.constant_upper_bound().checked_add(n))
            .is_some_and(|adjusted| adjusted == new_constant_bounds.upper_bound());

        let mut new_bounds = Self::with_constant_bounds(new_constant_bounds, explicit_upper);

        // Without precise info, the number of similar decrements (or increments) is unknown.
        if n < 0 && !base_info_is_precise {
            debug_assert_eq!(new_bounds.constant_lower_bound, i32::MIN);
        } else if let Some(base_bounds) = base_bounds {
            debug_assert!(!base_bounds.relative_lower_bounds.contains(base.number()));
            new_bounds.relative_lower_bounds = base_bounds.relative_lower_bounds.clone();
            new_bounds.relative_lower_bounds.shift(n);
        }

        if n > 0 && !base_info_is_precise {
            debug_assert_eq!(new_bounds.constant_upper_bound, i32::MAX);
        } else if let Some(base_bounds) = base_bounds {
            debug_assert!(!base_bounds.relative_upper_bounds.contains(base.number()));
            new_bounds.relative_upper_bounds = base_bounds.relative_upper_bounds.clone();
            new_bounds.relative_upper_bounds.shift(n);
        }

        if base_info.has_int_constant_value() {
            return new_bounds;
        }

        // The result is exactly `base + n`.
        let bound = RelativeBound::new(base, n, true);
        if n >= 0 || base_info_is_precise {
            new_bounds.relative_lower_bounds.insert(bound);
        }

        if n <= 0 || base_info_is_precise {
            new_bounds.relative_upper_bounds.insert(bound);
        }

        new_bounds
    }

    /// Some upper bound `value <= b + o` with `o <= -n` proves `value + n` cannot overflow.
    #[must_use]
    pub fn add_cannot_overflow_based_on_relative_bounds(&self, n: i32) -> bool {
        debug_assert_ne!(n, 0);

        if n >= 0 {
            let max_bound_offset = -n;
            return self.relative_upper_bounds.iter().any(|bound| bound.offset() <= max_bound_offset);
        }

        n != i32::MIN && self.sub_cannot_overflow_based_on_relative_bounds(-n)
    }

    /// Some lower bound `value >= b + o` with `o >= n` proves `value - n` cannot overflow.
    #[must_use]
    pub fn sub_cannot_overflow_based_on_relative_bounds(&self, n: i32) -> bool {
        debug_assert_ne!(n, 0);

        if n >= 0 {
            let min_bound_offset = n;
            return self.relative_lower_bounds.iter().any(|bound| bound.offset() >= min_bound_offset);
        }

        n != i32::MIN && self.add_cannot_overflow_based_on_relative_bounds(-n)
    }

    /// Joins the fact of `value0` with a plain range of `value1` at a control-flow merge.
    ///
    /// A value is implicitly bounded by itself, so a bound of `value0` relative to `value1`
    /// survives with an offset of at most zero (lower) or at least zero (upper).
    #[must_use]
    pub fn merge_with_constant_bounds(
        value0: &Value,
        bounds0: &IntBounds,
        value1: &Value,
        constant_bounds1: IntConstantBounds,
    ) -> Option<IntBounds> {
        bounds0.verify();

        let constant_bounds = bounds0.constant_bounds().union(&constant_bounds1);

        let value1_number = value1.number();
        let common_lower_bound = bounds0.relative_lower_bounds.get(value1_number);
        let common_upper_bound = bounds0.relative_upper_bounds.get(value1_number);

        if constant_bounds.is_full() && common_lower_bound.is_none() && common_upper_bound.is_none() {
            return None;
        }

        let mut merged_bounds = Self::with_constant_bounds(constant_bounds, false);

        if value0.number() != value1_number {
            // Also when `value1` is a constant: it stays the base at offset zero and its
            // constant never ends up in an offset.
            let self_bound = RelativeBound::new(value1, 0, true);

            if let Some(common) = common_lower_bound {
                let mut merged = *common;
                merged.merge(BoundDirection::Lower, MergeMode::Conservative, &self_bound);
                merged_bounds.relative_lower_bounds.insert(merged);
            }

            if let Some(common) = common_upper_bound {
                let mut merged = *common;
                merged.merge(BoundDirection::Upper, MergeMode::Conservative, &self_bound);
                merged_bounds.relative_upper_bounds.insert(merged);
            }
        }

        if !merged_bounds.has_bounds() {
            return None;
        }

        merged_bounds.verify();
        Some(merged_bounds)
    }

    /// Joins two facts at a control-flow merge. Only bounds present on both sides survive,
    /// each weakened to hold for both.
    #[must_use]
    pub fn merge(value0: &Value, bounds0: &IntBounds, value1: &Value, bounds1: &IntBounds) -> Option<IntBounds> {
        bounds0.verify();
        bounds1.verify();

        if std::ptr::eq(bounds0, bounds1) || bounds0 == bounds1 {
            return Some(bounds0.clone());
        }

        let mut merged_bounds = Self::with_constant_bounds(
            bounds0.constant_bounds().union(&bounds1.constant_bounds()),
            bounds0.was_constant_upper_bound_established_explicitly && bounds1.was_constant_upper_bound_established_explicitly,
        );

        Self::merge_bound_sets(BoundDirection::Lower, value0, bounds0, value1, bounds1, &mut merged_bounds);
        Self::merge_bound_sets(BoundDirection::Upper, value0, bounds0, value1, bounds1, &mut merged_bounds);

        if !merged_bounds.has_bounds() {
            return None;
        }

        merged_bounds.verify();
        Some(merged_bounds)
    }

    fn merge_bound_sets(
        direction: BoundDirection,
        value0: &Value,
        bounds0: &IntBounds,
        value1: &Value,
        bounds1: &IntBounds,
        merged_bounds: &mut IntBounds,
    ) {
        let bound_set0 = bounds0.relative_bounds(direction);
        let bound_set1 = bounds1.relative_bounds(direction);
        let (merged_set, _) = merged_bounds.relative_bounds_mut(direction);

        let (iterate_over, look_up_in) = if bound_set0.len() <= bound_set1.len() {
            (bound_set0, bound_set1)
        } else {
            (bound_set1, bound_set0)
        };

        for bound in iterate_over.iter() {
            let Some(other) = look_up_in.get(bound.base_value_number()) else { continue };

            let mut merged = *bound;
            merged.merge(direction, MergeMode::Conservative, other);
            merged_set.insert(merged);
        }

        if value0.number() == value1.number() {
            return;
        }

        if let Some(bound) = bound_set0.get(value1.number()) {
            let mut merged = RelativeBound::new(value1, 0, true);
            merged.merge(direction, MergeMode::Conservative, bound);
            merged_set.insert(merged);
        }

        if let Some(bound) = bound_set1.get(value0.number()) {
            let mut merged = RelativeBound::new(value0, 0, true);
            merged.merge(direction, MergeMode::Conservative, bound);
            merged_set.insert(merged);
        }
    }
}

impl Display for IntBounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.constant_bounds())?;

        if self.was_constant_upper_bound_established_explicitly {
            f.write_str(" (expliciet)")?;
        }

        for bound in self.relative_lower_bounds.iter() {
            write!(f, ", >= {bound}")?;
        }

        for bound in self.relative_upper_bounds.iter() {
            write!(f, ", <= {bound}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::analysis::ValueInfo;

    use super::*;
    use rstest::rstest;
    use pretty_assertions::assert_eq;

    fn value(number: u32, info: ValueInfo) -> Value {
        Value::new(ValueNumber::new(number), info)
    }

    fn unknown(number: u32) -> Value {
        value(number, ValueInfo::int_range(i32::MIN, i32::MAX))
    }

    fn range(lower: i32, upper: i32) -> IntBounds {
        IntBounds::with_constant_bounds(IntConstantBounds::new(lower, upper), false)
    }

    #[test]
    fn full_range_without_relations_is_no_fact() {
        assert_eq!(IntBounds::new(IntConstantBounds::FULL, false), None);
        assert!(IntBounds::new(IntConstantBounds::FULL, true).is_some());
        assert!(IntBounds::new(IntConstantBounds::new(0, 10), false).is_some());
    }

    #[rstest]
    #[case(5, 0)]
    #[case(-1, 0)]
    #[case(2, 2)]
    #[case(3, 3)]
    fn lower_bound_only_tightens_inside_the_interval(#[case] bound: i32, #[case] expected: i32) {
        let mut bounds = range(0, 3);
        bounds.set_lower_bound(bound);
        assert_eq!(bounds.constant_bounds(), IntConstantBounds::new(expected, 3));
    }

    #[test]
    fn overflowing_upper_bound_is_ignored_but_explicitness_is_kept_for_plain_bound() {
        let mut bounds = range(0, 100);
        bounds.set_upper_bound_with_offset(i32::MAX, i32::MAX, true);
        assert_eq!(bounds.constant_bounds(), IntConstantBounds::new(0, 100));
        assert!(!bounds.was_constant_upper_bound_established_explicitly());

        bounds.set_upper_bound(50, true);
        assert_eq!(bounds.constant_upper_bound(), 50);
        assert!(bounds.was_constant_upper_bound_established_explicitly());
    }

    #[test]
    fn contradicting_relative_lower_bound_is_rejected() {
        let b = unknown(2);
        let mut bounds = range(i32::MIN, i32::MAX);
        bounds.set_upper_bound_relative(ValueNumber::new(1), &b, 2, true);
        bounds.set_lower_bound_relative(ValueNumber::new(1), &b, 3, true);

        assert!(bounds.relative_lower_bounds().is_empty());
        assert_eq!(bounds.relative_upper_bounds().get(b.number()).map(|b| b.offset()), Some(2));
    }

    #[test]
    fn relative_bounds_on_same_base_merge_aggressively() {
        let b = unknown(2);
        let mut bounds = range(i32::MIN, i32::MAX);
        bounds.set_lower_bound_relative(ValueNumber::new(1), &b, 1, false);
        bounds.set_lower_bound_relative(ValueNumber::new(1), &b, 4, true);

        let bound = bounds.relative_lower_bounds().get(b.number()).copied().unwrap();
        assert_eq!(bound.offset(), 4);
        assert!(bound.was_established_explicitly());
    }

    #[test]
    fn relative_bound_pulls_in_base_bounds() {
        // b >= c + 1, then a >= b + 2 gives a >= c + 3
        let c = unknown(3);
        let mut b_bounds = range(i32::MIN, i32::MAX);
        b_bounds.set_lower_bound_relative(ValueNumber::new(2), &c, 1, true);
        let b = value(2, ValueInfo::int_bounded(&ValueInfo::int_range(0, 50), b_bounds));

        let mut a_bounds = range(i32::MIN, i32::MAX);
        a_bounds.set_lower_bound_relative(ValueNumber::new(1), &b, 2, true);

        assert_eq!(a_bounds.constant_lower_bound(), i32::MIN + 3);
        assert_eq!(a_bounds.relative_lower_bounds().get(c.number()).map(|b| b.offset()), Some(3));
        assert_eq!(a_bounds.relative_lower_bounds().get(b.number()).map(|b| b.offset()), Some(2));
    }

    #[test]
    fn relative_bound_on_constant_only_sets_constant_bound() {
        let five = value(2, ValueInfo::int_constant(5));
        let mut bounds = range(i32::MIN, i32::MAX);
        bounds.set_upper_bound_relative(ValueNumber::new(1), &five, -1, true);

        assert_eq!(bounds.constant_upper_bound(), 4);
        assert!(bounds.was_constant_upper_bound_established_explicitly());
        assert!(bounds.relative_upper_bounds().is_empty());
    }

    #[rstest]
    #[case(0, 1, 10)]
    #[case(10, 0, 9)]
    #[case(5, 0, 10)]
    fn set_is_not_constant(#[case] excluded: i32, #[case] lower: i32, #[case] upper: i32) {
        let mut bounds = range(0, 10);
        let changed = bounds.set_is_not_constant(excluded, false);
        assert_eq!(changed, excluded == 0 || excluded == 10);
        assert_eq!(bounds.constant_bounds(), IntConstantBounds::new(lower, upper));
    }

    #[test]
    fn set_is_not_value_nudges_single_zero_offset_bound() {
        let b = unknown(2);
        let mut bounds = range(i32::MIN, i32::MAX);
        bounds.set_upper_bound_relative(ValueNumber::new(1), &b, 0, false);

        assert!(bounds.set_is_not_value(&b, true));
        let bound = bounds.relative_upper_bounds().get(b.number()).copied().unwrap();
        assert_eq!(bound.offset(), -1);
        assert!(bound.was_established_explicitly());
    }

    #[test]
    fn set_is_not_value_gives_up_when_both_directions_are_zero() {
        let b = unknown(2);
        let mut bounds = range(i32::MIN, i32::MAX);
        bounds.set_upper_bound_relative(ValueNumber::new(1), &b, 0, false);
        bounds.set_lower_bound_relative(ValueNumber::new(1), &b, 0, false);

        let before = bounds.clone();
        assert!(!bounds.set_is_not_value(&b, false));
        assert_eq!(bounds, before);
    }

    #[rstest]
    #[case(10, 5, 0, true)]
    #[case(5, 5, 1, false)]
    #[case(6, 5, 1, true)]
    #[case(0, i32::MAX, 1, false)]
    #[case(i32::MIN, i32::MIN, -5, true)]
    #[case(0, i32::MAX, 5, false)]
    #[case(i32::MAX, i32::MAX, 5, false)]
    #[case(3, 0, 3, true)]
    #[case(2, 0, 3, false)]
    fn constant_greater_than_or_equal(#[case] value: i32, #[case] base: i32, #[case] offset: i32, #[case] expected: bool) {
        assert_eq!(IntBounds::is_constant_greater_than_or_equal_to(value, base, offset), expected);
    }

    #[rstest]
    #[case(4, 5, 0, true)]
    #[case(5, 5, -1, false)]
    #[case(4, 5, -1, true)]
    #[case(i32::MAX, i32::MAX, 5, true)]
    #[case(0, i32::MIN, -5, false)]
    #[case(7, 10, -3, true)]
    #[case(8, 10, -3, false)]
    fn constant_less_than_or_equal(#[case] value: i32, #[case] base: i32, #[case] offset: i32, #[case] expected: bool) {
        assert_eq!(IntBounds::is_constant_less_than_or_equal_to(value, base, offset), expected);
    }

    #[test]
    fn add_shifts_relative_bounds_and_records_base() {
        let n = unknown(3);
        let mut base_bounds = range(0, 99);
        base_bounds.set_upper_bound_relative(ValueNumber::new(2), &n, -1, true);
        let base = value(2, ValueInfo::int_bounded(&ValueInfo::int_range(0, 99), base_bounds));

        let result = IntBounds::add(&base, 1, true, IntConstantBounds::new(1, 100));

        assert_eq!(result.constant_bounds(), IntConstantBounds::new(1, 100));
        assert_eq!(result.relative_upper_bounds().get(n.number()).map(|b| b.offset()), Some(0));
        assert_eq!(result.relative_lower_bounds().get(base.number()).map(|b| b.offset()), Some(1));
        assert_eq!(result.relative_upper_bounds().get(base.number()).map(|b| b.offset()), Some(1));
    }

    #[test]
    fn imprecise_increment_drops_upper_relations() {
        let n = unknown(3);
        let mut base_bounds = range(0, i32::MAX);
        base_bounds.set_upper_bound_relative(ValueNumber::new(2), &n, -1, true);
        let base = value(2, ValueInfo::int_bounded(&ValueInfo::int_range(0, i32::MAX), base_bounds));

        let result = IntBounds::add(&base, 1, false, IntConstantBounds::new(1, i32::MAX));

        assert!(result.relative_upper_bounds().is_empty());
        assert_eq!(result.relative_lower_bounds().get(base.number()).map(|b| b.offset()), Some(1));
    }

    #[test]
    fn add_drops_overflowing_relative_bounds() {
        let n = unknown(3);
        let mut base_bounds = range(0, 10);
        base_bounds.set_lower_bound_relative(ValueNumber::new(2), &n, i32::MAX, false);
        let base = value(2, ValueInfo::int_bounded(&ValueInfo::int_range(0, 10), base_bounds));

        let result = IntBounds::add(&base, 1, true, IntConstantBounds::new(1, 11));
        assert!(!result.relative_lower_bounds().contains(n.number()));
    }

    #[test]
    fn explicit_upper_bound_survives_matching_add() {
        let mut base_bounds = range(0, 10);
        base_bounds.set_upper_bound(10, true);
        let base = value(2, ValueInfo::int_bounded(&ValueInfo::int_range(0, 10), base_bounds));

        assert!(IntBounds::add(&base, 2, true, IntConstantBounds::new(2, 12)).was_constant_upper_bound_established_explicitly());
        assert!(!IntBounds::add(&base, 2, true, IntConstantBounds::new(2, 13)).was_constant_upper_bound_established_explicitly());
    }

    #[rstest]
    #[case(1, -1, true)]
    #[case(1, 0, false)]
    #[case(5, -5, true)]
    #[case(5, -4, false)]
    fn add_cannot_overflow(#[case] n: i32, #[case] upper_offset: i32, #[case] expected: bool) {
        let b = unknown(2);
        let mut bounds = range(i32::MIN, i32::MAX);
        bounds.set_upper_bound_relative(ValueNumber::new(1), &b, upper_offset, true);
        assert_eq!(bounds.add_cannot_overflow_based_on_relative_bounds(n), expected);
        assert_eq!(bounds.sub_cannot_overflow_based_on_relative_bounds(-n), expected);
    }

    #[test]
    fn sub_min_never_proven() {
        let b = unknown(2);
        let mut bounds = range(i32::MIN, i32::MAX);
        bounds.set_lower_bound_relative(ValueNumber::new(1), &b, i32::MAX, true);
        assert!(!bounds.add_cannot_overflow_based_on_relative_bounds(i32::MIN));
    }

    #[test]
    fn merge_is_the_hull() {
        let a = value(1, ValueInfo::int_range(0, 10));
        let b = value(2, ValueInfo::int_range(5, 20));

        let mut b0 = range(0, 10);
        b0.set_upper_bound(10, true);
        let b1 = range(5, 20);

        let merged = IntBounds::merge(&a, &b0, &b, &b1).unwrap();
        assert_eq!(merged.constant_bounds(), IntConstantBounds::new(0, 20));
        assert!(!merged.was_constant_upper_bound_established_explicitly());
    }

    #[test]
    fn merge_without_information_is_none() {
        let a = value(1, ValueInfo::likely_int());
        let b = value(2, ValueInfo::likely_int());
        let mut b0 = range(0, i32::MAX);
        b0.set_upper_bound(i32::MAX - 1, false);
        let b1 = range(i32::MIN, 0);

        assert_eq!(IntBounds::merge(&a, &b0, &b, &b1), None);
    }

    #[test]
    fn merge_keeps_common_relative_bounds_conservatively() {
        let n = unknown(9);
        let a = value(1, ValueInfo::likely_int());
        let b = value(2, ValueInfo::likely_int());

        let mut b0 = range(i32::MIN, i32::MAX);
        b0.set_upper_bound_relative(a.number(), &n, -1, true);
        let mut b1 = range(i32::MIN, i32::MAX);
        b1.set_upper_bound_relative(b.number(), &n, -3, false);

        let merged = IntBounds::merge(&a, &b0, &b, &b1).unwrap();
        let bound = merged.relative_upper_bounds().get(n.number()).copied().unwrap();
        assert_eq!(bound.offset(), -1);
        assert!(!bound.was_established_explicitly());
    }

    #[test]
    fn merge_preserves_bound_on_the_other_value() {
        // On one path a <= b - 1, on the other the merged value is b itself.
        let a = value(1, ValueInfo::likely_int());
        let b = value(2, ValueInfo::likely_int());

        let mut b0 = range(i32::MIN, i32::MAX);
        b0.set_upper_bound_relative(a.number(), &b, -1, true);
        let b1 = range(0, 5);

        let merged = IntBounds::merge(&a, &b0, &b, &b1).unwrap();
        assert_eq!(merged.relative_upper_bounds().get(b.number()).map(|b| b.offset()), Some(0));

        let merged = IntBounds::merge_with_constant_bounds(&a, &b0, &b, IntConstantBounds::new(0, 5)).unwrap();
        assert_eq!(merged.relative_upper_bounds().get(b.number()).map(|b| b.offset()), Some(0));
    }

    #[test]
    fn merge_with_full_constant_range_and_no_relation_is_none() {
        let a = value(1, ValueInfo::likely_int());
        let b = value(2, ValueInfo::likely_int());
        let b0 = range(0, 10);

        assert_eq!(IntBounds::merge_with_constant_bounds(&a, &b0, &b, IntConstantBounds::FULL), None);
        assert_eq!(
            IntBounds::merge_with_constant_bounds(&a, &b0, &b, IntConstantBounds::new(5, 20)).map(|b| b.constant_bounds()),
            Some(IntConstantBounds::new(0, 20)),
        );
    }

    #[test]
    fn merge_against_a_constant_keeps_it_as_the_base() {
        let a = value(1, ValueInfo::likely_int());
        let n = unknown(2);
        let five = value(2, ValueInfo::int_constant(5));

        let mut b0 = range(0, 9);
        b0.set_upper_bound_relative(a.number(), &n, -1, true);

        let merged = IntBounds::merge_with_constant_bounds(&a, &b0, &five, five.info().constant_bounds()).unwrap();
        assert_eq!(merged.constant_bounds(), IntConstantBounds::new(0, 9));

        let upper = merged.relative_upper_bounds().get(five.number()).unwrap();
        assert_eq!(upper.base_value_number(), five.number());
        assert_eq!(upper.offset(), 0);
        assert!(merged.relative_lower_bounds().is_empty());
    }

    #[test]
    fn comparisons_against_values() {
        let n = unknown(3);
        let ten = value(4, ValueInfo::int_constant(10));

        let mut bounds = range(0, 9);
        bounds.set_upper_bound_relative(ValueNumber::new(1), &n, -1, true);

        assert!(bounds.is_less_than_or_equal_to(&n, -1));
        assert!(bounds.is_less_than_or_equal_to(&n, 0));
        assert!(!bounds.is_less_than_or_equal_to(&n, -2));
        assert!(bounds.is_less_than_or_equal_to(&ten, -1));
        assert!(!bounds.is_greater_than_or_equal_to(&ten, 0));
        assert!(!bounds.is_greater_than_or_equal_to(&n, 0));
    }
}
