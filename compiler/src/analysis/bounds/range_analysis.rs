// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use log::trace;

use crate::{
    analysis::{Value, ValueInfo, ValueNumber, ValueTable, ValueType},
    config::ConfigSectionBounds,
    JumpCondition,
};

use super::{IntBounds, IntConstantBounds};

/// The other side of a comparison.
#[derive(Debug, Clone, Copy)]
pub enum Bound<'v> {
    Value(&'v Value),
    Constant(i32),
}

impl Bound<'_> {
    #[must_use]
    fn constant_bounds(&self) -> IntConstantBounds {
        match self {
            Self::Value(value) => value.info().constant_bounds(),
            Self::Constant(constant) => IntConstantBounds::constant(*constant),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathDependentRelationship {
    Equal,
    NotEqual,
    GreaterThanOrEqual,
    GreaterThan,
    LessThanOrEqual,
    LessThan,
}

impl PathDependentRelationship {
    #[must_use]
    pub const fn negate(&self) -> Self {
        match self {
            Self::Equal => Self::NotEqual,
            Self::NotEqual => Self::Equal,
            Self::GreaterThanOrEqual => Self::LessThan,
            Self::GreaterThan => Self::LessThanOrEqual,
            Self::LessThanOrEqual => Self::GreaterThan,
            Self::LessThan => Self::GreaterThanOrEqual,
        }
    }
}

impl From<JumpCondition> for PathDependentRelationship {
    fn from(value: JumpCondition) -> Self {
        match value {
            JumpCondition::Equal => Self::Equal,
            JumpCondition::NotEqual => Self::NotEqual,
            JumpCondition::Greater => Self::GreaterThan,
            JumpCondition::GreaterOrEqual => Self::GreaterThanOrEqual,
            JumpCondition::Less => Self::LessThan,
            JumpCondition::LessOrEqual => Self::LessThanOrEqual,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathOperand {
    Value(ValueNumber),
    Constant(i32),
}

/// `left <relationship> right`, known to hold along one edge of a conditional branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathDependentInfo {
    pub relationship: PathDependentRelationship,
    pub left: ValueNumber,
    pub right: PathOperand,
}

/// Derives and combines range facts for the values of a function.
#[derive(Debug, Clone, Default)]
pub struct RangeAnalysis {
    config: ConfigSectionBounds,
}

impl RangeAnalysis {
    #[must_use]
    pub const fn new(config: ConfigSectionBounds) -> Self {
        Self { config }
    }

    /// The fact to refine, or `None` when a plain range is enough to represent the result.
    fn bounds_to_update(
        &self,
        info: &ValueInfo,
        constant_bounds: IntConstantBounds,
        is_setting_new_bound: bool,
        is_bound_constant: bool,
        is_setting_upper_bound: bool,
        is_explicit: bool,
    ) -> Option<IntBounds> {
        if !self.config.track_relative_bounds {
            return None;
        }

        if let Some(bounds) = info.int_bounds() {
            if bounds.requires_int_bounded_value_info_for(info.value_type()) {
                return Some(bounds.clone());
            }
        }

        if !info.is_int() || constant_bounds.is_constant() {
            return None;
        }

        if is_bound_constant {
            // Only an explicit constant upper bound is worth more than a plain range.
            if !(is_setting_upper_bound && is_explicit) {
                return None;
            }
        } else if !is_setting_new_bound {
            return None;
        }

        Some(IntBounds::with_constant_bounds(constant_bounds, false))
    }

    fn bounded_info(info: &ValueInfo, bounds: IntBounds) -> Option<ValueInfo> {
        bounds
            .requires_int_bounded_value_info_for(info.value_type())
            .then(|| ValueInfo::int_bounded(info, bounds))
    }

    /// The info of `value` given `value == bound`.
    #[must_use]
    pub fn update_for_equal(&self, value: &Value, bound: Bound<'_>, is_explicit: bool) -> Option<ValueInfo> {
        let info = value.info();
        let constant_bounds = info.constant_bounds();
        let bound_constant_bounds = bound.constant_bounds();

        if let Some(mut bounds) = self.bounds_to_update(info, constant_bounds, true, bound_constant_bounds.is_constant(), true, is_explicit) {
            match bound {
                Bound::Value(bound_value) => {
                    bounds.set_lower_bound_relative(value.number(), bound_value, 0, is_explicit);
                    bounds.set_upper_bound_relative(value.number(), bound_value, 0, is_explicit);
                }
                Bound::Constant(constant) => {
                    bounds.set_lower_bound(constant);
                    bounds.set_upper_bound(constant, is_explicit);
                }
            }

            if let Some(updated) = Self::bounded_info(info, bounds) {
                return Some(updated);
            }
        }

        if !info.is_int() {
            return None;
        }

        constant_bounds
            .intersect(&bound_constant_bounds)
            .map(|range| ValueInfo::int_range_like(info, range.lower_bound(), range.upper_bound()))
    }

    /// The info of `value` given `value != bound`.
    #[must_use]
    pub fn update_for_not_equal(&self, value: &Value, bound: Bound<'_>, is_explicit: bool) -> Option<ValueInfo> {
        let info = value.info();
        let constant_bounds = info.constant_bounds();
        let bound_constant_bounds = bound.constant_bounds();
        let is_bound_constant = bound_constant_bounds.is_constant();

        let bounds = self.bounds_to_update(
            info,
            constant_bounds,
            false,
            is_bound_constant,
            is_bound_constant && bound_constant_bounds.lower_bound() == constant_bounds.upper_bound(),
            is_explicit,
        );

        if let Some(mut bounds) = bounds {
            let changed = match bound {
                Bound::Value(bound_value) => bounds.set_is_not_value(bound_value, is_explicit),
                Bound::Constant(constant) => bounds.set_is_not_constant(constant, is_explicit),
            };

            if !changed {
                return None;
            }

            if let Some(updated) = Self::bounded_info(info, bounds) {
                return Some(updated);
            }
        }

        if !info.is_int() || !is_bound_constant {
            return None;
        }

        let constant = bound_constant_bounds.lower_bound();
        let (lower, upper) = (constant_bounds.lower_bound(), constant_bounds.upper_bound());
        if lower == upper {
            return None;
        }

        if constant == lower {
            Some(ValueInfo::int_range_like(info, lower + 1, upper))
        } else if constant == upper {
            Some(ValueInfo::int_range_like(info, lower, upper - 1))
        } else {
            None
        }
    }

    /// The info of `value` given `value >= bound + offset`.
    #[must_use]
    pub fn update_for_greater_than_or_equal(&self, value: &Value, bound: Bound<'_>, offset: i32, is_explicit: bool) -> Option<ValueInfo> {
        let info = value.info();
        let constant_bounds = info.constant_bounds();
        let bound_constant_bounds = bound.constant_bounds();

        if let Some(mut bounds) = self.bounds_to_update(info, constant_bounds, true, bound_constant_bounds.is_constant(), false, is_explicit) {
            match bound {
                Bound::Value(bound_value) => bounds.set_lower_bound_relative(value.number(), bound_value, offset, is_explicit),
                Bound::Constant(constant) => bounds.set_lower_bound_with_offset(constant, offset),
            }

            if let Some(updated) = Self::bounded_info(info, bounds) {
                return Some(updated);
            }
        }

        if !info.is_int() {
            return None;
        }

        let adjusted_bound_min = bound_constant_bounds.lower_bound().checked_add(offset)?;
        let new_min = constant_bounds.lower_bound().max(adjusted_bound_min);
        (new_min <= constant_bounds.upper_bound())
            .then(|| ValueInfo::int_range_like(info, new_min, constant_bounds.upper_bound()))
    }

    #[must_use]
    pub fn update_for_greater_than(&self, value: &Value, bound: Bound<'_>, is_explicit: bool) -> Option<ValueInfo> {
        self.update_for_greater_than_or_equal(value, bound, 1, is_explicit)
    }

    /// The info of `value` given `value <= bound + offset`.
    #[must_use]
    pub fn update_for_less_than_or_equal(&self, value: &Value, bound: Bound<'_>, offset: i32, is_explicit: bool) -> Option<ValueInfo> {
        let info = value.info();
        let constant_bounds = info.constant_bounds();
        let bound_constant_bounds = bound.constant_bounds();

        if let Some(mut bounds) = self.bounds_to_update(info, constant_bounds, true, bound_constant_bounds.is_constant(), true, is_explicit) {
            match bound {
                Bound::Value(bound_value) => bounds.set_upper_bound_relative(value.number(), bound_value, offset, is_explicit),
                Bound::Constant(constant) => bounds.set_upper_bound_with_offset(constant, offset, is_explicit),
            }

            if let Some(updated) = Self::bounded_info(info, bounds) {
                return Some(updated);
            }
        }

        if !info.is_int() {
            return None;
        }

        let adjusted_bound_max = bound_constant_bounds.upper_bound().checked_add(offset)?;
        let new_max = constant_bounds.upper_bound().min(adjusted_bound_max);
        (new_max >= constant_bounds.lower_bound())
            .then(|| ValueInfo::int_range_like(info, constant_bounds.lower_bound(), new_max))
    }

    #[must_use]
    pub fn update_for_less_than(&self, value: &Value, bound: Bound<'_>, is_explicit: bool) -> Option<ValueInfo> {
        self.update_for_less_than_or_equal(value, bound, -1, is_explicit)
    }

    /// The facts along the taken and the fall-through edge of `left <condition> right`, or
    /// `None` when nothing can be learned.
    #[must_use]
    pub fn branch_facts(&self, condition: JumpCondition, left: ValueNumber, right: PathOperand) -> Option<(PathDependentInfo, PathDependentInfo)> {
        if !self.config.path_dependent_values || right == PathOperand::Value(left) {
            return None;
        }

        let relationship = PathDependentRelationship::from(condition);
        let taken = PathDependentInfo { relationship, left, right };
        let not_taken = PathDependentInfo { relationship: relationship.negate(), left, right };
        Some((taken, not_taken))
    }

    /// Refines both operands of `info` in the table. Call this with the table of the edge
    /// the fact holds on.
    pub fn apply_path_dependent_info(&self, table: &mut ValueTable, info: &PathDependentInfo) {
        if !self.config.path_dependent_values || info.right == PathOperand::Value(info.left) {
            return;
        }

        let (left_info, right_info) = {
            let left = table.get(info.left);
            let (right, right_bound) = match info.right {
                PathOperand::Value(number) => {
                    let right = table.get(number);
                    (Some(right), Bound::Value(right))
                }
                PathOperand::Constant(constant) => (None, Bound::Constant(constant)),
            };

            let left_info = match info.relationship {
                PathDependentRelationship::Equal => self.update_for_equal(left, right_bound, true),
                PathDependentRelationship::NotEqual => self.update_for_not_equal(left, right_bound, true),
                PathDependentRelationship::GreaterThanOrEqual => self.update_for_greater_than_or_equal(left, right_bound, 0, true),
                PathDependentRelationship::GreaterThan => self.update_for_greater_than(left, right_bound, true),
                PathDependentRelationship::LessThanOrEqual => self.update_for_less_than_or_equal(left, right_bound, 0, true),
                PathDependentRelationship::LessThan => self.update_for_less_than(left, right_bound, true),
            };

            // The mirrored fact: `left >= right` is `right <= left`, and so on.
            let right_info = right.and_then(|right| {
                let left_bound = Bound::Value(left);
                match info.relationship {
                    PathDependentRelationship::Equal => self.update_for_equal(right, left_bound, true),
                    PathDependentRelationship::NotEqual => self.update_for_not_equal(right, left_bound, true),
                    PathDependentRelationship::GreaterThanOrEqual => self.update_for_less_than_or_equal(right, left_bound, 0, true),
                    PathDependentRelationship::GreaterThan => self.update_for_less_than(right, left_bound, true),
                    PathDependentRelationship::LessThanOrEqual => self.update_for_greater_than_or_equal(right, left_bound, 0, true),
                    PathDependentRelationship::LessThan => self.update_for_greater_than(right, left_bound, true),
                }
            });

            (left_info, right_info)
        };

        if let Some(left_info) = left_info {
            trace!("Padafhankelijk: {} wordt {left_info:?}", info.left);
            table.set_info(info.left, left_info);
        }

        if let (Some(right_info), PathOperand::Value(right)) = (right_info, info.right) {
            trace!("Padafhankelijk: {right} wordt {right_info:?}");
            table.set_info(right, right_info);
        }
    }

    /// The info of a value at a control-flow merge, where `value0` flows in from one
    /// predecessor and `value1` from the other.
    #[must_use]
    pub fn merge_values(&self, value0: &Value, value1: &Value) -> ValueInfo {
        let info0 = value0.info();
        let info1 = value1.info();
        let value_type = info0.value_type().merge(info1.value_type());

        let merged_bounds = match (info0.int_bounds(), info1.int_bounds()) {
            (Some(bounds0), Some(bounds1)) => IntBounds::merge(value0, bounds0, value1, bounds1),
            (Some(bounds0), None) => IntBounds::merge_with_constant_bounds(value0, bounds0, value1, info1.constant_bounds()),
            (None, Some(bounds1)) => IntBounds::merge_with_constant_bounds(value1, bounds1, value0, info0.constant_bounds()),
            (None, None) => None,
        };

        let constant_bounds = info0.constant_bounds().union(&info1.constant_bounds());
        let template = match value_type {
            ValueType::Int => ValueInfo::int_range(constant_bounds.lower_bound(), constant_bounds.upper_bound()),
            ValueType::LikelyInt => ValueInfo::likely_int(),
        };

        let template = match info0.symbol_store() {
            Some(register) if info0.symbol_store() == info1.symbol_store() => template.with_symbol_store(register),
            _ => template,
        };

        match merged_bounds {
            Some(bounds) if bounds.requires_int_bounded_value_info_for(value_type) => ValueInfo::int_bounded(&template, bounds),
            _ => template,
        }
    }

    /// The info of `base + n`. Without precise info on the base (e.g. in a loop prepass),
    /// the bound in the direction of `n` is given up.
    #[must_use]
    pub fn add_constant(&self, table: &ValueTable, base: ValueNumber, n: i32, base_info_is_precise: bool) -> ValueInfo {
        let base = table.get(base);
        let base_info = base.info();

        let constant_bounds = base_info.constant_bounds().add(n).unwrap_or(IntConstantBounds::FULL);
        let mut lower = constant_bounds.lower_bound();
        let mut upper = constant_bounds.upper_bound();
        if n < 0 && !base_info_is_precise {
            lower = i32::MIN;
        }
        if n > 0 && !base_info_is_precise {
            upper = i32::MAX;
        }

        let template = ValueInfo::int_range(lower, upper).with_type(base_info.value_type());
        if n == 0 || !self.config.track_relative_bounds || base_info.has_int_constant_value() {
            return template;
        }

        let bounds = IntBounds::add(base, n, base_info_is_precise, IntConstantBounds::new(lower, upper));
        if bounds.requires_int_bounded_value_info_for(base_info.value_type()) {
            ValueInfo::int_bounded(&template, bounds)
        } else {
            template
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn analysis() -> RangeAnalysis {
        RangeAnalysis::default()
    }

    fn value(number: u32, info: ValueInfo) -> Value {
        Value::new(ValueNumber::new(number), info)
    }

    #[test]
    fn equal_to_constant_without_explicitness_is_a_constant() {
        let a = value(0, ValueInfo::int_range(0, 10));
        let info = analysis().update_for_equal(&a, Bound::Constant(5), false).unwrap();
        assert_eq!(info.int_constant_value(), Some(5));
        assert_eq!(info.int_bounds(), None);
    }

    #[test]
    fn explicit_upper_bound_is_tracked() {
        let a = value(0, ValueInfo::int_range(0, 100));
        let info = analysis().update_for_less_than(&a, Bound::Constant(10), true).unwrap();
        let bounds = info.int_bounds().unwrap();
        assert_eq!(bounds.constant_bounds(), IntConstantBounds::new(0, 9));
        assert!(bounds.was_constant_upper_bound_established_explicitly());
    }

    #[rstest]
    #[case(0, Some((1, 10)))]
    #[case(10, Some((0, 9)))]
    #[case(5, None)]
    fn not_equal_to_constant_narrows_the_ends(#[case] constant: i32, #[case] expected: Option<(i32, i32)>) {
        let a = value(0, ValueInfo::int_range(0, 10));
        let info = analysis().update_for_not_equal(&a, Bound::Constant(constant), false);
        assert_eq!(info.map(|info| (info.constant_bounds().lower_bound(), info.constant_bounds().upper_bound())), expected);
    }

    #[test]
    fn greater_than_value_records_relative_bound() {
        let a = value(0, ValueInfo::int_range(0, 100));
        let b = value(1, ValueInfo::int_range(5, 50));

        let info = analysis().update_for_greater_than(&a, Bound::Value(&b), true).unwrap();
        let bounds = info.int_bounds().unwrap();
        assert_eq!(bounds.constant_lower_bound(), 6);
        assert_eq!(bounds.relative_lower_bounds().get(b.number()).map(|bound| bound.offset()), Some(1));
    }

    #[test]
    fn without_relative_tracking_only_ranges_remain() {
        let analysis = RangeAnalysis::new(ConfigSectionBounds { track_relative_bounds: false, path_dependent_values: true });
        let a = value(0, ValueInfo::int_range(0, 100));
        let b = value(1, ValueInfo::int_range(5, 50));

        let info = analysis.update_for_greater_than(&a, Bound::Value(&b), true).unwrap();
        assert_eq!(info.int_bounds(), None);
        assert_eq!(info.constant_bounds(), IntConstantBounds::new(6, 100));
    }

    #[test]
    fn overflowing_offset_yields_nothing() {
        let analysis = RangeAnalysis::new(ConfigSectionBounds { track_relative_bounds: false, path_dependent_values: true });
        let a = value(0, ValueInfo::int_range(0, 100));
        assert_eq!(analysis.update_for_greater_than(&a, Bound::Constant(i32::MAX), true), None);
    }

    #[rstest]
    #[case(JumpCondition::Less, PathDependentRelationship::LessThan, PathDependentRelationship::GreaterThanOrEqual)]
    #[case(JumpCondition::Equal, PathDependentRelationship::Equal, PathDependentRelationship::NotEqual)]
    #[case(JumpCondition::Greater, PathDependentRelationship::GreaterThan, PathDependentRelationship::LessThanOrEqual)]
    fn branch_facts_negate_on_fall_through(
        #[case] condition: JumpCondition,
        #[case] taken: PathDependentRelationship,
        #[case] not_taken: PathDependentRelationship,
    ) {
        let (t, n) = analysis().branch_facts(condition, ValueNumber::new(0), PathOperand::Constant(3)).unwrap();
        assert_eq!(t.relationship, taken);
        assert_eq!(n.relationship, not_taken);
    }

    #[test]
    fn branch_on_the_same_value_has_no_facts() {
        let v = ValueNumber::new(4);
        assert_eq!(analysis().branch_facts(JumpCondition::Less, v, PathOperand::Value(v)), None);

        let disabled = RangeAnalysis::new(ConfigSectionBounds { track_relative_bounds: true, path_dependent_values: false });
        assert_eq!(disabled.branch_facts(JumpCondition::Less, v, PathOperand::Constant(1)), None);
    }

    #[test]
    fn applying_a_fact_updates_both_sides() {
        let mut table = ValueTable::default();
        let i = table.new_value(ValueInfo::int_range(0, 1000));
        let n = table.new_value(ValueInfo::int_range(0, 1000));

        let analysis = analysis();
        let (taken, _) = analysis.branch_facts(JumpCondition::Less, i, PathOperand::Value(n)).unwrap();
        analysis.apply_path_dependent_info(&mut table, &taken);

        let i_bounds = table.get(i).info().int_bounds().unwrap();
        assert_eq!(i_bounds.relative_upper_bounds().get(n).map(|bound| bound.offset()), Some(-1));
        assert_eq!(i_bounds.constant_upper_bound(), 999);

        let n_bounds = table.get(n).info().int_bounds().unwrap();
        assert_eq!(n_bounds.relative_lower_bounds().get(i).map(|bound| bound.offset()), Some(1));
        assert_eq!(n_bounds.constant_lower_bound(), 1);
    }

    #[test]
    fn merge_of_plain_ranges_is_the_hull() {
        let a = value(0, ValueInfo::int_range(0, 10));
        let b = value(1, ValueInfo::int_range(5, 20));
        let merged = analysis().merge_values(&a, &b);
        assert_eq!(merged.constant_bounds(), IntConstantBounds::new(0, 20));
        assert_eq!(merged.int_bounds(), None);
    }

    #[test]
    fn merge_with_likely_int_loses_the_range() {
        let a = value(0, ValueInfo::int_range(0, 10));
        let b = value(1, ValueInfo::likely_int());
        let merged = analysis().merge_values(&a, &b);
        assert_eq!(merged.value_type(), ValueType::LikelyInt);
        assert_eq!(merged.constant_bounds(), IntConstantBounds::FULL);
    }

    #[test]
    fn add_constant_tracks_the_base() {
        let mut table = ValueTable::default();
        let i = table.new_value(ValueInfo::int_range(0, 99));

        let info = analysis().add_constant(&table, i, 1, true);
        assert_eq!(info.constant_bounds(), IntConstantBounds::new(1, 100));
        let bounds = info.int_bounds().unwrap();
        assert_eq!(bounds.relative_lower_bounds().get(i).map(|bound| bound.offset()), Some(1));
        assert_eq!(bounds.relative_upper_bounds().get(i).map(|bound| bound.offset()), Some(1));
    }

    #[test]
    fn imprecise_increment_gives_up_the_upper_bound() {
        let mut table = ValueTable::default();
        let i = table.new_value(ValueInfo::int_range(0, 99));

        let info = analysis().add_constant(&table, i, 1, false);
        assert_eq!(info.constant_bounds(), IntConstantBounds::new(1, i32::MAX));
        let bounds = info.int_bounds().unwrap();
        assert!(bounds.relative_upper_bounds().is_empty());
    }

    #[test]
    fn adding_to_a_constant_is_a_constant() {
        let mut table = ValueTable::default();
        let c = table.new_value(ValueInfo::int_constant(41));
        assert_eq!(analysis().add_constant(&table, c, 1, true).int_constant_value(), Some(42));
    }
}
