// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::fmt::Display;

/// A closed interval `[lower_bound, upper_bound]` of int32 values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntConstantBounds {
    lower_bound: i32,
    upper_bound: i32,
}

impl IntConstantBounds {
    pub const FULL: Self = Self {
        lower_bound: i32::MIN,
        upper_bound: i32::MAX,
    };

    #[must_use]
    pub const fn new(lower_bound: i32, upper_bound: i32) -> Self {
        debug_assert!(lower_bound <= upper_bound);
        Self { lower_bound, upper_bound }
    }

    #[must_use]
    pub const fn try_new(lower_bound: i32, upper_bound: i32) -> Option<Self> {
        if lower_bound <= upper_bound {
            Some(Self { lower_bound, upper_bound })
        } else {
            None
        }
    }

    #[must_use]
    pub const fn constant(value: i32) -> Self {
        Self::new(value, value)
    }

    #[must_use]
    pub const fn lower_bound(&self) -> i32 {
        self.lower_bound
    }

    #[must_use]
    pub const fn upper_bound(&self) -> i32 {
        self.upper_bound
    }

    #[must_use]
    pub const fn is_constant(&self) -> bool {
        self.lower_bound == self.upper_bound
    }

    #[must_use]
    pub const fn constant_value(&self) -> Option<i32> {
        if self.is_constant() {
            Some(self.lower_bound)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.lower_bound == i32::MIN && self.upper_bound == i32::MAX
    }

    #[must_use]
    pub const fn contains(&self, value: i32) -> bool {
        self.lower_bound <= value && value <= self.upper_bound
    }

    /// The smallest interval that contains both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self::new(self.lower_bound.min(other.lower_bound), self.upper_bound.max(other.upper_bound))
    }

    #[must_use]
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        Self::try_new(self.lower_bound.max(other.lower_bound), self.upper_bound.min(other.upper_bound))
    }

    /// Shifts both ends by `n`, or `None` when either end overflows.
    #[must_use]
    pub fn add(&self, n: i32) -> Option<Self> {
        Some(Self::new(self.lower_bound.checked_add(n)?, self.upper_bound.checked_add(n)?))
    }
}

impl Default for IntConstantBounds {
    fn default() -> Self {
        Self::FULL
    }
}

impl Display for IntConstantBounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.lower_bound, self.upper_bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use pretty_assertions::assert_eq;

    #[test]
    fn union_is_the_hull() {
        let a = IntConstantBounds::new(0, 10);
        let b = IntConstantBounds::new(5, 20);
        assert_eq!(a.union(&b), IntConstantBounds::new(0, 20));
        assert_eq!(a.intersect(&b), Some(IntConstantBounds::new(5, 10)));
    }

    #[rstest]
    #[case(IntConstantBounds::new(0, 10), 5, Some(IntConstantBounds::new(5, 15)))]
    #[case(IntConstantBounds::new(0, i32::MAX), 1, None)]
    #[case(IntConstantBounds::new(i32::MIN, 0), -1, None)]
    fn add_checks_overflow(#[case] bounds: IntConstantBounds, #[case] n: i32, #[case] expected: Option<IntConstantBounds>) {
        assert_eq!(bounds.add(n), expected);
    }

    #[test]
    fn disjoint_intervals_do_not_intersect() {
        assert_eq!(IntConstantBounds::new(0, 1).intersect(&IntConstantBounds::new(2, 3)), None);
    }
}
