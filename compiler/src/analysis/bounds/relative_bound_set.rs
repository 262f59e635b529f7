// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::collections::BTreeMap;

use crate::analysis::ValueNumber;

use super::RelativeBound;

/// At most one bound per base value number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelativeBoundSet {
    bounds: BTreeMap<ValueNumber, RelativeBound>,
}

impl RelativeBoundSet {
    #[must_use]
    pub fn get(&self, base: ValueNumber) -> Option<&RelativeBound> {
        self.bounds.get(&base)
    }

    #[must_use]
    pub fn get_mut(&mut self, base: ValueNumber) -> Option<&mut RelativeBound> {
        self.bounds.get_mut(&base)
    }

    #[must_use]
    pub fn contains(&self, base: ValueNumber) -> bool {
        self.bounds.contains_key(&base)
    }

    /// Adds a bound on a base that has none yet.
    pub fn insert(&mut self, bound: RelativeBound) {
        let previous = self.bounds.insert(bound.base_value_number(), bound);
        debug_assert!(previous.is_none(), "Dubbele relatieve grens op {}", bound.base_value_number());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RelativeBound> {
        self.bounds.values()
    }

    /// Shifts every offset by `n`, dropping the bounds that overflow.
    pub fn shift(&mut self, n: i32) {
        if n != 0 {
            self.bounds.retain(|_, bound| bound.add(n));
        }
    }
}
