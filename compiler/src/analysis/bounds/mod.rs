// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

mod bound_check;
mod int_bounds;
mod int_constant_bounds;
mod range_analysis;
mod relative_bound;
mod relative_bound_set;

pub use self::{
    bound_check::{
        IntBoundCheck,
        IntBoundCheckCompatibilityId,
    },
    int_bounds::IntBounds,
    int_constant_bounds::IntConstantBounds,
    range_analysis::{
        Bound,
        PathDependentInfo,
        PathDependentRelationship,
        PathOperand,
        RangeAnalysis,
    },
    relative_bound::{
        BoundDirection,
        MergeMode,
        RelativeBound,
    },
    relative_bound_set::RelativeBoundSet,
};
