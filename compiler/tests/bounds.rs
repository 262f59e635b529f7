// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use pretty_assertions::assert_eq;
use rstest::rstest;

use stroom_compiler::{
    BailOutKind,
    ConfigSectionBounds,
    FunctionBuilder,
    Immediate,
    InstructionKind,
    IntBoundCheck,
    IntConstantBounds,
    JumpCondition,
    Operand,
    PathOperand,
    RangeAnalysis,
    ValueInfo,
    ValueNumber,
    ValueTable,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).filter(None, log::LevelFilter::max()).try_init();
}

fn range(info: &ValueInfo) -> (i32, i32) {
    let bounds = info.constant_bounds();
    (bounds.lower_bound(), bounds.upper_bound())
}

struct Diamond {
    analysis: RangeAnalysis,
    taken: ValueTable,
    not_taken: ValueTable,
    length: ValueNumber,
    index: ValueNumber,
}

/// `if index < length { .. } else { .. }` where `index` is known to be non-negative.
fn diamond(config: ConfigSectionBounds) -> Diamond {
    init_logger();
    let analysis = RangeAnalysis::new(config);

    let mut table = ValueTable::default();
    let length = table.new_value(ValueInfo::int_range(0, 1000));
    let index = table.new_value(ValueInfo::int_range(-100, 100));

    if let Some((non_negative, _)) = analysis.branch_facts(JumpCondition::GreaterOrEqual, index, PathOperand::Constant(0)) {
        analysis.apply_path_dependent_info(&mut table, &non_negative);
    }

    let mut taken = table.clone();
    let mut not_taken = table;

    if let Some((when_taken, when_not_taken)) = analysis.branch_facts(JumpCondition::Less, index, PathOperand::Value(length)) {
        analysis.apply_path_dependent_info(&mut taken, &when_taken);
        analysis.apply_path_dependent_info(&mut not_taken, &when_not_taken);
    }

    Diamond { analysis, taken, not_taken, length, index }
}

#[test]
fn branch_facts_refine_both_operands() {
    let Diamond { taken, not_taken, length, index, .. } = diamond(ConfigSectionBounds::default());

    let index_taken = taken.get(index).info();
    assert_eq!(range(index_taken), (0, 100));
    let bounds = index_taken.int_bounds().expect("index heeft een relatieve grens");
    assert_eq!(bounds.relative_upper_bounds().get(length).map(|bound| bound.offset()), Some(-1));
    assert!(bounds.is_less_than_or_equal_to(taken.get(length), -1));
    assert!(!bounds.is_less_than_or_equal_to(taken.get(length), -2));

    let length_taken = taken.get(length).info();
    assert_eq!(range(length_taken), (1, 1000));
    let bounds = length_taken.int_bounds().unwrap();
    assert_eq!(bounds.relative_lower_bounds().get(index).map(|bound| bound.offset()), Some(1));

    let length_not_taken = not_taken.get(length).info();
    assert_eq!(range(length_not_taken), (0, 100));
    assert!(length_not_taken.int_bounds().unwrap().is_less_than_or_equal_to(not_taken.get(index), 0));
}

#[test]
fn merge_keeps_only_what_both_arms_know() {
    let Diamond { analysis, taken, not_taken, length, index } = diamond(ConfigSectionBounds::default());

    let merged = analysis.merge_values(taken.get(index), not_taken.get(index));
    assert_eq!(range(&merged), (0, 100));
    assert_eq!(merged.int_bounds(), None);

    let merged = analysis.merge_values(taken.get(length), not_taken.get(length));
    assert_eq!(range(&merged), (0, 1000));
    assert_eq!(merged.int_bounds(), None);
}

#[test]
fn joined_value_from_guarded_arm_and_zero_stays_non_negative() {
    // a = index in the guarded arm, a = 0 in the other.
    let Diamond { analysis, taken, mut not_taken, length, index } = diamond(ConfigSectionBounds::default());
    let zero = not_taken.new_value(ValueInfo::int_constant(0));

    for merged in [
        analysis.merge_values(taken.get(index), not_taken.get(zero)),
        analysis.merge_values(not_taken.get(zero), taken.get(index)),
    ] {
        assert_eq!(range(&merged), (0, 100));
        assert!(merged.constant_bounds().lower_bound() >= 0);
        assert_eq!(merged.int_bounds(), None);
    }

    let bounded = taken.get(index).info().int_bounds().unwrap();
    assert!(bounded.relative_upper_bounds().get(length).is_some());
}

#[test]
fn increment_inside_the_guarded_arm_stays_below_the_length() {
    let Diamond { analysis, taken, length, index, .. } = diamond(ConfigSectionBounds::default());

    let next = analysis.add_constant(&taken, index, 1, true);
    assert_eq!(range(&next), (1, 101));

    let bounds = next.int_bounds().expect("index + 1 heeft relatieve grenzen");
    assert!(bounds.is_less_than_or_equal_to(taken.get(length), 0));
    assert!(!bounds.is_less_than_or_equal_to(taken.get(length), -1));
    assert_eq!(bounds.relative_lower_bounds().get(index).map(|bound| bound.offset()), Some(1));
    assert_eq!(bounds.relative_upper_bounds().get(index).map(|bound| bound.offset()), Some(1));
}

#[test]
fn imprecise_increment_gives_up_the_upper_end() {
    let Diamond { analysis, taken, index, .. } = diamond(ConfigSectionBounds::default());

    let next = analysis.add_constant(&taken, index, 1, false);
    assert_eq!(range(&next), (1, i32::MAX));

    let bounds = next.int_bounds().unwrap();
    assert!(bounds.relative_upper_bounds().is_empty());
    assert_eq!(bounds.relative_lower_bounds().get(index).map(|bound| bound.offset()), Some(1));
}

#[rstest]
#[case(ConfigSectionBounds { track_relative_bounds: false, path_dependent_values: true })]
#[case(ConfigSectionBounds { track_relative_bounds: true, path_dependent_values: false })]
fn disabled_tracking_learns_no_relative_facts(#[case] config: ConfigSectionBounds) {
    let Diamond { taken, index, .. } = diamond(config);
    assert_eq!(taken.get(index).info().int_bounds(), None);
}

#[test]
fn proven_fact_strengthens_the_bound_check() {
    let Diamond { taken, length, index, .. } = diamond(ConfigSectionBounds::default());

    let mut builder = FunctionBuilder::new("grenzen");
    let index_register = builder.load_int(5);
    let length_register = builder.load_int(10);
    let position = builder.bound_check(
        builder.operand(index_register),
        builder.operand(length_register),
        None,
        BailOutKind::OnArrayAccessHelperCall,
    );
    builder.ret(None);
    let mut function = builder.build();

    let check = IntBoundCheck::new(index, length, position, 0);
    assert_eq!(check.compatibility_id(), IntBoundCheck::new(index, length, position + 1, 3).compatibility_id());

    // The check only needs to establish what the guarding branch already proved.
    let index_info = taken.get(index).info().int_bounds().unwrap();
    let offset = -1;
    assert!(index_info.is_less_than_or_equal_to(taken.get(length), offset));

    assert!(check.set_bound_offset(&mut function, offset, false));

    let instruction = &function.instructions()[position];
    assert_eq!(instruction.dst, Some(Operand::Immediate(Immediate::Integer8(-1))));
    assert!(matches!(
        instruction.kind,
        InstructionKind::BoundCheck { bail_out_kind: BailOutKind::OnFailedHoistedBoundCheck }
    ));

    // Weaker requirements leave the check alone.
    assert!(check.set_bound_offset(&mut function, 0, true));
    assert_eq!(function.instructions()[position].dst, Some(Operand::Immediate(Immediate::Integer8(-1))));
}

#[test]
fn constant_ranges_intersect_on_equality() {
    init_logger();
    let analysis = RangeAnalysis::default();

    let mut table = ValueTable::default();
    let a = table.new_value(ValueInfo::int_range(0, 50));
    let b = table.new_value(ValueInfo::int_range(40, 80));

    let (equal, _) = analysis.branch_facts(JumpCondition::Equal, a, PathOperand::Value(b)).unwrap();
    analysis.apply_path_dependent_info(&mut table, &equal);

    assert_eq!(table.get(a).info().int_bounds().unwrap().constant_bounds(), IntConstantBounds::new(40, 50));
    assert_eq!(range(table.get(b).info()), (40, 50));
}
