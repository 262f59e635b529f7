// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use log::debug;

use crate::{analysis::ValueNumber, BailOutKind, Function, Immediate, InstructionKind, Operand};

/// Bound checks on the same pair of values can be combined into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntBoundCheckCompatibilityId {
    left: ValueNumber,
    right: ValueNumber,
}

impl IntBoundCheckCompatibilityId {
    #[must_use]
    pub const fn new(left: ValueNumber, right: ValueNumber) -> Self {
        Self { left, right }
    }
}

/// A bound check instruction that establishes `left <= right + offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntBoundCheck {
    left: ValueNumber,
    right: ValueNumber,
    instruction: usize,
    block: u32,
}

impl IntBoundCheck {
    #[must_use]
    pub const fn new(left: ValueNumber, right: ValueNumber, instruction: usize, block: u32) -> Self {
        Self { left, right, instruction, block }
    }

    #[must_use]
    pub const fn left(&self) -> ValueNumber {
        self.left
    }

    #[must_use]
    pub const fn right(&self) -> ValueNumber {
        self.right
    }

    /// Index of the check in the instruction list of the function.
    #[must_use]
    pub const fn instruction(&self) -> usize {
        self.instruction
    }

    #[must_use]
    pub const fn block(&self) -> u32 {
        self.block
    }

    #[must_use]
    pub const fn compatibility_id(&self) -> IntBoundCheckCompatibilityId {
        IntBoundCheckCompatibilityId::new(self.left, self.right)
    }

    /// Makes the check establish at least `left <= right + offset`. Returns `false` when that
    /// would need an offset that does not fit, in which case the instruction is untouched.
    ///
    /// The check is `src1 <= src2 + dst`. Strengthening folds into an immediate `src1` first,
    /// and otherwise into the offset in `dst`.
    pub fn set_bound_offset(&self, function: &mut Function, offset: i32, is_loop_count_based: bool) -> bool {
        let Some(instruction) = function.instruction_mut(self.instruction) else {
            return false;
        };

        let InstructionKind::BoundCheck { bail_out_kind } = &mut instruction.kind else {
            return false;
        };

        let immediate = |operand: &Option<Operand>| operand.as_ref().and_then(Operand::as_immediate).map(|immediate| immediate.as_i64());

        let dst = immediate(&instruction.dst);
        let src1 = immediate(&instruction.src1);
        let src2 = immediate(&instruction.src2);

        // The offset the check currently establishes.
        let mut previous_offset = dst.unwrap_or(0);
        if let Some(src1) = src1 {
            let Some(value) = previous_offset.checked_sub(src1) else { return false };
            previous_offset = value;
        }
        if let Some(src2) = src2 {
            let Some(value) = previous_offset.checked_add(src2) else { return false };
            previous_offset = value;
        }

        let offset = i64::from(offset);
        if offset >= previous_offset {
            return true;
        }

        let Some(decrease) = previous_offset.checked_sub(offset) else { return false };
        debug_assert!(decrease > 0);

        if let Some(src1) = src1 {
            let Some(new_src1) = src1.checked_add(decrease) else { return false };
            instruction.src1 = Some(Immediate::Integer64(new_src1).shrink_if_possible().into());
        } else if let Some(dst) = dst {
            let Some(new_dst) = dst.checked_sub(decrease) else { return false };
            instruction.dst = if new_dst == 0 {
                None
            } else {
                Some(Immediate::Integer64(new_dst).shrink_if_possible().into())
            };
        } else {
            let Some(new_dst) = 0i64.checked_sub(decrease) else { return false };
            instruction.dst = Some(Immediate::Integer64(new_dst).shrink_if_possible().into());
        }

        *bail_out_kind = match *bail_out_kind {
            BailOutKind::OnFailedHoistedBoundCheck if is_loop_count_based => BailOutKind::OnFailedHoistedLoopCountBasedBoundCheck,
            BailOutKind::OnFailedHoistedBoundCheck | BailOutKind::OnFailedHoistedLoopCountBasedBoundCheck => *bail_out_kind,
            _ if is_loop_count_based => BailOutKind::OnFailedHoistedLoopCountBasedBoundCheck,
            _ => BailOutKind::OnFailedHoistedBoundCheck,
        };

        debug!("Grenscontrole {} op instructie {} aangescherpt tot offset {offset}", self.left, self.instruction);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FunctionBuilder, MachineType};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn check(instruction: usize) -> IntBoundCheck {
        IntBoundCheck::new(ValueNumber::new(1), ValueNumber::new(2), instruction, 0)
    }

    fn function_with_check(offset: Option<i32>, kind: BailOutKind) -> (Function, usize) {
        let mut builder = FunctionBuilder::new("grens");
        let index = builder.new_register(MachineType::Int32);
        let length = builder.new_register(MachineType::Int32);
        let index_operand = builder.operand(index);
        let length_operand = builder.operand(length);
        let position = builder.bound_check(index_operand, length_operand, offset, kind);
        (builder.build(), position)
    }

    fn offset_of(function: &Function, position: usize) -> Option<i64> {
        function.instructions()[position].dst.as_ref().and_then(Operand::as_immediate).map(|immediate| immediate.as_i64())
    }

    fn bail_out_kind_of(function: &Function, position: usize) -> BailOutKind {
        match &function.instructions()[position].kind {
            InstructionKind::BoundCheck { bail_out_kind } => *bail_out_kind,
            other => panic!("Geen grenscontrole: {other:?}"),
        }
    }

    #[test]
    fn strengthening_lowers_the_offset_and_weaker_requests_are_no_ops() {
        let (mut function, position) = function_with_check(Some(10), BailOutKind::OnFailedHoistedBoundCheck);
        let check = check(position);

        assert!(check.set_bound_offset(&mut function, 4, false));
        assert_eq!(offset_of(&function, position), Some(4));

        assert!(check.set_bound_offset(&mut function, 7, false));
        assert_eq!(offset_of(&function, position), Some(4));
    }

    #[test]
    fn zero_offset_removes_the_destination() {
        let (mut function, position) = function_with_check(Some(3), BailOutKind::OnFailedHoistedBoundCheck);

        assert!(check(position).set_bound_offset(&mut function, 0, false));
        assert_eq!(function.instructions()[position].dst, None);
    }

    #[test]
    fn missing_offset_becomes_negative() {
        let (mut function, position) = function_with_check(None, BailOutKind::OnFailedHoistedBoundCheck);

        assert!(check(position).set_bound_offset(&mut function, -2, false));
        assert_eq!(offset_of(&function, position), Some(-2));
    }

    #[test]
    fn immediate_left_side_absorbs_the_decrease() {
        let mut builder = FunctionBuilder::new("grens");
        let length = builder.new_register(MachineType::Int32);
        let length_operand = builder.operand(length);
        let position = builder.bound_check(Immediate::Integer32(5), length_operand, None, BailOutKind::OnFailedHoistedBoundCheck);
        let mut function = builder.build();

        // 5 <= length establishes an offset of -5
        assert!(check(position).set_bound_offset(&mut function, -5, false));
        assert!(check(position).set_bound_offset(&mut function, -8, false));

        let instruction = &function.instructions()[position];
        assert_eq!(instruction.src1.as_ref().and_then(Operand::as_immediate).map(|i| i.as_i64()), Some(8));
        assert_eq!(instruction.dst, None);
    }

    #[rstest]
    #[case(BailOutKind::OnFailedHoistedBoundCheck, false, BailOutKind::OnFailedHoistedBoundCheck)]
    #[case(BailOutKind::OnFailedHoistedBoundCheck, true, BailOutKind::OnFailedHoistedLoopCountBasedBoundCheck)]
    #[case(BailOutKind::OnFailedHoistedLoopCountBasedBoundCheck, false, BailOutKind::OnFailedHoistedLoopCountBasedBoundCheck)]
    #[case(BailOutKind::OnArrayAccessHelperCall, false, BailOutKind::OnFailedHoistedBoundCheck)]
    #[case(BailOutKind::OnImplicitCalls, true, BailOutKind::OnFailedHoistedLoopCountBasedBoundCheck)]
    fn bail_out_kind_is_upgraded(#[case] kind: BailOutKind, #[case] loop_count_based: bool, #[case] expected: BailOutKind) {
        let (mut function, position) = function_with_check(Some(1), kind);

        assert!(check(position).set_bound_offset(&mut function, 0, loop_count_based));
        assert_eq!(bail_out_kind_of(&function, position), expected);
    }

    #[test]
    fn overflowing_offset_is_rejected() {
        let mut builder = FunctionBuilder::new("grens");
        let length = builder.new_register(MachineType::Int32);
        let length_operand = builder.operand(length);
        let position = builder.bound_check(Immediate::Integer64(i64::MIN), length_operand, None, BailOutKind::OnFailedHoistedBoundCheck);
        let mut function = builder.build();

        assert!(!check(position).set_bound_offset(&mut function, 0, false));
    }

    #[test]
    fn compatible_checks_share_an_id() {
        let a = IntBoundCheck::new(ValueNumber::new(1), ValueNumber::new(2), 0, 0);
        let b = IntBoundCheck::new(ValueNumber::new(1), ValueNumber::new(2), 5, 1);
        let c = IntBoundCheck::new(ValueNumber::new(2), ValueNumber::new(1), 5, 1);
        assert_eq!(a.compatibility_id(), b.compatibility_id());
        assert_ne!(a.compatibility_id(), c.compatibility_id());
    }
}
