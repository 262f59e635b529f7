// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use crate::{Architecture, MemoryReference, Operand, SymbolTable};

/// Rewrites `[base + (index << scale) + offset]` into a fixed memory reference when the base
/// holds a constant address and the index (if any) a constant integer. Returns whether the
/// operand was replaced.
///
/// A constant index is folded into the offset even when the base turns out not to be
/// foldable; folding the operand a second time then gives the same result.
pub fn fold_indirect(architecture: Architecture, symbols: &SymbolTable, operand: &mut Operand) -> bool {
    if !architecture.can_fold_indirect_operands() {
        return false;
    }

    let Operand::Indirect(indirect) = operand else {
        return false;
    };

    if let Some(index) = indirect.index {
        let Some(value) = index.register.and_then(|register| symbols.get(register)?.int_constant()) else {
            return false;
        };

        if indirect.scale >= 32 {
            return false;
        }

        let Some(scaled) = i64::from(value).checked_mul(1 << indirect.scale) else {
            return false;
        };

        let Ok(mut offset) = i32::try_from(scaled) else {
            return false;
        };

        if indirect.offset != 0 {
            let Some(sum) = indirect.offset.checked_add(offset) else {
                return false;
            };
            offset = sum;
        }

        indirect.offset = offset;
        indirect.index = None;
    }

    let Some(address) = indirect.base.register.and_then(|register| symbols.get(register)?.address_constant()) else {
        return false;
    };

    let Some(address) = address.checked_add_signed(i64::from(indirect.offset)) else {
        return false;
    };

    if !architecture.fits_in_displacement(address) {
        return false;
    }

    *operand = Operand::MemoryReference(MemoryReference {
        address,
        machine_type: indirect.machine_type,
    });

    true
}
