// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::{collections::HashMap, fmt::Display};

use crate::IrError;

use super::{InlineeFrame, InlineeId, Instruction, Label, LoopId, LoopInfo, Region, RegionId, SymbolTable};

#[derive(Debug)]
pub struct Function {
    pub(crate) name: String,
    pub(crate) instructions: Vec<Instruction>,
    pub(crate) symbols: SymbolTable,
    pub(crate) regions: Vec<Region>,
    pub(crate) loops: Vec<LoopInfo>,
    pub(crate) inlinees: Vec<InlineeFrame>,
    pub(crate) has_try: bool,
    pub(super) label_counter: usize,
}

impl Function {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    #[must_use]
    pub fn instruction_mut(&mut self, index: usize) -> Option<&mut Instruction> {
        self.instructions.get_mut(index)
    }

    #[must_use]
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    #[must_use]
    pub fn region(&self, id: RegionId) -> &Region {
        &self.regions[id.0]
    }

    #[must_use]
    pub fn loop_info(&self, id: LoopId) -> &LoopInfo {
        &self.loops[id.0]
    }

    #[must_use]
    pub fn loop_count(&self) -> usize {
        self.loops.len()
    }

    #[must_use]
    pub fn inlinee(&self, id: InlineeId) -> &InlineeFrame {
        &self.inlinees[id.0]
    }

    #[must_use]
    pub const fn has_try(&self) -> bool {
        self.has_try
    }

    #[must_use]
    pub(crate) fn create_label(&mut self) -> Label {
        self.label_counter += 1;
        Label {
            id: self.label_counter,
        }
    }

    #[must_use]
    pub fn has_instruction_numbers(&self) -> bool {
        self.instructions.first().is_some_and(|instruction| instruction.number != 0)
    }

    /// Numbers the instructions in layout order, starting at `1`.
    pub fn number_instructions(&mut self) {
        for (index, instruction) in self.instructions.iter_mut().enumerate() {
            instruction.number = index as u32 + 1;
        }
    }

    /// Checks the structural assumptions of the analyses, so that they can assert instead of
    /// recovering.
    pub fn verify(&self) -> Result<(), IrError> {
        let mut label_positions = HashMap::new();
        let mut previous_number = 0;

        for (index, instruction) in self.instructions.iter().enumerate() {
            if instruction.number == 0 {
                return Err(IrError::UnnumberedInstruction { index });
            }

            if instruction.number < previous_number {
                return Err(IrError::NonMonotonicNumbering {
                    index,
                    previous: previous_number,
                    current: instruction.number,
                });
            }
            previous_number = instruction.number;

            if let Some(info) = instruction.as_label() {
                if label_positions.insert(info.label, instruction.number).is_some() {
                    return Err(IrError::DuplicateLabel { label: info.label });
                }

                if let Some(region) = info.region {
                    if region.0 >= self.regions.len() {
                        return Err(IrError::UnknownRegion { region: region.0 });
                    }
                }

                if let Some(loop_id) = info.loop_top {
                    if loop_id.0 >= self.loops.len() {
                        return Err(IrError::UnknownLoop { label: info.label });
                    }
                }
            }

            let operands = [&instruction.dst, &instruction.src1, &instruction.src2];
            let condition = instruction.bail_out.as_ref().and_then(|bail_out| bail_out.branch_condition.as_ref());
            for operand in operands.into_iter().flatten().chain(condition) {
                for register in operand.virtual_registers() {
                    if !self.symbols.contains(register) {
                        return Err(IrError::UnknownRegister { register });
                    }
                }
            }
        }

        for instruction in &self.instructions {
            for target in instruction.branch_targets() {
                if !label_positions.contains_key(target) {
                    return Err(IrError::UnknownBranchTarget { label: *target });
                }
            }
        }

        for instruction in &self.instructions {
            let Some(info) = instruction.as_label() else { continue };
            if info.loop_top.is_none() {
                continue;
            }

            let has_back_edge = self.instructions.iter()
                .any(|branch| branch.number > instruction.number && branch.branch_targets().contains(&info.label));
            if !has_back_edge {
                return Err(IrError::LoopTopWithoutBackEdge { label: info.label });
            }
        }

        Ok(())
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("werkwijze ")?;
        self.name.fmt(f)?;

        for instruction in &self.instructions {
            write!(f, "\n{:>4}    ", instruction.number)?;
            instruction.fmt(f)?;
        }

        f.write_str("\n")?;

        Ok(())
    }
}
