// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use strum::{AsRefStr, Display};

use super::{Operand, VirtualRegister};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, AsRefStr, Display)]
pub enum BailOutKind {
    #[default]
    OnImplicitCalls,
    OnNoProfile,
    OnArrayAccessHelperCall,
    OnFailedHoistedBoundCheck,
    OnFailedHoistedLoopCountBasedBoundCheck,
}

/// A value that must be written out to the bail-out record of an outgoing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgOut {
    pub register: VirtualRegister,
    pub is_bail_out_referenced: bool,
}

/// Everything a lowered bail-out needs to rebuild the interpreter frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BailOutInfo {
    pub kind: BailOutKind,
    pub upward_exposed_uses: Vec<VirtualRegister>,
    pub copy_prop_registers: Vec<VirtualRegister>,
    pub arg_outs: Vec<ArgOut>,
    pub branch_condition: Option<Operand>,
}

impl BailOutInfo {
    #[must_use]
    pub fn new(kind: BailOutKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }
}
