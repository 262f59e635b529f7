// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

mod bail_out;
mod function;
mod function_builder;
mod instruction;
mod loop_info;
mod machine_type;
mod operand;
mod region;
mod symbol;

pub use self::{
    bail_out::{
        ArgOut,
        BailOutInfo,
        BailOutKind,
    },
    function::Function,
    function_builder::FunctionBuilder,
    instruction::{
        Instruction,
        InstructionKind,
        JumpCondition,
        Label,
        LabelInfo,
        MathOperation,
    },
    loop_info::{
        InlineeFrame,
        InlineeId,
        LoopId,
        LoopInfo,
    },
    machine_type::MachineType,
    operand::{
        Immediate,
        IndirectOperand,
        MemoryReference,
        Operand,
        ParameterSlotOperand,
        PhysicalRegister,
        RegisterAllocator,
        RegisterOperand,
        RegisterSet,
        VirtualRegister,
    },
    region::{
        Region,
        RegionId,
        RegionKind,
    },
    symbol::{
        Symbol,
        SymbolConstant,
        SymbolTable,
    },
};
