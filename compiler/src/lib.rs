// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

mod analysis;
mod backend;
mod config;
mod error;
mod ir;
mod types;

pub use self::{
    analysis::{
        Bound,
        BoundDirection,
        IntBoundCheck,
        IntBoundCheckCompatibilityId,
        IntBounds,
        IntConstantBounds,
        MergeMode,
        PathDependentInfo,
        PathDependentRelationship,
        PathOperand,
        RangeAnalysis,
        RelativeBound,
        RelativeBoundSet,
        Value,
        ValueInfo,
        ValueNumber,
        ValueTable,
        ValueType,
    },
    backend::{
        fold_indirect,
        use_spill_cost,
        HelperBlock,
        LifeAnalysis,
        LifeAnalysisResult,
        LifetimeId,
        LoopRecord,
        RegisterLifetime,
    },
    config::{
        CompilerConfig,
        ConfigSectionBounds,
        ConfigSectionLiveness,
        ConfigSectionTarget,
    },
    error::{
        IrError,
        StroomError,
        StroomResult,
    },
    ir::{
        ArgOut,
        BailOutInfo,
        BailOutKind,
        Function,
        FunctionBuilder,
        Immediate,
        IndirectOperand,
        InlineeFrame,
        InlineeId,
        Instruction,
        InstructionKind,
        JumpCondition,
        Label,
        LabelInfo,
        LoopId,
        LoopInfo,
        MachineType,
        MathOperation,
        MemoryReference,
        Operand,
        ParameterSlotOperand,
        PhysicalRegister,
        Region,
        RegionId,
        RegionKind,
        RegisterAllocator,
        RegisterOperand,
        RegisterSet,
        Symbol,
        SymbolConstant,
        SymbolTable,
        VirtualRegister,
    },
    types::Architecture,
};
