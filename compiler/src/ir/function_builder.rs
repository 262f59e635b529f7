// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use super::{
    BailOutInfo, BailOutKind, Function, Immediate, IndirectOperand, InlineeFrame, InlineeId, Instruction,
    InstructionKind, JumpCondition, Label, LabelInfo, LoopId, LoopInfo, MachineType, MathOperation, Operand,
    ParameterSlotOperand, PhysicalRegister, Region, RegionId, RegionKind, RegisterAllocator, RegisterOperand,
    Symbol, SymbolConstant, SymbolTable, VirtualRegister,
};

#[derive(Debug)]
pub struct FunctionBuilder {
    name: String,
    register_allocator: RegisterAllocator,
    instructions: Vec<Instruction>,
    symbols: SymbolTable,
    regions: Vec<Region>,
    loops: Vec<LoopInfo>,
    inlinees: Vec<InlineeFrame>,
    has_try: bool,
    label_counter: usize,
    current_region: Option<RegionId>,
    pending_region: Option<RegionId>,
    current_inlinee: Option<InlineeId>,
}

impl FunctionBuilder {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            register_allocator: RegisterAllocator::new(),
            instructions: Vec::new(),
            symbols: SymbolTable::default(),
            regions: Vec::new(),
            loops: Vec::new(),
            inlinees: Vec::new(),
            has_try: false,
            label_counter: 0,
            current_region: None,
            pending_region: None,
            current_inlinee: None,
        }
    }

    #[must_use]
    pub fn new_register(&mut self, machine_type: MachineType) -> VirtualRegister {
        let register = self.register_allocator.next();
        self.symbols.insert(register, Symbol::new(machine_type));
        register
    }

    /// Declares an outgoing-argument slot register.
    #[must_use]
    pub fn new_arg_slot(&mut self, machine_type: MachineType) -> VirtualRegister {
        let register = self.new_register(machine_type);
        self.symbol_mut(register).is_arg_slot = true;
        register
    }

    pub fn mark_non_temp_local(&mut self, register: VirtualRegister) {
        self.symbol_mut(register).is_non_temp_local = true;
    }

    #[must_use]
    pub fn operand(&self, register: VirtualRegister) -> RegisterOperand {
        let machine_type = self.symbols.get(register)
            .map(|symbol| symbol.machine_type)
            .unwrap_or(MachineType::Int64);
        RegisterOperand::virtual_register(register, machine_type)
    }

    /// Appends an instruction, returning its index.
    pub fn push(&mut self, mut instruction: Instruction) -> usize {
        instruction.inlinee = self.current_inlinee;

        if let Some(Operand::Register(RegisterOperand { register: Some(register), .. })) = instruction.dst {
            self.symbol_mut(register).definition_count += 1;
        }

        self.instructions.push(instruction);
        self.instructions.len() - 1
    }

    #[must_use]
    pub fn load_int(&mut self, value: i32) -> VirtualRegister {
        let register = self.new_register(MachineType::Int32);
        self.push(Instruction::new(InstructionKind::Move)
            .with_dst(self.operand(register))
            .with_src1(Immediate::Integer32(value)));
        self.symbol_mut(register).constant = Some(SymbolConstant::Int(value));
        register
    }

    #[must_use]
    pub fn load_float(&mut self, value: f64) -> VirtualRegister {
        let register = self.new_register(MachineType::Float64);
        self.push(Instruction::new(InstructionKind::Move)
            .with_dst(self.operand(register))
            .with_src1(Immediate::Integer64(value.to_bits() as i64)));
        self.symbol_mut(register).constant = Some(SymbolConstant::Float(value));
        register
    }

    #[must_use]
    pub fn load_address(&mut self, address: u64) -> VirtualRegister {
        let register = self.new_register(MachineType::Int64);
        self.push(Instruction::new(InstructionKind::Move)
            .with_dst(self.operand(register))
            .with_src1(Immediate::Integer64(address as i64)));
        self.symbol_mut(register).constant = Some(SymbolConstant::Address(address));
        register
    }

    pub fn move_to(&mut self, destination: VirtualRegister, source: impl Into<Operand>) {
        self.push(Instruction::new(InstructionKind::Move)
            .with_dst(self.operand(destination))
            .with_src1(source.into()));
    }

    #[must_use]
    pub fn copy(&mut self, source: VirtualRegister) -> VirtualRegister {
        let machine_type = self.operand(source).machine_type;
        let destination = self.new_register(machine_type);
        self.move_to(destination, self.operand(source));
        destination
    }

    /// Moves a register into a fixed machine register, e.g. for a return value.
    pub fn move_to_physical(&mut self, physical: PhysicalRegister, source: VirtualRegister) {
        let source = self.operand(source);
        self.push(Instruction::new(InstructionKind::Move)
            .with_dst(RegisterOperand::physical_register(physical, source.machine_type))
            .with_src1(source));
    }

    #[must_use]
    pub fn math(&mut self, operation: MathOperation, lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> VirtualRegister {
        let destination = self.new_register(MachineType::Int32);

        self.push(Instruction::new(InstructionKind::MathOperation(operation))
            .with_dst(self.operand(destination))
            .with_src1(lhs.into())
            .with_src2(rhs.into()));

        destination
    }

    pub fn shuffle(&mut self, destination: VirtualRegister, source: VirtualRegister) {
        self.push(Instruction::new(InstructionKind::Shuffle)
            .with_dst(self.operand(destination))
            .with_src1(self.operand(source)));
    }

    #[must_use]
    pub fn call(&mut self, callee: impl Into<Operand>) -> VirtualRegister {
        let ret_val_reg = self.new_register(MachineType::Int64);

        self.push(Instruction::new(InstructionKind::Call)
            .with_dst(self.operand(ret_val_reg))
            .with_src1(callee.into()));

        ret_val_reg
    }

    /// A lowered bail-out: a call into the runtime that never returns to this code.
    pub fn bail_out(&mut self, info: BailOutInfo) {
        let mut instruction = Instruction::new(InstructionKind::Call);
        instruction.bail_out = Some(info);
        self.push(instruction);
    }

    /// Emits `index <= length + offset`, returning the index of the check.
    pub fn bound_check(&mut self, index: impl Into<Operand>, length: impl Into<Operand>, offset: Option<i32>, bail_out_kind: BailOutKind) -> usize {
        let mut instruction = Instruction::new(InstructionKind::BoundCheck { bail_out_kind })
            .with_src1(index.into())
            .with_src2(length.into());

        if let Some(offset) = offset {
            instruction.dst = Some(Immediate::Integer32(offset).into());
        }

        self.push(instruction)
    }

    #[must_use]
    pub fn load_indirect(&mut self, base: VirtualRegister, index: Option<VirtualRegister>, scale: u8, offset: i32, machine_type: MachineType) -> VirtualRegister {
        let destination = self.new_register(machine_type);
        let source = self.indirect(base, index, scale, offset, machine_type);
        self.move_to(destination, source);
        destination
    }

    pub fn store_indirect(&mut self, base: VirtualRegister, index: Option<VirtualRegister>, scale: u8, offset: i32, value: VirtualRegister) {
        let value = self.operand(value);
        let destination = self.indirect(base, index, scale, offset, value.machine_type);
        self.push(Instruction::new(InstructionKind::Move)
            .with_dst(destination)
            .with_src1(value));
    }

    #[must_use]
    fn indirect(&self, base: VirtualRegister, index: Option<VirtualRegister>, scale: u8, offset: i32, machine_type: MachineType) -> IndirectOperand {
        IndirectOperand {
            base: self.operand(base),
            index: index.map(|index| self.operand(index)),
            scale,
            offset,
            machine_type,
        }
    }

    /// Loads an incoming parameter from its stack slot. Returns the slot register and the
    /// register holding the loaded value.
    #[must_use]
    pub fn load_parameter(&mut self, slot: u16, implicit: bool, machine_type: MachineType) -> (VirtualRegister, VirtualRegister) {
        let slot_register = self.new_register(machine_type);
        let destination = self.new_register(machine_type);

        self.move_to(destination, Operand::ParameterSlot(ParameterSlotOperand {
            register: slot_register,
            slot,
            implicit,
            machine_type,
        }));

        (slot_register, destination)
    }

    #[must_use]
    pub fn create_label(&mut self) -> Label {
        self.label_counter += 1;
        Label {
            id: self.label_counter,
        }
    }

    fn link(&mut self, label: Label, is_helper: bool, loop_top: Option<LoopId>) {
        let region = self.pending_region.take();
        self.push(Instruction::new(InstructionKind::Label(LabelInfo {
            label,
            loop_top,
            is_helper,
            region,
        })));
    }

    pub fn link_label(&mut self, label: Label) {
        self.link(label, false, None);
    }

    pub fn link_helper_label(&mut self, label: Label) {
        self.link(label, true, None);
    }

    /// Links the first label of a loop, whose back edge must be emitted later.
    #[must_use]
    pub fn link_loop_top(&mut self, label: Label) -> LoopId {
        let loop_id = LoopId(self.loops.len());
        self.loops.push(LoopInfo::default());
        self.link(label, false, Some(loop_id));
        loop_id
    }

    pub fn mark_live_on_back_edge(&mut self, loop_id: LoopId, register: VirtualRegister) {
        self.loops[loop_id.0].live_on_back_edge.insert(register);
    }

    /// Opens a region; the next linked label carries it.
    pub fn begin_region(&mut self, kind: RegionKind) -> RegionId {
        let id = RegionId(self.regions.len());
        self.regions.push(Region::new(kind, self.current_region));

        if kind != RegionKind::Root {
            self.has_try = true;
        }

        self.current_region = Some(id);
        self.pending_region = Some(id);
        id
    }

    /// Returns to the parent region; the next linked label carries the parent.
    pub fn end_region(&mut self) {
        let current = self.current_region.expect("Geen regio om af te sluiten");
        self.current_region = self.regions[current.0].parent;
        self.pending_region = self.current_region;
    }

    pub fn jump(&mut self, location: Label) {
        self.push(Instruction::new(InstructionKind::Branch { target: location, condition: None }));
    }

    pub fn branch_if(&mut self, condition: JumpCondition, lhs: impl Into<Operand>, rhs: impl Into<Operand>, location: Label) {
        self.push(Instruction::new(InstructionKind::Branch { target: location, condition: Some(condition) })
            .with_src1(lhs.into())
            .with_src2(rhs.into()));
    }

    pub fn multi_branch(&mut self, selector: VirtualRegister, targets: impl Into<Vec<Label>>) {
        self.push(Instruction::new(InstructionKind::MultiBranch { targets: targets.into() })
            .with_src1(self.operand(selector)));
    }

    #[must_use]
    pub fn create_inlinee(&mut self, frame: InlineeFrame) -> InlineeId {
        let id = InlineeId(self.inlinees.len());
        self.inlinees.push(frame);
        id
    }

    /// Subsequent instructions belong to the given inlinee, or to the top function for `None`.
    pub fn set_inlinee(&mut self, inlinee: Option<InlineeId>) {
        self.current_inlinee = inlinee;
    }

    pub fn inlinee_end(&mut self) {
        debug_assert!(self.current_inlinee.is_some(), "EindeIngevoegd buiten een ingevoegde functie");
        self.push(Instruction::new(InstructionKind::InlineeEnd));
    }

    pub fn ret(&mut self, value: Option<VirtualRegister>) {
        let mut instruction = Instruction::new(InstructionKind::Return);
        instruction.src1 = value.map(|value| self.operand(value).into());
        self.push(instruction);
    }

    #[must_use]
    pub fn build(self) -> Function {
        let mut function = Function {
            name: self.name,
            instructions: self.instructions,
            symbols: self.symbols,
            regions: self.regions,
            loops: self.loops,
            inlinees: self.inlinees,
            has_try: self.has_try,
            label_counter: self.label_counter,
        };

        function.number_instructions();
        function
    }

    fn symbol_mut(&mut self, register: VirtualRegister) -> &mut Symbol {
        self.symbols.get_mut(register).expect("register is niet door deze bouwer aangemaakt")
    }
}
