// Copyright (C) 2024 - 2025 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::{debug, trace};

use crate::{
    Architecture,
    BailOutKind,
    CompilerConfig,
    ConfigSectionLiveness,
    Function,
    InlineeId,
    Instruction,
    InstructionKind,
    Label,
    LabelInfo,
    LoopId,
    MachineType,
    Operand,
    ParameterSlotOperand,
    PhysicalRegister,
    RegionId,
    RegisterOperand,
    VirtualRegister,
};

use super::{fold_indirect, use_spill_cost, HelperBlock, LifetimeId, LoopRecord, RegisterLifetime};

/// Computes register lifetimes in a single walk over the instructions, which must be laid
/// out in reverse depth-first order so that every loop is contiguous.
#[derive(Debug)]
pub struct LifeAnalysis<'f> {
    function: &'f mut Function,
    architecture: Architecture,
    config: ConfigSectionLiveness,
    result: LifeAnalysisResult,

    /// The number of the last branch to each referenced label.
    last_branch_to: HashMap<Label, u32>,
    helper_labels: HashSet<Label>,
    label_regions: HashMap<Label, RegionId>,

    output: Vec<Instruction>,
    first_instruction: (u32, bool),

    current_number: u32,
    current_is_label: bool,

    loop_nest: u32,
    current_loop: Option<LoopId>,
    current_region: Option<RegionId>,
    last_label_is_helper: Option<bool>,
    helper_label: Option<(Label, u32)>,
    last_call: u32,
    last_non_helper_call: u32,
    pending_helper_label: Option<Instruction>,
}

impl<'f> LifeAnalysis<'f> {
    #[must_use]
    pub fn analyze(function: &'f mut Function, config: &CompilerConfig) -> LifeAnalysisResult {
        if !function.has_instruction_numbers() {
            function.number_instructions();
        }

        function.symbols.clear_lifetimes();
        debug!("Levensanalyse van werkwijze {}", function.name);

        let mut this = Self {
            architecture: config.target.architecture,
            config: config.liveness.clone(),
            result: LifeAnalysisResult::default(),

            last_branch_to: HashMap::new(),
            helper_labels: HashSet::new(),
            label_regions: HashMap::new(),

            output: Vec::with_capacity(function.instructions.len()),
            first_instruction: function.instructions.first()
                .map_or((0, false), |instruction| (instruction.number, instruction.is_label())),

            current_number: 0,
            current_is_label: false,

            loop_nest: 0,
            current_loop: None,
            current_region: None,
            last_label_is_helper: None,
            helper_label: None,
            last_call: 0,
            last_non_helper_call: 0,
            pending_helper_label: None,

            function,
        };

        this.scan_labels();

        let mut instructions = std::mem::take(&mut this.function.instructions).into_iter().peekable();
        let mut inserted = None;

        while let Some(mut instruction) = inserted.take().or_else(|| instructions.next()) {
            let next = instructions.peek().map(|next| (next.number, next.is_label()));
            if this.add_instruction(&mut instruction, next) {
                this.output.push(instruction);
            }
            inserted = this.pending_helper_label.take();
        }

        this.finish();
        this.result.dump_result();
        this.result
    }

    fn scan_labels(&mut self) {
        for instruction in &self.function.instructions {
            for target in instruction.branch_targets() {
                let last = self.last_branch_to.entry(*target).or_insert(0);
                *last = (*last).max(instruction.number);
            }

            if let Some(info) = instruction.as_label() {
                if info.is_helper {
                    self.helper_labels.insert(info.label);
                }

                if let Some(region) = info.region {
                    self.label_regions.insert(info.label, region);
                }
            }
        }
    }

    /// Returns `false` when the instruction was dropped. `next` holds the number of the next
    /// instruction and whether it is a label.
    fn add_instruction(&mut self, instruction: &mut Instruction, next: Option<(u32, bool)>) -> bool {
        self.current_number = instruction.number;
        self.current_is_label = instruction.is_label();

        self.finish_loops();

        if let Some(bail_out) = &mut instruction.bail_out {
            let pointer_size = self.pointer_size();

            for &register in &bail_out.upward_exposed_uses {
                self.process_use(register, pointer_size);
            }

            for &register in &bail_out.copy_prop_registers {
                self.process_use(register, pointer_size);
            }

            for arg_out in &bail_out.arg_outs {
                let is_arg_slot = self.function.symbols.get(arg_out.register).is_some_and(|symbol| symbol.is_arg_slot);
                if !is_arg_slot && arg_out.is_bail_out_referenced {
                    self.process_use(arg_out.register, pointer_size);
                }
            }

            if let Some(condition) = &mut bail_out.branch_condition {
                self.process_source(condition);
            }

            if bail_out.kind == BailOutKind::OnNoProfile {
                self.use_inlinee_arguments(instruction.inlinee);
            }
        }

        if matches!(instruction.kind, InstructionKind::InlineeEnd) {
            if let Some(inlinee) = instruction.inlinee {
                let frame = self.function.inlinee(inlinee);
                if frame.has_inline_args_opt {
                    let arguments = frame.arguments.clone();
                    self.use_registers(&arguments);
                }
            }
        }

        if let Some(src1) = &mut instruction.src1 {
            self.process_source(src1);

            if let Some(src2) = &mut instruction.src2 {
                self.process_source(src2);
            }
        }

        // Bail-outs leave the function and do not count as calls.
        if instruction.is_call() && instruction.bail_out.is_none() {
            self.add_call();
        }

        self.process_destination(instruction);

        if let InstructionKind::Label(info) = &mut instruction.kind {
            if !self.add_label(info) {
                trace!("Ongebruikt {} verwijderd", info.label);
                return false;
            }
        } else if let InstructionKind::Branch { target, .. } = instruction.kind {
            if self.function.has_try && !self.label_regions.contains_key(&target) {
                if let Some(region) = self.current_region {
                    self.label_regions.insert(target, region);
                }
            }
        }

        if self.helper_label.is_some() && instruction.is_branch() {
            self.pending_helper_label = self.helper_label_after(instruction, next);
            self.end_helper_block(false);
        }

        true
    }

    /// Wraps up the loops whose back edge has been reached.
    fn finish_loops(&mut self) {
        let Some(current) = self.current_loop else { return };

        let loop_end = self.result.loops[&current].end;
        if self.current_number < loop_end {
            return;
        }

        let helper_length = self.result.total_helper_length + self.current_helper_visited_length();

        let mut next = Some(current);
        while let Some(loop_id) = next {
            let Some(record) = self.result.loops.get_mut(&loop_id) else { break };
            if record.end != loop_end {
                break;
            }

            for id in &record.extended_lifetimes {
                let lifetime = &mut self.result.lifetimes[id.index()];

                if record.has_non_helper_call {
                    lifetime.is_live_across_user_calls = true;
                }

                if record.has_call {
                    lifetime.is_live_across_calls = true;
                }

                if lifetime.end == loop_end {
                    lifetime.total_op_helper_length_by_end = helper_length;
                }
            }

            record.helper_length = helper_length;
            trace!("Lus {} afgerond bij {loop_end}", loop_id.index());
            next = record.parent;
        }

        while let Some(loop_id) = self.current_loop {
            let record = &self.result.loops[&loop_id];
            if self.current_number < record.end {
                break;
            }

            self.current_loop = record.parent;
            self.loop_nest -= 1;
        }
    }

    fn use_inlinee_arguments(&mut self, mut inlinee: Option<InlineeId>) {
        while let Some(id) = inlinee {
            let frame = self.function.inlinee(id);
            if !frame.has_inline_args_opt || !frame.is_recorded {
                break;
            }

            let arguments = frame.arguments.clone();
            inlinee = frame.parent;
            self.use_registers(&arguments);
        }
    }

    fn use_registers(&mut self, registers: &[VirtualRegister]) {
        let pointer_size = self.pointer_size();
        for &register in registers {
            self.process_use(register, pointer_size);
        }
    }

    fn add_call(&mut self) {
        if self.helper_label.is_none() {
            self.last_non_helper_call = self.current_number;
            if let Some(loop_id) = self.current_loop {
                self.result.loops.get_mut(&loop_id).expect("huidige lus heeft een verslag").has_non_helper_call = true;
            }
        }

        self.last_call = self.current_number;
        if let Some(loop_id) = self.current_loop {
            self.result.loops.get_mut(&loop_id).expect("huidige lus heeft een verslag").has_call = true;
        }
    }

    fn process_source(&mut self, operand: &mut Operand) {
        match *operand {
            Operand::Register(register) => self.process_register_use(register),

            Operand::Indirect(..) => self.process_indirect(operand),

            Operand::ParameterSlot(slot) => {
                if let Some(register) = self.register_parameter(slot) {
                    *operand = Operand::Register(register);
                    self.process_register_use(register);
                }
            }

            Operand::Immediate(..) | Operand::MemoryReference(..) => (),
        }
    }

    fn process_destination(&mut self, instruction: &mut Instruction) {
        match instruction.dst {
            Some(Operand::Indirect(..)) => {
                if let Some(dst) = &mut instruction.dst {
                    self.process_indirect(dst);
                }
            }

            Some(Operand::Register(register)) if self.architecture.reads_destination(&instruction.kind) => {
                self.process_register_use(register);
            }

            Some(Operand::Register(register)) => self.process_register_def(register, instruction),

            _ => (),
        }
    }

    /// The registers of a memory operand are uses, unless the operand folds into a constant
    /// address.
    fn process_indirect(&mut self, operand: &mut Operand) {
        if fold_indirect(self.architecture, &self.function.symbols, operand) {
            trace!("Geheugenoperand op {} gevouwen tot {operand}", self.current_number);
            return;
        }

        let Operand::Indirect(indirect) = *operand else { return };
        self.process_register_use(indirect.base);

        if let Some(index) = indirect.index {
            self.process_register_use(index);
        }
    }

    /// Incoming parameters that arrive in a register are used from that register for as long
    /// as no call has clobbered it.
    fn register_parameter(&mut self, slot: ParameterSlotOperand) -> Option<RegisterOperand> {
        if self.last_call != 0 || !self.config.register_parameters {
            return None;
        }

        let physical = self.architecture.parameter_register(slot.slot, slot.implicit)?;

        if self.lifetime_id(slot.register).is_none() {
            let (number, is_label) = self.first_instruction;
            let helper_length = self.helper_visited_length(number, is_label);
            let id = self.insert_lifetime(slot.register, Some(physical), number, helper_length, slot.machine_type);
            self.result.lifetimes[id.index()].region = self.current_region;
        }

        debug!("Parameter {} komt binnen in {physical}", slot.register);

        Some(RegisterOperand {
            register: Some(slot.register),
            physical: Some(physical),
            machine_type: slot.machine_type,
        })
    }

    fn process_register_use(&mut self, operand: RegisterOperand) {
        if let Some(register) = operand.register {
            self.process_use(register, operand.machine_type.size());
        }
    }

    fn process_use(&mut self, register: VirtualRegister, usage_size: u8) {
        let Some(id) = self.lifetime_id(register) else {
            panic!("Register {register} wordt op {} gebruikt zonder definitie", self.current_number);
        };

        self.check_region(id);
        self.extend_lifetime(id);
        self.add_to_use_count(id);

        let lifetime = &mut self.result.lifetimes[id.index()];

        if lifetime.start < self.last_call {
            lifetime.is_live_across_calls = true;
        }

        if lifetime.start < self.last_non_helper_call {
            lifetime.is_live_across_user_calls = true;
        }

        lifetime.is_dead_store = false;
        lifetime.did_use_with_size(usage_size);
    }

    fn process_register_def(&mut self, operand: RegisterOperand, instruction: &Instruction) {
        if let Some(physical) = operand.physical {
            self.prefer_physical_register(physical, instruction);
        }

        let Some(register) = operand.register else { return };

        let Some(symbol) = self.function.symbols.get(register) else {
            panic!("Register {register} is niet gedeclareerd");
        };

        // Outgoing-argument slots live in the frame of the callee.
        if symbol.is_arg_slot {
            return;
        }

        match symbol.lifetime() {
            None => {
                let helper_length = self.current_helper_visited_length();
                let id = self.insert_lifetime(register, operand.physical, self.current_number, helper_length, operand.machine_type);
                self.result.lifetimes[id.index()].region = self.current_region;
                self.add_to_use_count(id);
                self.result.lifetimes[id.index()].did_use_with_size(operand.machine_type.size());
            }

            Some(id) => {
                debug_assert!(self.result.lifetimes[id.index()].start <= self.current_number, "Levensduur van {register} begint na {}", self.current_number);

                self.extend_lifetime(id);
                self.check_region(id);
                self.add_to_use_count(id);
                self.result.lifetimes[id.index()].did_use_with_size(operand.machine_type.size());
            }
        }
    }

    /// A move into a fixed register hints the allocator to put the source there as well.
    fn prefer_physical_register(&mut self, physical: PhysicalRegister, instruction: &Instruction) {
        if !matches!(instruction.kind, InstructionKind::Move) {
            return;
        }

        let Some(Operand::Register(RegisterOperand { register: Some(source), .. })) = instruction.src1 else {
            return;
        };

        if let Some(id) = self.lifetime_id(source) {
            self.result.lifetimes[id.index()].register_preference.insert(physical);
        }
    }

    fn check_region(&mut self, id: LifetimeId) {
        let lifetime = &mut self.result.lifetimes[id.index()];
        if lifetime.region != self.current_region && !self.config.optimize_try_catch {
            lifetime.dont_allocate = true;
        }
    }

    /// Stretches the lifetime to the current instruction, or over every enclosing loop on
    /// whose back edge the register is live.
    fn extend_lifetime(&mut self, id: LifetimeId) {
        let lifetime = &self.result.lifetimes[id.index()];
        let register = lifetime.register;

        let mut extended_start = lifetime.start;
        let mut extended_end = lifetime.end;
        let mut is_live_on_back_edge = false;
        let mut extended_loops = Vec::new();

        let mut next = self.current_loop;
        while let Some(loop_id) = next {
            let record = &self.result.loops[&loop_id];

            if self.function.loop_info(loop_id).live_on_back_edge.contains(&register) {
                is_live_on_back_edge = true;

                let mut added = false;
                if record.start < extended_start {
                    extended_start = record.start;
                    extended_loops.push(loop_id);
                    added = true;
                }

                if record.end > extended_end {
                    extended_end = record.end;
                    if !added {
                        extended_loops.push(loop_id);
                    }
                }
            }

            next = record.parent;
        }

        let helper_length = self.result.total_helper_length + self.current_helper_visited_length();
        let lifetime = &mut self.result.lifetimes[id.index()];

        if !is_live_on_back_edge {
            if lifetime.end < self.current_number {
                lifetime.end = self.current_number;
                lifetime.total_op_helper_length_by_end = helper_length;
            }
            return;
        }

        let mut is_extended = false;

        if lifetime.start > extended_start {
            lifetime.start = extended_start;
            is_extended = true;
        }

        // The helper length by the end is updated when the back edge is reached.
        if lifetime.end < extended_end {
            lifetime.end = extended_end;
            is_extended = true;
        }

        debug_assert!(lifetime.end > self.current_number, "Levensduur van {register} eindigt niet na {}", self.current_number);

        if is_extended {
            for loop_id in extended_loops {
                if let Some(record) = self.result.loops.get_mut(&loop_id) {
                    record.extended_lifetimes.push(id);
                }
            }
        }
    }

    fn add_to_use_count(&mut self, id: LifetimeId) {
        let cost = use_spill_cost(self.loop_nest, self.helper_label.is_some());
        let loops = self.loop_chain();
        let loop_count = self.function.loop_count();
        self.result.lifetimes[id.index()].add_to_use_count(cost, &loops, loop_count);
    }

    /// The current loop followed by its ancestors.
    #[must_use]
    fn loop_chain(&self) -> Vec<LoopId> {
        let mut loops = Vec::with_capacity(self.loop_nest as usize);
        let mut next = self.current_loop;
        while let Some(loop_id) = next {
            loops.push(loop_id);
            next = self.result.loops[&loop_id].parent;
        }
        loops
    }

    fn insert_lifetime(&mut self, register: VirtualRegister, physical: Option<PhysicalRegister>, number: u32, helper_length: u32, machine_type: MachineType) -> LifetimeId {
        let id = LifetimeId(self.result.lifetimes.len());

        let mut lifetime = RegisterLifetime::new(register, physical, number, machine_type);
        lifetime.total_op_helper_length_by_end = self.result.total_helper_length + helper_length;

        let symbol = self.function.symbols.get_mut(register);
        if self.config.debug_mode && symbol.as_ref().is_some_and(|symbol| symbol.is_non_temp_local) {
            lifetime.is_dead_store = false;
        }

        if let Some(symbol) = symbol {
            symbol.lifetime = Some(id);
        }

        let lifetimes = &self.result.lifetimes;
        let position = self.result.order.iter()
            .rposition(|other| lifetimes[other.index()].start <= number)
            .map_or(0, |position| position + 1);
        self.result.order.insert(position, id);

        self.result.by_register.insert(register, id);
        self.result.lifetimes.push(lifetime);
        id
    }

    /// Returns `false` when the label can be dropped because it neither is a branch target nor
    /// marks a switch between hot and cold code.
    fn add_label(&mut self, info: &mut LabelInfo) -> bool {
        let is_referenced = self.last_branch_to.contains_key(&info.label);
        if !is_referenced
            && info.is_helper == self.helper_label.is_some()
            && self.last_label_is_helper == Some(info.is_helper) {
            return false;
        }

        self.last_label_is_helper = Some(info.is_helper);

        self.enter_label_region(info);

        if let Some(loop_id) = info.loop_top {
            self.enter_loop(info.label, loop_id);
        }

        if self.helper_label.is_some() {
            self.end_helper_block(true);
        }

        if info.is_helper && self.config.helper_block_tracking {
            self.helper_label = Some((info.label, self.current_number));
        }

        true
    }

    fn enter_label_region(&mut self, info: &mut LabelInfo) {
        let Some(region) = info.region.or_else(|| self.label_regions.get(&info.label).copied()) else {
            info.region = self.current_region;
            if let Some(region) = self.current_region {
                self.label_regions.insert(info.label, region);
            }
            return;
        };

        info.region = Some(region);

        if let Some(current) = self.current_region.filter(|current| *current != region) {
            self.function.regions[current.index()].end = self.output.last().map(Instruction::number);
        }

        let region_info = &mut self.function.regions[region.index()];
        if region_info.start.is_none() {
            region_info.start = Some(self.current_number);
        }
        region_info.end = None;

        self.current_region = Some(region);
    }

    fn enter_loop(&mut self, label: Label, loop_id: LoopId) {
        self.loop_nest += 1;

        let end = self.last_branch_to.get(&label).copied().unwrap_or(0);
        assert!(self.current_number < end, "Lus bij {label} heeft geen terugsprong");

        // An outer loop that ends before this one is stretched, together with the lifetimes
        // that were extended up to its old end.
        let mut next = self.current_loop;
        while let Some(parent_id) = next {
            let Some(parent) = self.result.loops.get_mut(&parent_id) else { break };

            if parent.end < end {
                for id in &parent.extended_lifetimes {
                    let lifetime = &mut self.result.lifetimes[id.index()];
                    if lifetime.end == parent.end {
                        lifetime.end = end;
                    }
                }

                parent.end = end;
            }

            next = parent.parent;
        }

        trace!("Lus {} loopt van {} tot {end}", loop_id.index(), self.current_number);

        self.result.loops.insert(loop_id, LoopRecord::new(self.current_loop, self.current_number, end));
        self.current_loop = Some(loop_id);
    }

    /// Inside cold code, the fall-through of a conditional branch to other cold code is cold
    /// as well. A helper label carrying the number of the next instruction marks it. A branch
    /// from hot code into cold code gets no such label, its fall-through stays hot.
    fn helper_label_after(&mut self, branch: &Instruction, next: Option<(u32, bool)>) -> Option<Instruction> {
        let InstructionKind::Branch { target, condition: Some(..) } = branch.kind else {
            return None;
        };

        let (next_number, false) = next? else {
            return None;
        };

        if !self.helper_labels.contains(&target) {
            return None;
        }

        let mut label = Instruction::new(InstructionKind::Label(LabelInfo {
            label: self.function.create_label(),
            loop_top: None,
            is_helper: true,
            region: None,
        }));
        label.number = next_number;

        trace!("Hulpetiket ingevoegd na {}", branch.number);
        Some(label)
    }

    fn end_helper_block(&mut self, end_is_label: bool) {
        let Some((label, start)) = self.helper_label.take() else { return };

        let block = HelperBlock {
            label,
            start,
            end: self.current_number,
            end_is_label,
        };

        self.result.total_helper_length += block.length();
        self.result.helper_blocks.push(block);
    }

    #[must_use]
    fn current_helper_visited_length(&self) -> u32 {
        self.helper_visited_length(self.current_number, self.current_is_label)
    }

    /// The part of the current helper block visited up to and including the given instruction.
    #[must_use]
    fn helper_visited_length(&self, number: u32, is_label: bool) -> u32 {
        let Some((_, start)) = self.helper_label else {
            return 0;
        };

        let length = number.saturating_sub(start);
        if is_label {
            length
        } else {
            length + 1
        }
    }

    #[must_use]
    fn lifetime_id(&self, register: VirtualRegister) -> Option<LifetimeId> {
        self.function.symbols.get(register)?.lifetime()
    }

    #[must_use]
    fn pointer_size(&self) -> u8 {
        self.architecture.pointer_size() as u8
    }

    fn finish(&mut self) {
        if self.function.has_try {
            if let Some(current) = self.current_region {
                self.function.regions[current.index()].end = self.output.last().map(Instruction::number);
            }

            if !self.config.optimize_try_catch {
                self.disallow_lifetimes_escaping_their_region();
            }
        }

        debug_assert_eq!(self.loop_nest, 0, "Lusdiepte is niet teruggekeerd naar nul");

        self.function.instructions = std::mem::take(&mut self.output);
    }

    fn disallow_lifetimes_escaping_their_region(&mut self) {
        for lifetime in &mut self.result.lifetimes {
            if lifetime.dont_allocate {
                continue;
            }

            let Some(region) = lifetime.region else { continue };
            let region = &self.function.regions[region.index()];

            let escapes_start = region.start.is_some_and(|start| lifetime.start < start);
            let escapes_end = region.end.is_some_and(|end| lifetime.end > end);

            if escapes_start || escapes_end {
                debug!("{} ontsnapt aan zijn regio en wordt niet toegewezen", lifetime.register);
                lifetime.dont_allocate = true;
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct LifeAnalysisResult {
    lifetimes: Vec<RegisterLifetime>,

    /// Lifetime identifiers by increasing start at the time of creation.
    order: Vec<LifetimeId>,

    by_register: BTreeMap<VirtualRegister, LifetimeId>,
    helper_blocks: Vec<HelperBlock>,
    loops: BTreeMap<LoopId, LoopRecord>,
    total_helper_length: u32,
}

impl LifeAnalysisResult {
    /// The lifetimes in order of increasing start.
    pub fn lifetimes(&self) -> impl Iterator<Item = &RegisterLifetime> + '_ {
        self.order.iter().map(|id| &self.lifetimes[id.index()])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lifetimes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lifetimes.is_empty()
    }

    #[must_use]
    pub fn lifetime(&self, id: LifetimeId) -> &RegisterLifetime {
        &self.lifetimes[id.index()]
    }

    #[must_use]
    pub fn lifetime_of(&self, register: VirtualRegister) -> Option<&RegisterLifetime> {
        self.by_register.get(&register).map(|id| &self.lifetimes[id.index()])
    }

    /// The cold-code blocks in the order they were closed.
    #[must_use]
    pub fn helper_blocks(&self) -> &[HelperBlock] {
        &self.helper_blocks
    }

    #[must_use]
    pub fn total_helper_length(&self) -> u32 {
        self.total_helper_length
    }

    #[must_use]
    pub fn loop_record(&self, loop_id: LoopId) -> Option<&LoopRecord> {
        self.loops.get(&loop_id)
    }

    #[allow(unused)]
    pub fn dump_result(&self) {
        for lifetime in self.lifetimes() {
            debug!("Register {} leeft van {} tot {} (gebruik={})", lifetime.register, lifetime.start, lifetime.end, lifetime.use_count);
            if lifetime.is_live_across_calls {
                debug!("    en leeft over aanroepen heen (gebruikersaanroepen: {})", lifetime.is_live_across_user_calls);
            }
            if lifetime.dont_allocate {
                debug!("    en wordt niet toegewezen");
            }
            if lifetime.is_dead_store {
                debug!("    en wordt nooit gelezen");
            }
        }

        for block in &self.helper_blocks {
            debug!("Hulpblok {} van {} tot {} ({} instructies)", block.label, block.start, block.end, block.length());
        }
    }
}
