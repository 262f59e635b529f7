// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use crate::{LoopId, MachineType, PhysicalRegister, RegionId, RegisterSet, VirtualRegister};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LifetimeId(pub(crate) usize);

impl LifetimeId {
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0
    }
}

/// The interval `[start, end]` of instruction numbers in which a register holds a live value,
/// and what the allocator needs to know to decide whether to keep it in a register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterLifetime {
    pub(super) register: VirtualRegister,
    pub(super) physical: Option<PhysicalRegister>,
    pub(super) start: u32,
    pub(super) end: u32,
    pub(super) region: Option<RegionId>,
    pub(super) machine_type: MachineType,

    /// Spill-cost weighted number of uses and definitions.
    pub(super) use_count: u32,
    region_use_count: Vec<u32>,

    /// Bit `n` is set when the register is accessed with a width of `n` bytes.
    pub(super) int_usage_sizes: u32,
    pub(super) register_preference: RegisterSet,

    pub(super) is_live_across_calls: bool,
    pub(super) is_live_across_user_calls: bool,
    pub(super) dont_allocate: bool,
    pub(super) is_dead_store: bool,

    /// Cold code visited up to the end of the lifetime.
    pub(super) total_op_helper_length_by_end: u32,
}

impl RegisterLifetime {
    #[must_use]
    pub(super) fn new(register: VirtualRegister, physical: Option<PhysicalRegister>, number: u32, machine_type: MachineType) -> Self {
        Self {
            register,
            physical,
            start: number,
            end: number,
            region: None,
            machine_type,
            use_count: 0,
            region_use_count: Vec::new(),
            int_usage_sizes: 0,
            register_preference: RegisterSet::default(),
            is_live_across_calls: false,
            is_live_across_user_calls: false,
            dont_allocate: false,
            is_dead_store: true,
            total_op_helper_length_by_end: 0,
        }
    }

    #[must_use]
    pub fn register(&self) -> VirtualRegister {
        self.register
    }

    /// The physical register the value starts out in, e.g. for a parameter passed in a register.
    #[must_use]
    pub fn physical_register(&self) -> Option<PhysicalRegister> {
        self.physical
    }

    #[must_use]
    pub fn start(&self) -> u32 {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> u32 {
        self.end
    }

    #[must_use]
    #[allow(unused)]
    pub fn length(&self) -> u32 {
        self.end - self.start
    }

    #[must_use]
    pub fn is_active_at(&self, number: u32) -> bool {
        (self.start..=self.end).contains(&number)
    }

    /// The region the register was first touched in.
    #[must_use]
    pub fn region(&self) -> Option<RegionId> {
        self.region
    }

    #[must_use]
    pub fn machine_type(&self) -> MachineType {
        self.machine_type
    }

    #[must_use]
    pub fn is_float(&self) -> bool {
        self.machine_type.is_float()
    }

    #[must_use]
    pub fn is_simd128(&self) -> bool {
        self.machine_type.is_simd128()
    }

    #[must_use]
    pub fn use_count(&self) -> u32 {
        self.use_count
    }

    /// Adds a weighted use in `loops`, which lists the current loop followed by its ancestors.
    /// Counts stop at `u32::MAX`.
    pub fn add_to_use_count(&mut self, cost: u32, loops: &[LoopId], loop_count: usize) {
        self.use_count = self.use_count.saturating_add(cost);

        if loops.is_empty() {
            return;
        }

        if self.region_use_count.is_empty() {
            self.region_use_count = vec![0; loop_count + 1];
        }

        for loop_id in loops {
            let count = &mut self.region_use_count[loop_id.index()];
            *count = count.saturating_add(cost);
        }
    }

    pub fn sub_from_use_count(&mut self, cost: u32, loops: &[LoopId]) {
        debug_assert!(self.use_count >= cost, "gebruiksaantal wordt negatief");
        self.use_count = self.use_count.saturating_sub(cost);
        debug_assert!(loops.is_empty() || !self.region_use_count.is_empty());

        for loop_id in loops {
            let count = &mut self.region_use_count[loop_id.index()];
            *count = count.saturating_sub(cost);
        }
    }

    /// The use count within `loop_id`, or the total use count outside of loops.
    #[must_use]
    pub fn region_use_count(&self, loop_id: Option<LoopId>) -> u32 {
        match loop_id {
            Some(loop_id) => self.region_use_count.get(loop_id.index()).copied().unwrap_or(0),
            None => self.use_count,
        }
    }

    pub(super) fn did_use_with_size(&mut self, size: u8) {
        self.int_usage_sizes |= 1 << size;
    }

    #[must_use]
    pub fn is_used_with_size(&self, size: u8) -> bool {
        self.int_usage_sizes & (1 << size) != 0
    }

    #[must_use]
    pub fn register_preference(&self) -> RegisterSet {
        self.register_preference
    }

    #[must_use]
    pub fn is_live_across_calls(&self) -> bool {
        self.is_live_across_calls
    }

    /// Live across a call outside of cold code.
    #[must_use]
    pub fn is_live_across_user_calls(&self) -> bool {
        self.is_live_across_user_calls
    }

    #[must_use]
    pub fn dont_allocate(&self) -> bool {
        self.dont_allocate
    }

    #[must_use]
    pub fn is_dead_store(&self) -> bool {
        self.is_dead_store
    }

    #[must_use]
    pub fn total_op_helper_length_by_end(&self) -> u32 {
        self.total_op_helper_length_by_end
    }
}
