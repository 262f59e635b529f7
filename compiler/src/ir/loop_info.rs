// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::collections::BTreeSet;

use super::VirtualRegister;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoopId(pub(crate) usize);

impl LoopId {
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0
    }
}

/// What the global optimizer knows about a loop before register allocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopInfo {
    /// Registers whose value flows around the back edge of the loop.
    pub live_on_back_edge: BTreeSet<VirtualRegister>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InlineeId(pub(crate) usize);

/// Frame of an inlined function.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineeFrame {
    /// `None` when the parent is the top function.
    pub parent: Option<InlineeId>,

    /// The arguments object was optimized away, so the argument registers must stay alive
    /// until the end of the inlinee.
    pub has_inline_args_opt: bool,

    pub is_recorded: bool,
    pub arguments: Vec<VirtualRegister>,
}
