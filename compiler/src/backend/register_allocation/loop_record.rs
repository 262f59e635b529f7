// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use crate::LoopId;

use super::LifetimeId;

/// What the liveness walk learned about a loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopRecord {
    pub(super) parent: Option<LoopId>,
    pub(super) start: u32,

    /// The number of the back edge. Raised to the end of a nested loop that ends later.
    pub(super) end: u32,

    /// Lifetimes stretched over this loop because they are live on its back edge.
    pub(super) extended_lifetimes: Vec<LifetimeId>,

    pub(super) has_call: bool,
    pub(super) has_non_helper_call: bool,
    pub(super) helper_length: u32,
}

impl LoopRecord {
    #[must_use]
    pub(super) const fn new(parent: Option<LoopId>, start: u32, end: u32) -> Self {
        Self {
            parent,
            start,
            end,
            extended_lifetimes: Vec::new(),
            has_call: false,
            has_non_helper_call: false,
            helper_length: 0,
        }
    }

    #[must_use]
    pub fn parent(&self) -> Option<LoopId> {
        self.parent
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
    pub fn extended_lifetimes(&self) -> &[LifetimeId] {
        &self.extended_lifetimes
    }

    #[must_use]
    pub fn has_call(&self) -> bool {
        self.has_call
    }

    #[must_use]
    pub fn has_non_helper_call(&self) -> bool {
        self.has_non_helper_call
    }

    /// Total cold code visited by the time the loop ended.
    #[must_use]
    pub fn helper_length(&self) -> u32 {
        self.helper_length
    }
}
