// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use crate::Label;

/// A run of cold code, from a helper label up to the instruction that left it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelperBlock {
    pub(super) label: Label,
    pub(super) start: u32,
    pub(super) end: u32,
    pub(super) end_is_label: bool,
}

impl HelperBlock {
    #[must_use]
    pub fn label(&self) -> Label {
        self.label
    }

    #[must_use]
    pub fn start(&self) -> u32 {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> u32 {
        self.end
    }

    /// The number of instructions in the block. A label that ends the block is not part of it.
    #[must_use]
    pub fn length(&self) -> u32 {
        let length = self.end - self.start;
        if self.end_is_label {
            length
        } else {
            length + 1
        }
    }
}
