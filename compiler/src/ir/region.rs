// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(pub(crate) usize);

impl RegionId {
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    Root,
    Try,
    Catch,
    Finally,
}

/// An exception-handling region. `start` and `end` are instruction numbers; they are filled
/// in by the liveness walk as it enters and leaves the region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub kind: RegionKind,
    pub parent: Option<RegionId>,
    pub(crate) start: Option<u32>,
    pub(crate) end: Option<u32>,
}

impl Region {
    #[must_use]
    pub const fn new(kind: RegionKind, parent: Option<RegionId>) -> Self {
        Self {
            kind,
            parent,
            start: None,
            end: None,
        }
    }

    #[must_use]
    pub const fn start(&self) -> Option<u32> {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> Option<u32> {
        self.end
    }

    #[must_use]
    pub fn contains(&self, start: u32, end: u32) -> bool {
        match (self.start, self.end) {
            (Some(region_start), Some(region_end)) => region_start <= start && end <= region_end,
            _ => false,
        }
    }
}
