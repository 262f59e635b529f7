// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

mod register_allocation;

pub use self::register_allocation::{
    fold_indirect,
    use_spill_cost,
    HelperBlock,
    LifeAnalysis,
    LifeAnalysisResult,
    LifetimeId,
    LoopRecord,
    RegisterLifetime,
};
