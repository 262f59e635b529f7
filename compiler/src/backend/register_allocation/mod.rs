// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

mod helper_block;
mod indirect_folding;
mod life_analysis;
mod loop_record;
mod register_lifetime;

pub use self::{
    helper_block::HelperBlock,
    indirect_folding::fold_indirect,
    life_analysis::{LifeAnalysis, LifeAnalysisResult},
    loop_record::LoopRecord,
    register_lifetime::{LifetimeId, RegisterLifetime},
};

/// The weight of a single use at the given loop depth. Uses in cold code are free, and every
/// level of nesting makes a use eight times as expensive until the weight would no longer fit.
/// Beyond that the weight grows linearly and stops at `u32::MAX`.
#[must_use]
pub const fn use_spill_cost(loop_nest: u32, is_in_helper_block: bool) -> u32 {
    if is_in_helper_block {
        return 0;
    }

    if loop_nest < 6 {
        1 << (3 * loop_nest)
    } else {
        (1u32 << 15).saturating_mul(loop_nest - 5)
    }
}
