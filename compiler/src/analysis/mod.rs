// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

mod bounds;
mod value;

pub use self::{
    bounds::*,
    value::{
        Value,
        ValueInfo,
        ValueNumber,
        ValueTable,
        ValueType,
    },
};
