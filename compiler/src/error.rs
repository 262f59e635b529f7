// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use thiserror::Error;

use crate::{Label, VirtualRegister};

type TomlError = toml::de::Error;

pub type StroomResult<T> = core::result::Result<T, StroomError>;

#[derive(Debug, Error)]
pub enum StroomError {
    #[error("ongeldige configuratie: {0}")]
    InvalidConfig(TomlError),

    #[error("ongeldige IR: {0}")]
    InvalidIr(IrError),
}

impl From<TomlError> for StroomError {
    fn from(value: TomlError) -> Self {
        Self::InvalidConfig(value)
    }
}

impl From<IrError> for StroomError {
    fn from(value: IrError) -> Self {
        Self::InvalidIr(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IrError {
    #[error("instructie {index} heeft geen nummer")]
    UnnumberedInstruction { index: usize },

    #[error("instructie {index} heeft nummer {current}, maar de vorige had {previous}")]
    NonMonotonicNumbering { index: usize, previous: u32, current: u32 },

    #[error("{label} is meerdere keren geplaatst")]
    DuplicateLabel { label: Label },

    #[error("sprong naar onbekend etiket {label}")]
    UnknownBranchTarget { label: Label },

    #[error("lusbegin {label} heeft geen terugsprong")]
    LoopTopWithoutBackEdge { label: Label },

    #[error("lusbegin {label} verwijst naar een onbekende lus")]
    UnknownLoop { label: Label },

    #[error("onbekende regio {region}")]
    UnknownRegion { region: usize },

    #[error("register {register} is niet gedeclareerd")]
    UnknownRegister { register: VirtualRegister },
}
