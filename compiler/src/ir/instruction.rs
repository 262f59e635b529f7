// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::fmt::{Display, Write};

use super::{BailOutInfo, BailOutKind, InlineeId, LoopId, Operand, RegionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label {
    pub(super) id: usize,
}

#[cfg(test)]
impl Label {
    #[must_use]
    pub fn new(id: usize) -> Self {
        Self { id }
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Etiket")?;
        self.id.fmt(f)
    }
}

impl Label {
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelInfo {
    pub label: Label,

    /// Set for the first label of a loop; the loop's back edge is the highest-numbered branch
    /// that targets this label.
    pub loop_top: Option<LoopId>,

    /// Cold code (helper calls, bail-out paths).
    pub is_helper: bool,

    pub region: Option<RegionId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InstructionKind {
    Label(LabelInfo),

    Branch {
        target: Label,
        condition: Option<JumpCondition>,
    },

    /// A jump table.
    MultiBranch {
        targets: Vec<Label>,
    },

    Call,

    /// Plain register-to-register assignment.
    Move,

    /// `dst = shuffle(dst, src1, imm)`: the destination is also read.
    Shuffle,

    MathOperation(MathOperation),

    /// Checks `src1 <= src2 + dst`, where the missing `dst` means an offset of zero.
    BoundCheck {
        bail_out_kind: BailOutKind,
    },

    /// End of an inlined function body.
    InlineeEnd,

    Return,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub(crate) number: u32,
    pub kind: InstructionKind,
    pub dst: Option<Operand>,
    pub src1: Option<Operand>,
    pub src2: Option<Operand>,
    pub bail_out: Option<BailOutInfo>,

    /// The inlined function this instruction belongs to, or `None` for the top function.
    pub inlinee: Option<InlineeId>,
}

impl Instruction {
    #[must_use]
    pub const fn new(kind: InstructionKind) -> Self {
        Self {
            number: 0,
            kind,
            dst: None,
            src1: None,
            src2: None,
            bail_out: None,
            inlinee: None,
        }
    }

    #[must_use]
    pub fn with_dst(mut self, dst: impl Into<Operand>) -> Self {
        self.dst = Some(dst.into());
        self
    }

    #[must_use]
    pub fn with_src1(mut self, src1: impl Into<Operand>) -> Self {
        self.src1 = Some(src1.into());
        self
    }

    #[must_use]
    pub fn with_src2(mut self, src2: impl Into<Operand>) -> Self {
        self.src2 = Some(src2.into());
        self
    }

    #[must_use]
    pub const fn number(&self) -> u32 {
        self.number
    }

    #[must_use]
    pub const fn is_label(&self) -> bool {
        matches!(self.kind, InstructionKind::Label(..))
    }

    #[must_use]
    pub const fn as_label(&self) -> Option<&LabelInfo> {
        match &self.kind {
            InstructionKind::Label(info) => Some(info),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_call(&self) -> bool {
        matches!(self.kind, InstructionKind::Call)
    }

    #[must_use]
    pub const fn is_branch(&self) -> bool {
        matches!(self.kind, InstructionKind::Branch { .. } | InstructionKind::MultiBranch { .. })
    }

    /// Labels targeted by this instruction, if it is a branch.
    #[must_use]
    pub fn branch_targets(&self) -> &[Label] {
        match &self.kind {
            InstructionKind::Branch { target, .. } => std::slice::from_ref(target),
            InstructionKind::MultiBranch { targets } => targets,
            _ => &[],
        }
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            InstructionKind::Label(info) => {
                info.label.fmt(f)?;
                f.write_char(':')?;
                if info.is_helper {
                    f.write_str(" [helper]")?;
                }
                if let Some(loop_id) = info.loop_top {
                    write!(f, " [lus {}]", loop_id.index())?;
                }
                return Ok(());
            }

            InstructionKind::Branch { target, condition: None } => {
                f.write_str("Spring ")?;
                return target.fmt(f);
            }

            InstructionKind::Branch { target, condition: Some(condition) } => {
                write!(f, "SpringBij{condition} {target}")?;
            }

            InstructionKind::MultiBranch { targets } => {
                f.write_str("SpringTabel")?;
                for (idx, target) in targets.iter().enumerate() {
                    f.write_str(if idx == 0 { " " } else { ", " })?;
                    target.fmt(f)?;
                }
            }

            InstructionKind::Call => f.write_str("RoepAan")?,
            InstructionKind::Move => f.write_str("Verplaats")?,
            InstructionKind::Shuffle => f.write_str("Schud")?,
            InstructionKind::MathOperation(operation) => operation.fmt(f)?,
            InstructionKind::BoundCheck { .. } => f.write_str("GrensControle")?,
            InstructionKind::InlineeEnd => f.write_str("EindeIngevoegd")?,
            InstructionKind::Return => f.write_str("Bekeer")?,
        }

        let mut first = true;
        for operand in [&self.dst, &self.src1, &self.src2].into_iter().flatten() {
            f.write_str(if first { " " } else { ", " })?;
            operand.fmt(f)?;
            first = false;
        }

        if let Some(bail_out) = &self.bail_out {
            write!(f, " (bail-out {})", bail_out.kind)?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpCondition {
    /// Jump if lhs == rhs
    Equal,

    /// Jump if lhs > rhs
    Greater,

    /// Jump if lhs >= rhs
    GreaterOrEqual,

    /// Jump if lhs < rhs
    Less,

    /// Jump if lhs <= rhs
    LessOrEqual,

    /// Jump if lhs != rhs
    NotEqual,
}

impl JumpCondition {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Equal => "Gelijk",
            Self::Greater => "Groter",
            Self::GreaterOrEqual => "GroterOfGelijk",
            Self::Less => "Kleiner",
            Self::LessOrEqual => "KleinerOfGelijk",
            Self::NotEqual => "Ongelijk",
        }
    }
}

impl Display for JumpCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathOperation {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    LeftShift,
    RightShift,
}

impl MathOperation {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Add => "TelOp",
            Self::Subtract => "TrekAf",
            Self::Multiply => "Vermenigvuldig",
            Self::Divide => "DeelDoor",
            Self::Modulo => "Modulo",
            Self::LeftShift => "SchuifLinks",
            Self::RightShift => "SchuifRechts",
        }
    }
}

impl Display for MathOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.name().fmt(f)
    }
}
