use crate::ids::{NamespaceId, TypedUsageId, UsageId, ValueId};

/// An instruction input. Every operand is a recorded usage edge of its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operand {
    pub value: ValueId,
    pub usage: UsageId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstructionKind {
    Call { func: Operand, args: Vec<Operand> },
    Return { value: Operand },
    /// Reads a block-local named value, such as a parameter.
    Get { name: String, var: Operand },
    IntConstant { value: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub block: NamespaceId,
    /// Result type of the instruction.
    pub ty: TypedUsageId,
    /// Result temporary. `None` only for `Return`.
    pub to: Option<ValueId>,
    pub kind: InstructionKind,
}

impl Instruction {
    pub fn operands(&self) -> Vec<Operand> {
        match &self.kind {
            InstructionKind::Call { func, args } => {
                std::iter::once(*func).chain(args.iter().copied()).collect()
            }
            InstructionKind::Return { value } => vec![*value],
            InstructionKind::Get { var, .. } => vec![*var],
            InstructionKind::IntConstant { .. } => Vec::new(),
        }
    }
}
