//! Translation of IR functions into Cranelift IR.

pub mod func;
pub mod types;
