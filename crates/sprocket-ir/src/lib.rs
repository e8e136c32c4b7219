//! # Sprocket IR
//!
//! The symbol graph shared by the front-end lowering pass and the native
//! backend, plus the per-function [`Builder`] that fills function bodies with
//! SSA-style instructions.
//!
//! ## Key Components
//!
//! *   [`Graph`]: one arena per compilation. Owns every namespace, value, type,
//!     usage edge and the temporary-name counter.
//! *   [`Namespace`]: a `Module`, a `ForeignModule` (bodiless declarations backed
//!     by a C source file) or a `Block` (function body scope).
//! *   [`Value`]: a named declaration with exactly one static type: functions,
//!     parameters and instruction temporaries.
//! *   [`TypeDecl`]: named types registered in a namespace, and anonymous
//!     function-signature types.
//! *   [`NamedUsage`] / [`TypedUsage`]: back-reference edges. Creating one always
//!     appends it to its target's usage list, so "who uses this?" never needs
//!     a separate analysis.
//! *   [`Instruction`]: `Call`, `Return`, `Get` and `IntConstant`.

pub mod builder;
pub mod error;
pub mod graph;
pub mod ids;
pub mod instr;
pub mod namespace;
pub mod types;
pub mod value;

pub use builder::Builder;
pub use error::GraphError;
pub use graph::{Graph, Signature};
pub use ids::{NamespaceId, TypeId, TypedUsageId, UsageId, ValueId};
pub use instr::{Instruction, InstructionKind, Operand};
pub use namespace::{Namespace, NamespaceKind};
pub use types::{Primitives, TypeDecl, TypeKind, TypedUsage};
pub use value::{DeclKind, FuncDecl, NamedUsage, Value, ValueKind};
