//! # Sprocket Lowering
//!
//! Turns syntax trees into the symbol graph of [`sprocket_ir`].
//!
//! A [`Lowerer`] owns one compilation's view of the world: the
//! [`ForeignRegistry`] consulted for `.h` imports and the [`ProgramLoader`]
//! that produces the trees of imported `.spng` units. Lowering the primary
//! unit yields a [`Compilation`] listing every module the backend must compile.

pub mod error;
pub mod foreign;
pub mod loader;
pub mod lower;

pub use error::{LoweringError, Result};
pub use foreign::{EmbeddedFile, ForeignFunction, ForeignModuleSpec, ForeignRegistry, ForeignSource, PrimitiveType};
pub use loader::{LoadError, MemoryLoader, ProgramLoader};
pub use lower::{Compilation, Lowerer};
