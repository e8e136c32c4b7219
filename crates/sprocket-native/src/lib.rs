//! # Sprocket Native
//!
//! Lowers the modules of a [`sprocket_ir::Graph`] to machine code with
//! Cranelift and packages the result as a relocatable object file for the
//! host, ready to be linked with the C sources of foreign modules.

pub mod backend;
pub mod error;
pub mod scope;
pub mod translator;

pub use backend::{compile_modules, FunctionEntry, ObjectArtifact};
pub use error::NativeError;
pub use scope::{BackendType, BackendValue, Scope, ScopeStack};
