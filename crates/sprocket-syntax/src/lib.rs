//! Syntax tree consumed by the Sprocket middle-end.
//!
//! Scanning and parsing happen outside this workspace. The external parser hands
//! over a [`Program`], usually serialized as JSON, and everything downstream
//! works on these types.

pub mod ast;
pub mod error;

pub use ast::*;
pub use error::SyntaxError;
