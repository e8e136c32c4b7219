//! # Sprocket Driver
//!
//! Runs the whole pipeline for one primary unit: load the parser output,
//! lower it (with its imports) into a fresh symbol graph, compile the modules
//! to an object file, and link that with the C sources of the foreign modules
//! into a native executable.

pub mod config;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod toolchain;

pub use config::{Config, ForeignConfig, ForeignFunctionConfig, ToolchainConfig, CONFIG_FILE};
pub use error::{DriverError, Result};
pub use loader::JsonLoader;
pub use pipeline::{
    check_file, compile_file, executable_path, foreign_inputs, lower_file, object_path, BuildOutput, Options,
};
pub use toolchain::{check_platform, run_executable, Toolchain};
