//! Loading of imported compilation units.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use sprocket_syntax::{Program, SyntaxError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("no such unit")]
    NotFound,
}

/// Produces the syntax tree of a unit named by an import.
///
/// Parsing itself happens outside the compiler; a loader only knows where the
/// parser's output for a given unit path lives.
pub trait ProgramLoader {
    fn load(&mut self, path: &Path) -> Result<Program, LoadError>;
}

/// A loader serving trees that are already in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryLoader {
    units: FxHashMap<PathBuf, Program>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, program: Program) {
        self.units.insert(path.into(), program);
    }

    pub fn with(mut self, path: impl Into<PathBuf>, program: Program) -> Self {
        self.insert(path, program);
        self
    }
}

impl ProgramLoader for MemoryLoader {
    fn load(&mut self, path: &Path) -> Result<Program, LoadError> {
        self.units.get(path).cloned().ok_or(LoadError::NotFound)
    }
}
