//! Lowering of syntax trees into the symbol graph.
//!
//! Each unit is lowered in two phases. The signature phase resolves imports
//! and registers every function of the unit in its module; the body phase then
//! fills each function's block through a [`sprocket_ir::Builder`]. Because all
//! signatures exist before any body is lowered, functions may call functions
//! defined further down the file, and themselves.

mod expr;
mod items;
mod types;

use std::path::{Component, Path, PathBuf};

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use sprocket_ir::{Graph, NamespaceId};
use sprocket_syntax::Program;

use crate::error::Result;
use crate::foreign::{ForeignRegistry, ForeignSource};
use crate::loader::ProgramLoader;

pub use types::{resolve_return_type, resolve_type};

/// The modules produced by lowering one primary unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compilation {
    /// The module of the unit passed to [`Lowerer::lower_program`].
    pub primary: NamespaceId,
    /// Primary module first, then imported units, then foreign modules, each
    /// group in first-import order.
    pub modules: Vec<NamespaceId>,
    /// C sources of the foreign modules, in module order.
    pub foreign: Vec<ForeignSource>,
}

impl Compilation {
    pub fn foreign_sources(&self) -> &[ForeignSource] {
        &self.foreign
    }
}

/// Drives lowering of a primary unit and everything it imports.
pub struct Lowerer<'a> {
    graph: &'a mut Graph,
    registry: ForeignRegistry,
    loader: &'a mut dyn ProgramLoader,
    /// Units lowered completely, by path.
    units: FxHashMap<PathBuf, NamespaceId>,
    /// Units whose lowering is in progress, outermost first.
    stack: Vec<PathBuf>,
    modules: Vec<NamespaceId>,
    /// Foreign modules instantiated so far, by header key.
    foreign: IndexMap<String, (NamespaceId, ForeignSource)>,
}

impl<'a> Lowerer<'a> {
    pub fn new(graph: &'a mut Graph, registry: ForeignRegistry, loader: &'a mut dyn ProgramLoader) -> Self {
        Self {
            graph,
            registry,
            loader,
            units: FxHashMap::default(),
            stack: Vec::new(),
            modules: Vec::new(),
            foreign: IndexMap::new(),
        }
    }

    /// Lowers `program`, the unit stored at `path`, with all of its imports.
    ///
    /// The first error aborts the whole compilation.
    pub fn lower_program(mut self, program: &Program, path: impl AsRef<Path>) -> Result<Compilation> {
        let path = normalize(path.as_ref());
        log::debug!("lowering primary unit `{}`", path.display());
        let primary = self.lower_unit(program, &path)?;

        let mut modules = self.modules;
        let mut foreign = Vec::with_capacity(self.foreign.len());
        for (module, source) in self.foreign.into_values() {
            modules.push(module);
            foreign.push(source);
        }
        log::debug!("lowered {} module(s)", modules.len());
        Ok(Compilation {
            primary,
            modules,
            foreign,
        })
    }
}

/// Module name of the unit at `path`: its file stem.
pub(crate) fn unit_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Lexically removes `.` and resolvable `..` components, so that one unit
/// reached through different relative paths is recognized as the same unit.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("./a/b/../c.spng")), PathBuf::from("a/c.spng"));
        assert_eq!(normalize(Path::new("../x.spng")), PathBuf::from("../x.spng"));
        assert_eq!(normalize(Path::new("/src/./main.spng")), PathBuf::from("/src/main.spng"));
    }

    #[test]
    fn test_unit_name_is_file_stem() {
        assert_eq!(unit_name(Path::new("dir/util.spng")), "util");
    }
}
