use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::ids::{NamespaceId, TypeId, ValueId};
use crate::instr::Instruction;
use crate::value::DeclKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamespaceKind {
    Module,
    ForeignModule,
    Block,
}

impl fmt::Display for NamespaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamespaceKind::Module => write!(f, "module"),
            NamespaceKind::ForeignModule => write!(f, "foreign module"),
            NamespaceKind::Block => write!(f, "block"),
        }
    }
}

/// The name and type tables shared by modules and foreign modules.
#[derive(Debug, Clone, Default)]
pub struct ModuleTables {
    pub(crate) funcs: IndexMap<String, ValueId>,
    pub(crate) types: IndexMap<String, TypeId>,
}

/// A compilation unit written in Sprocket.
#[derive(Debug, Clone)]
pub struct Module {
    pub name: String,
    pub path: PathBuf,
    pub(crate) tables: ModuleTables,
}

/// A module of bodiless declarations implemented by a C source file that the
/// toolchain links in verbatim.
#[derive(Debug, Clone)]
pub struct ForeignModule {
    pub name: String,
    pub header: PathBuf,
    pub source: PathBuf,
    pub(crate) tables: ModuleTables,
}

/// A function body scope.
#[derive(Debug, Clone)]
pub struct Block {
    /// Label used in diagnostics, usually the owning function's name.
    pub label: String,
    pub(crate) parent: Option<NamespaceId>,
    pub(crate) names: IndexMap<String, ValueId>,
    pub(crate) body: Vec<Instruction>,
}

#[derive(Debug, Clone)]
pub enum Namespace {
    Module(Module),
    ForeignModule(ForeignModule),
    Block(Block),
}

impl Namespace {
    pub fn kind(&self) -> NamespaceKind {
        match self {
            Namespace::Module(_) => NamespaceKind::Module,
            Namespace::ForeignModule(_) => NamespaceKind::ForeignModule,
            Namespace::Block(_) => NamespaceKind::Block,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Namespace::Module(module) => &module.name,
            Namespace::ForeignModule(module) => &module.name,
            Namespace::Block(block) => &block.label,
        }
    }

    /// Whether a declaration of `kind` may be added to this namespace.
    pub fn accepts(&self, kind: DeclKind) -> bool {
        match self {
            Namespace::Module(_) => matches!(kind, DeclKind::FuncDecl | DeclKind::Function),
            Namespace::ForeignModule(_) => kind == DeclKind::FuncDecl,
            Namespace::Block(_) => matches!(kind, DeclKind::Param | DeclKind::Temp),
        }
    }

    pub fn is_module(&self) -> bool {
        !matches!(self, Namespace::Block(_))
    }

    pub fn is_foreign(&self) -> bool {
        matches!(self, Namespace::ForeignModule(_))
    }

    /// Path of the C source backing a foreign module.
    pub fn foreign_source(&self) -> Option<&Path> {
        match self {
            Namespace::ForeignModule(module) => Some(&module.source),
            _ => None,
        }
    }

    /// Functions of a module in declaration order. Empty for blocks.
    pub fn funcs(&self) -> impl Iterator<Item = (&str, ValueId)> + '_ {
        self.tables()
            .into_iter()
            .flat_map(|tables| tables.funcs.iter().map(|(name, id)| (name.as_str(), *id)))
    }

    pub fn types(&self) -> impl Iterator<Item = (&str, TypeId)> + '_ {
        self.tables()
            .into_iter()
            .flat_map(|tables| tables.types.iter().map(|(name, id)| (name.as_str(), *id)))
    }

    /// Block-local names (parameters and committed temporaries).
    pub fn names(&self) -> impl Iterator<Item = (&str, ValueId)> + '_ {
        let names = match self {
            Namespace::Block(block) => Some(&block.names),
            _ => None,
        };
        names
            .into_iter()
            .flat_map(|names| names.iter().map(|(name, id)| (name.as_str(), *id)))
    }

    pub fn parent(&self) -> Option<NamespaceId> {
        match self {
            Namespace::Block(block) => block.parent,
            _ => None,
        }
    }

    /// The committed instruction sequence of a block. Empty for modules.
    pub fn body(&self) -> &[Instruction] {
        match self {
            Namespace::Block(block) => &block.body,
            _ => &[],
        }
    }

    pub(crate) fn get_decl(&self, name: &str) -> Option<ValueId> {
        match self {
            Namespace::Block(block) => block.names.get(name).copied(),
            _ => self.tables().and_then(|tables| tables.funcs.get(name).copied()),
        }
    }

    pub(crate) fn get_type(&self, name: &str) -> Option<TypeId> {
        self.tables().and_then(|tables| tables.types.get(name).copied())
    }

    pub(crate) fn insert_decl(&mut self, name: String, value: ValueId) {
        match self {
            Namespace::Block(block) => {
                block.names.insert(name, value);
            }
            Namespace::Module(Module { tables, .. })
            | Namespace::ForeignModule(ForeignModule { tables, .. }) => {
                tables.funcs.insert(name, value);
            }
        }
    }

    pub(crate) fn insert_type(&mut self, name: String, ty: TypeId) {
        if let Some(tables) = self.tables_mut() {
            tables.types.insert(name, ty);
        }
    }

    fn tables(&self) -> Option<&ModuleTables> {
        match self {
            Namespace::Module(module) => Some(&module.tables),
            Namespace::ForeignModule(module) => Some(&module.tables),
            Namespace::Block(_) => None,
        }
    }

    fn tables_mut(&mut self) -> Option<&mut ModuleTables> {
        match self {
            Namespace::Module(module) => Some(&mut module.tables),
            Namespace::ForeignModule(module) => Some(&mut module.tables),
            Namespace::Block(_) => None,
        }
    }
}
