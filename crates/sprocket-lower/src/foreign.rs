//! Registry of foreign modules importable through C headers.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use indexmap::IndexMap;
use miette::SourceSpan;
use sprocket_ir::{Graph, NamespaceId, Primitives, Signature, TypeId};

use crate::error::{GraphResultExt, Result};

/// A C file shipped inside the compiler binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddedFile {
    pub name: &'static str,
    pub contents: &'static str,
}

const TEST_H: EmbeddedFile = EmbeddedFile {
    name: "test.h",
    contents: include_str!("../std/test.h"),
};

const TEST_C: EmbeddedFile = EmbeddedFile {
    name: "test.c",
    contents: include_str!("../std/test.c"),
};

/// Where the C code of a foreign module comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForeignSource {
    /// A C file on disk, handed to the compiler in place.
    File(PathBuf),
    /// A source and the header it includes, both embedded in the compiler.
    /// They only exist on disk once [`ForeignSource::materialize`] wrote them.
    Embedded { source: EmbeddedFile, header: EmbeddedFile },
}

impl ForeignSource {
    /// Path recorded in the graph: the file itself, or the bare file name of
    /// an embedded source.
    pub fn path(&self) -> PathBuf {
        match self {
            ForeignSource::File(path) => path.clone(),
            ForeignSource::Embedded { source, .. } => PathBuf::from(source.name),
        }
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self, ForeignSource::Embedded { .. })
    }

    /// Returns a path the C compiler can read. Embedded files are written
    /// into `scratch` first; on-disk files must exist.
    pub fn materialize(&self, scratch: &Path) -> io::Result<PathBuf> {
        match self {
            ForeignSource::File(path) => {
                fs::metadata(path)?;
                Ok(path.clone())
            }
            ForeignSource::Embedded { source, header } => {
                fs::write(scratch.join(header.name), header.contents)?;
                let path = scratch.join(source.name);
                fs::write(&path, source.contents)?;
                Ok(path)
            }
        }
    }
}

impl From<PathBuf> for ForeignSource {
    fn from(path: PathBuf) -> Self {
        ForeignSource::File(path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Int,
    Void,
}

impl PrimitiveType {
    pub fn resolve(self, prims: Primitives) -> TypeId {
        match self {
            PrimitiveType::Int => prims.int,
            PrimitiveType::Void => prims.void,
        }
    }
}

impl FromStr for PrimitiveType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int" => Ok(PrimitiveType::Int),
            "void" => Ok(PrimitiveType::Void),
            other => Err(format!("unknown primitive type `{}`", other)),
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveType::Int => write!(f, "int"),
            PrimitiveType::Void => write!(f, "void"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignFunction {
    pub name: String,
    pub params: Vec<PrimitiveType>,
    pub ret: PrimitiveType,
}

impl ForeignFunction {
    pub fn new(name: impl Into<String>, params: Vec<PrimitiveType>, ret: PrimitiveType) -> Self {
        Self {
            name: name.into(),
            params,
            ret,
        }
    }
}

/// Description of a foreign module: the header used as lookup key, the C
/// source handed to the linker, and the declarations it provides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignModuleSpec {
    pub name: String,
    pub header: PathBuf,
    pub source: ForeignSource,
    pub functions: Vec<ForeignFunction>,
}

impl ForeignModuleSpec {
    /// File name of the header, the key imports are matched against.
    pub fn key(&self) -> String {
        header_key(&self.header)
    }

    /// Creates the module in `graph` and declares all of its functions.
    /// Errors are attributed to `span`, the import that pulled the module in.
    pub(crate) fn instantiate(&self, graph: &mut Graph, span: SourceSpan) -> Result<NamespaceId> {
        let prims = graph.primitives();
        let module = graph.add_foreign_module(self.name.clone(), self.header.clone(), self.source.path());
        for func in &self.functions {
            let params = func
                .params
                .iter()
                .enumerate()
                .map(|(index, ty)| (format!("arg{}", index), ty.resolve(prims)))
                .collect();
            let sig = Signature::new(func.name.clone(), params, func.ret.resolve(prims));
            graph.declare_func_decl(module, &sig).at(span)?;
        }
        log::debug!(
            "instantiated foreign module `{}` ({} functions)",
            self.name,
            self.functions.len()
        );
        Ok(module)
    }
}

fn header_key(header: &Path) -> String {
    header
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Foreign modules known to a compilation, keyed by header file name.
#[derive(Debug, Clone, Default)]
pub struct ForeignRegistry {
    modules: IndexMap<String, ForeignModuleSpec>,
}

impl ForeignRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry every compilation starts from: `test.h` maps to the
    /// `builtins` module exposing `test: () -> void`.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(ForeignModuleSpec {
            name: "builtins".to_string(),
            header: PathBuf::from(TEST_H.name),
            source: ForeignSource::Embedded {
                source: TEST_C,
                header: TEST_H,
            },
            functions: vec![ForeignFunction::new("test", vec![], PrimitiveType::Void)],
        });
        registry
    }

    /// Adds `spec`, replacing any module registered under the same header.
    pub fn register(&mut self, spec: ForeignModuleSpec) {
        self.modules.insert(spec.key(), spec);
    }

    /// Finds the module an import path refers to, matching by file name.
    pub fn lookup(&self, import: &str) -> Option<&ForeignModuleSpec> {
        self.modules.get(&header_key(Path::new(import)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ForeignModuleSpec> {
        self.modules.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_maps_test_header() {
        let registry = ForeignRegistry::builtin();
        let spec = registry.lookup("test.h").expect("builtin header");
        assert_eq!(spec.name, "builtins");
        assert!(spec.source.is_embedded());
        assert_eq!(spec.source.path(), PathBuf::from("test.c"));
        assert_eq!(spec.functions, vec![ForeignFunction::new("test", vec![], PrimitiveType::Void)]);
        // Directories in the import path are ignored.
        assert!(registry.lookup("include/test.h").is_some());
        assert!(registry.lookup("stdio.h").is_none());
    }

    #[test]
    fn test_register_replaces_same_header() {
        let mut registry = ForeignRegistry::builtin();
        registry.register(ForeignModuleSpec {
            name: "mytest".to_string(),
            header: PathBuf::from("vendor/test.h"),
            source: PathBuf::from("vendor/test.c").into(),
            functions: vec![ForeignFunction::new("answer", vec![], PrimitiveType::Int)],
        });
        assert_eq!(registry.iter().count(), 1);
        assert_eq!(registry.lookup("test.h").map(|spec| spec.name.as_str()), Some("mytest"));
    }

    #[test]
    fn test_primitive_type_parsing() {
        assert_eq!("int".parse::<PrimitiveType>(), Ok(PrimitiveType::Int));
        assert_eq!("void".parse::<PrimitiveType>(), Ok(PrimitiveType::Void));
        assert!("float".parse::<PrimitiveType>().is_err());
    }

    #[test]
    fn test_instantiate_declares_bodiless_functions() {
        let mut graph = Graph::new();
        let spec = ForeignRegistry::builtin().lookup("test.h").cloned().unwrap();
        let module = spec.instantiate(&mut graph, SourceSpan::from(0..0)).unwrap();

        let ns = graph.namespace(module);
        assert!(ns.is_foreign());
        let test = graph.lookup(module, "test").unwrap();
        assert!(graph.func(test).unwrap().body.is_none());
        let void = graph.primitives().void;
        assert_eq!(graph.function_signature(graph.value_type(test)), Some((vec![], void)));
    }

    #[test]
    fn test_embedded_sources_are_written_out() {
        let scratch = tempfile::tempdir().unwrap();
        let registry = ForeignRegistry::builtin();
        let spec = registry.lookup("test.h").unwrap();

        let path = spec.source.materialize(scratch.path()).unwrap();
        assert_eq!(path, scratch.path().join("test.c"));
        let source = fs::read_to_string(&path).unwrap();
        assert!(source.contains("#include \"test.h\""));
        let header = fs::read_to_string(scratch.path().join("test.h")).unwrap();
        assert!(header.contains("void test(void);"));
    }

    #[test]
    fn test_missing_source_file_is_reported() {
        let scratch = tempfile::tempdir().unwrap();
        let source = ForeignSource::File(scratch.path().join("gone.c"));
        let err = source.materialize(scratch.path()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
