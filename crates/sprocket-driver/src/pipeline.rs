//! The compilation pipeline from a unit on disk to an executable.

use std::fs;
use std::path::{Path, PathBuf};

use sprocket_ir::Graph;
use sprocket_lower::{Compilation, ForeignSource, Lowerer, ProgramLoader};
use tempfile::TempDir;
use sprocket_native::{compile_modules, FunctionEntry, NativeError, ObjectArtifact};

use crate::config::Config;
use crate::error::{DriverError, Result};
use crate::loader::JsonLoader;
use crate::toolchain::{check_platform, Toolchain};

/// Per-invocation settings. Set fields override the config file.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Executable path, defaults to the unit path without its suffix.
    pub output: Option<PathBuf>,
    /// Config file, defaults to `sprocket.toml` next to the unit.
    pub config: Option<PathBuf>,
    /// C compiler, overriding `toolchain.compiler`.
    pub compiler: Option<String>,
    /// Keep the object file even if the config says otherwise.
    pub keep_object: bool,
}

impl Options {
    pub fn load_config(&self, unit: &Path) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::discover(unit)?,
        };
        if let Some(compiler) = &self.compiler {
            config.toolchain.compiler = compiler.clone();
        }
        config.toolchain.keep_object |= self.keep_object;
        Ok(config)
    }
}

/// Result of a successful build.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub executable: PathBuf,
    /// The object file, if it was kept.
    pub object: Option<PathBuf>,
    pub functions: Vec<FunctionEntry>,
}

/// Path of the intermediate object file: the unit with suffix `.o`.
pub fn object_path(unit: &Path) -> PathBuf {
    unit.with_extension("o")
}

/// Default executable path: the unit with its suffix stripped.
pub fn executable_path(unit: &Path) -> PathBuf {
    if unit.extension().is_some() {
        unit.with_extension("")
    } else {
        unit.with_extension("out")
    }
}

/// A temporary directory for embedded foreign sources, if any are linked.
fn scratch_dir(sources: &[ForeignSource]) -> Result<Option<TempDir>> {
    if !sources.iter().any(ForeignSource::is_embedded) {
        return Ok(None);
    }
    tempfile::Builder::new()
        .prefix("sprocket-")
        .tempdir()
        .map(Some)
        .map_err(|source| DriverError::Io {
            path: std::env::temp_dir(),
            source,
        })
}

/// Paths of the foreign C sources as handed to the compiler. Embedded
/// sources are written into `scratch`.
pub fn foreign_inputs(sources: &[ForeignSource], scratch: Option<&TempDir>) -> Result<Vec<PathBuf>> {
    let dir = scratch.map(TempDir::path).unwrap_or(Path::new("."));
    sources
        .iter()
        .map(|source| {
            source.materialize(dir).map_err(|err| DriverError::ForeignSource {
                path: source.path(),
                source: err,
            })
        })
        .collect()
}

/// Loads and lowers the unit at `path` and everything it imports into `graph`.
pub fn lower_file(graph: &mut Graph, path: &Path, config: &Config) -> Result<Compilation> {
    let mut loader = JsonLoader::new();
    let program = loader.load(path).map_err(|source| DriverError::Load {
        path: path.to_path_buf(),
        source,
    })?;
    let compilation = Lowerer::new(graph, config.registry()?, &mut loader).lower_program(&program, path)?;
    Ok(compilation)
}

/// Lowers and compiles the unit in memory, without touching the toolchain.
pub fn check_file(path: &Path, options: &Options) -> Result<ObjectArtifact> {
    let config = options.load_config(path)?;
    let mut graph = Graph::new();
    let compilation = lower_file(&mut graph, path, &config)?;
    Ok(compile_modules(&graph, &compilation.modules)?)
}

/// Builds an executable from the unit at `path`.
///
/// The object file is written next to the unit, linked together with the C
/// sources of all imported foreign modules, and deleted after a successful
/// link unless it is to be kept.
pub fn compile_file(path: &Path, options: &Options) -> Result<BuildOutput> {
    check_platform()?;
    let config = options.load_config(path)?;

    let mut graph = Graph::new();
    let compilation = lower_file(&mut graph, path, &config)?;
    let artifact = compile_modules(&graph, &compilation.modules)?;

    let object = object_path(path);
    artifact.write_to(&object).map_err(|err| match err {
        NativeError::Io(source) => DriverError::Io {
            path: object.clone(),
            source,
        },
        other => DriverError::Codegen(other),
    })?;

    let executable = options.output.clone().unwrap_or_else(|| executable_path(path));
    let scratch = scratch_dir(compilation.foreign_sources())?;
    let sources = foreign_inputs(compilation.foreign_sources(), scratch.as_ref())?;
    Toolchain::from_config(&config.toolchain).link(&object, &sources, &executable)?;
    drop(scratch);

    let object = if config.toolchain.keep_object {
        Some(object)
    } else {
        fs::remove_file(&object).map_err(|source| DriverError::Io {
            path: object.clone(),
            source,
        })?;
        None
    };

    Ok(BuildOutput {
        executable,
        object,
        functions: artifact.functions,
    })
}
