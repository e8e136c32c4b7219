//! `sprocket.toml` configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sprocket_lower::{ForeignFunction, ForeignModuleSpec, ForeignRegistry, ForeignSource, PrimitiveType};

use crate::error::{DriverError, Result};

/// File name looked up next to the primary unit.
pub const CONFIG_FILE: &str = "sprocket.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// External C toolchain settings
    #[serde(default)]
    pub toolchain: ToolchainConfig,

    /// Additional foreign modules
    #[serde(default)]
    pub foreign: Vec<ForeignConfig>,

    /// Directory relative paths are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolchainConfig {
    /// C compiler used to link the object file with foreign sources
    #[serde(default = "default_compiler")]
    pub compiler: String,

    /// Extra arguments passed before the inputs
    #[serde(default)]
    pub args: Vec<String>,

    /// Keep the intermediate object file after a successful link
    #[serde(default)]
    pub keep_object: bool,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            compiler: default_compiler(),
            args: vec![],
            keep_object: false,
        }
    }
}

pub fn default_compiler() -> String {
    "cc".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignConfig {
    /// Header name imports are matched against
    pub header: PathBuf,

    /// C source linked into the executable
    pub source: PathBuf,

    /// Module name, defaults to the header's file stem
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub functions: Vec<ForeignFunctionConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignFunctionConfig {
    pub name: String,

    #[serde(default)]
    pub params: Vec<String>,

    #[serde(default = "default_return")]
    pub ret: String,
}

fn default_return() -> String {
    "void".to_string()
}

impl Config {
    /// Parses a config whose relative paths are resolved against `base_dir`.
    pub fn from_toml(text: &str, path: &Path) -> Result<Self> {
        let mut config: Config = toml::from_str(text).map_err(|source| DriverError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| DriverError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("loaded config `{}`", path.display());
        Self::from_toml(&text, path)
    }

    /// Loads `sprocket.toml` from the directory of `unit` if it exists, or
    /// falls back to the defaults.
    pub fn discover(unit: &Path) -> Result<Self> {
        let candidate = unit.parent().unwrap_or(Path::new("")).join(CONFIG_FILE);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            log::trace!("no {} next to `{}`, using defaults", CONFIG_FILE, unit.display());
            Ok(Self::default())
        }
    }

    /// The builtin foreign modules plus those configured here.
    pub fn registry(&self) -> Result<ForeignRegistry> {
        let mut registry = ForeignRegistry::builtin();
        for foreign in &self.foreign {
            registry.register(foreign.to_spec(&self.base_dir)?);
        }
        Ok(registry)
    }
}

impl ForeignConfig {
    fn to_spec(&self, base_dir: &Path) -> Result<ForeignModuleSpec> {
        let name = self.name.clone().unwrap_or_else(|| {
            self.header
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default()
        });

        let invalid = |function: &str, ty: &str| DriverError::InvalidForeignType {
            module: name.clone(),
            function: function.to_string(),
            ty: ty.to_string(),
        };
        let mut functions = Vec::with_capacity(self.functions.len());
        for func in &self.functions {
            let params = func
                .params
                .iter()
                .map(|ty| match ty.parse::<PrimitiveType>() {
                    Ok(PrimitiveType::Int) => Ok(PrimitiveType::Int),
                    _ => Err(invalid(&func.name, ty)),
                })
                .collect::<Result<Vec<_>>>()?;
            let ret = func.ret.parse::<PrimitiveType>().map_err(|_| invalid(&func.name, &func.ret))?;
            functions.push(ForeignFunction::new(func.name.clone(), params, ret));
        }

        Ok(ForeignModuleSpec {
            name,
            header: base_dir.join(&self.header),
            source: ForeignSource::File(base_dir.join(&self.source)),
            functions,
        })
    }
}
