//! The external C toolchain.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use crate::config::ToolchainConfig;
use crate::error::{DriverError, Result};

/// Fails on hosts where executables cannot be produced.
pub fn check_platform() -> Result<()> {
    if cfg!(unix) {
        Ok(())
    } else {
        Err(DriverError::UnsupportedPlatform {
            os: std::env::consts::OS.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub compiler: String,
    pub args: Vec<String>,
}

impl Toolchain {
    pub fn new(compiler: impl Into<String>) -> Self {
        Self {
            compiler: compiler.into(),
            args: Vec::new(),
        }
    }

    pub fn from_config(config: &ToolchainConfig) -> Self {
        Self {
            compiler: config.compiler.clone(),
            args: config.args.clone(),
        }
    }

    fn command(&self, object: &Path, foreign_sources: &[PathBuf], output: &Path) -> Command {
        let mut command = Command::new(&self.compiler);
        command
            .args(&self.args)
            .arg(object)
            .args(foreign_sources)
            .arg("-o")
            .arg(output);
        command
    }

    /// Compiles the foreign sources and links them with `object` into the
    /// executable `output`, in a single compiler invocation.
    pub fn link(&self, object: &Path, foreign_sources: &[PathBuf], output: &Path) -> Result<()> {
        let mut command = self.command(object, foreign_sources, output);
        log::debug!("running {:?}", command);
        let status = command.status().map_err(|source| DriverError::ToolchainSpawn {
            compiler: self.compiler.clone(),
            source,
        })?;
        if !status.success() {
            return Err(DriverError::ToolchainFailed {
                compiler: self.compiler.clone(),
                code: status.code(),
            });
        }
        log::info!("linked executable `{}`", output.display());
        Ok(())
    }

    /// Whether the compiler can be started at all.
    pub fn is_available(&self) -> bool {
        Command::new(&self.compiler)
            .arg("--version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }
}

/// Runs a produced executable and waits for it. A non-zero exit is reported
/// through the returned status, not as an error.
pub fn run_executable(path: &Path) -> Result<ExitStatus> {
    // A bare file name would be looked up in PATH.
    let program = if path.components().count() == 1 {
        Path::new(".").join(path)
    } else {
        path.to_path_buf()
    };
    log::debug!("running `{}`", program.display());
    Command::new(&program).status().map_err(|source| DriverError::Io { path: program, source })
}
