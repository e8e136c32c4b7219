use std::path::PathBuf;

use miette::Diagnostic;
use sprocket_lower::{LoadError, LoweringError};
use sprocket_native::NativeError;
use thiserror::Error;

/// Errors surfaced by the compilation pipeline.
#[derive(Debug, Error, Diagnostic)]
pub enum DriverError {
    #[error("Failed to load `{}`", .path.display())]
    #[diagnostic(code(sprocket::driver::load))]
    Load {
        path: PathBuf,
        #[source]
        source: LoadError,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Lowering(#[from] LoweringError),

    #[error("Code generation failed: {0}")]
    #[diagnostic(code(sprocket::driver::codegen))]
    Codegen(#[from] NativeError),

    #[error("Failed to start C compiler `{compiler}`")]
    #[diagnostic(
        code(sprocket::driver::toolchain_spawn),
        help("Install a C compiler or point `toolchain.compiler` in sprocket.toml at one")
    )]
    ToolchainSpawn {
        compiler: String,
        #[source]
        source: std::io::Error,
    },

    /// The external compiler rejected the generated object or a foreign source.
    #[error("C compiler `{compiler}` failed ({})", .code.map_or("terminated by signal".to_string(), |code| format!("exit code {}", code)))]
    #[diagnostic(code(sprocket::driver::toolchain_failed))]
    ToolchainFailed { compiler: String, code: Option<i32> },

    #[error("Building executables is not supported on `{os}`")]
    #[diagnostic(code(sprocket::driver::unsupported_platform), help("Only POSIX hosts are supported"))]
    UnsupportedPlatform { os: String },

    #[error("I/O error on `{}`", .path.display())]
    #[diagnostic(code(sprocket::driver::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Foreign source `{}` is not available", .path.display())]
    #[diagnostic(
        code(sprocket::driver::foreign_source),
        help("Check the `source` paths of the `[[foreign]]` entries in sprocket.toml")
    )]
    ForeignSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read config file `{}`", .path.display())]
    #[diagnostic(code(sprocket::driver::config_read))]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file `{}`", .path.display())]
    #[diagnostic(code(sprocket::driver::config_parse))]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Foreign function `{module}.{function}` uses unsupported type `{ty}`")]
    #[diagnostic(
        code(sprocket::driver::foreign_type),
        help("Parameters must be `int`; return types may be `int` or `void`")
    )]
    InvalidForeignType {
        module: String,
        function: String,
        ty: String,
    },
}

impl DriverError {
    /// Name of the pipeline phase that failed.
    pub fn phase(&self) -> &'static str {
        match self {
            DriverError::Load { .. } | DriverError::Io { .. } | DriverError::ForeignSource { .. } => "io",
            DriverError::Lowering(_) => "lowering",
            DriverError::Codegen(_) => "codegen",
            DriverError::ToolchainSpawn { .. } | DriverError::ToolchainFailed { .. } => "toolchain",
            DriverError::UnsupportedPlatform { .. } => "platform",
            DriverError::ConfigRead { .. }
            | DriverError::ConfigParse { .. }
            | DriverError::InvalidForeignType { .. } => "config",
        }
    }

    /// Whether this is an internal compiler error rather than a problem with
    /// the program, the configuration or the host.
    pub fn is_internal(&self) -> bool {
        match self {
            DriverError::Codegen(err) => err.is_internal(),
            _ => false,
        }
    }
}

pub type Result<T, E = DriverError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phases_and_internal_errors() {
        let err = DriverError::Codegen(NativeError::UnboundType { ty: "point".into() });
        assert_eq!(err.phase(), "codegen");
        assert!(err.is_internal());

        let err = DriverError::ToolchainFailed {
            compiler: "cc".into(),
            code: Some(1),
        };
        assert_eq!(err.phase(), "toolchain");
        assert!(!err.is_internal());
        assert_eq!(err.to_string(), "C compiler `cc` failed (exit code 1)");

        let err = DriverError::UnsupportedPlatform { os: "windows".into() };
        assert_eq!(err.phase(), "platform");
    }
}
