use miette::Diagnostic;
use sprocket_driver::DriverError;
use thiserror::Error;

/// CLI-level error, separating compiler bugs and toolchain rejections from
/// ordinary diagnostics.
#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("internal compiler error")]
    #[diagnostic(
        code(sprocket::cli::internal),
        help("This is a bug in the Sprocket compiler, not in your program")
    )]
    Internal(#[source] DriverError),

    #[error("the C compiler rejected the generated code")]
    #[diagnostic(code(sprocket::cli::toolchain))]
    Toolchain(#[source] DriverError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Driver(DriverError),
}

impl From<DriverError> for CliError {
    fn from(error: DriverError) -> Self {
        if error.is_internal() {
            CliError::Internal(error)
        } else if matches!(error, DriverError::ToolchainFailed { .. }) {
            CliError::Toolchain(error)
        } else {
            CliError::Driver(error)
        }
    }
}
