use std::path::Path;

use sprocket_driver::{run_executable, Options};

use crate::commands::build::handle_build;
use crate::error::CliError;

/// Builds and runs the program, returning its exit code.
pub fn handle_run(file: &Path, options: &Options) -> Result<i32, CliError> {
    let output = handle_build(file, options)?;
    let status = run_executable(&output.executable)?;
    if !status.success() {
        log::info!("program exited with {}", status);
    }
    // Killed by a signal: report a generic failure.
    Ok(status.code().unwrap_or(1))
}
