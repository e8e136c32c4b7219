use std::path::Path;

use sprocket_driver::{compile_file, BuildOutput, Options};

use crate::error::CliError;

pub fn handle_build(file: &Path, options: &Options) -> Result<BuildOutput, CliError> {
    log::info!("building {}", file.display());
    let output = compile_file(file, options)?;
    println!("Built {}", output.executable.display());
    if let Some(object) = &output.object {
        println!("Kept object file {}", object.display());
    }
    Ok(output)
}
