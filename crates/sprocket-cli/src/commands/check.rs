use std::path::Path;

use sprocket_driver::{check_file, Options};

use crate::error::CliError;

pub fn handle_check(file: &Path, options: &Options) -> Result<(), CliError> {
    let artifact = check_file(file, options)?;
    println!(
        "{}: ok ({} defined, {} foreign)",
        file.display(),
        artifact.defined().count(),
        artifact.declared().count()
    );
    Ok(())
}
