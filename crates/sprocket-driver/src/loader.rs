use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use sprocket_lower::{LoadError, ProgramLoader};
use sprocket_syntax::Program;

/// Reads syntax trees written by the external parser.
///
/// For a unit `foo.spng` the parser output `foo.spng.json` is preferred; when
/// it does not exist `foo.spng` itself is read as a JSON tree.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonLoader;

impl JsonLoader {
    pub fn new() -> Self {
        Self
    }

    /// The file a unit's tree is read from.
    pub fn tree_path(path: &Path) -> PathBuf {
        let mut json = OsString::from(path.as_os_str());
        json.push(".json");
        let json = PathBuf::from(json);
        if json.is_file() {
            json
        } else {
            path.to_path_buf()
        }
    }
}

impl ProgramLoader for JsonLoader {
    fn load(&mut self, path: &Path) -> Result<Program, LoadError> {
        let tree = Self::tree_path(path);
        log::trace!("reading syntax tree `{}`", tree.display());
        let text = fs::read_to_string(&tree)?;
        Ok(Program::from_json(&text)?)
    }
}
