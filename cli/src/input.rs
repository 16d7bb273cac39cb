//! Argument and file helpers kept apart from the HTTP commands.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use intake::FilePart;
use serde_json::Value;

use crate::CliError;

/// Read a JSON document from `--data`, or from `--input` (`-` for stdin).
pub fn read_json(data: Option<&str>, input: Option<&str>) -> Result<Value, CliError> {
    let text = match (data, input) {
        (Some(data), _) => data.to_owned(),
        (None, Some("-")) => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|source| CliError::Io { path: "-".to_owned(), source })?;
            buf
        }
        (None, Some(path)) => {
            fs::read_to_string(path).map_err(|source| CliError::Io { path: path.to_owned(), source })?
        }
        (None, None) => return Err(CliError::MissingInput),
    };
    Ok(serde_json::from_str(text.trim())?)
}

/// Load a file for upload, guessing its content type from the extension
/// unless one is given.
pub fn load_file_part(path: &Path, content_type: Option<String>) -> Result<FilePart, CliError> {
    let bytes = fs::read(path).map_err(|source| CliError::Io { path: path.display().to_string(), source })?;
    let file_name = path
        .file_name()
        .map_or_else(|| "upload".to_owned(), |name| name.to_string_lossy().into_owned());
    let content_type = content_type.or_else(|| guess_content_type(path).map(ToOwned::to_owned));
    Ok(FilePart { file_name, content_type, bytes })
}

/// Content type registered for the file extension, matched case-insensitively.
pub fn guess_content_type(path: &Path) -> Option<&'static str> {
    mime_guess::from_path(path).first_raw()
}

pub fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
