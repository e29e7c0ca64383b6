//! JSON file helpers shared by the registry and its bulk consumers

use std::{
    fs,
    io::{ErrorKind, Write},
    path::Path,
};

use serde::{de::DeserializeOwned, Serialize};
use tempfile::NamedTempFile;

use crate::errors::DeploymentsError;

/// Read and parse a JSON file, returning `None` if the file does not exist
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, DeploymentsError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(DeploymentsError::Read {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|e| DeploymentsError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Pretty-print a value to a JSON file, replacing the file atomically.
///
/// The value is written to a temporary file in the destination directory which
/// is then renamed over the destination, so readers observe either the old or
/// the new contents.
pub fn write_json_atomic<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
) -> Result<(), DeploymentsError> {
    let write_err = |reason: String| DeploymentsError::Write {
        path: path.to_path_buf(),
        reason,
    };

    let dir = parent_dir(path);
    fs::create_dir_all(dir).map_err(|e| write_err(e.to_string()))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| write_err(e.to_string()))?;
    serde_json::to_writer_pretty(&mut tmp, value).map_err(|e| write_err(e.to_string()))?;
    tmp.write_all(b"\n").map_err(|e| write_err(e.to_string()))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| write_err(e.to_string()))?;

    tmp.persist(path).map_err(|e| write_err(e.error.to_string()))?;
    Ok(())
}

/// Check that a file can be created in the directory that holds `path`
pub fn check_writable(path: &Path) -> Result<(), DeploymentsError> {
    let write_err = |reason: String| DeploymentsError::Write {
        path: path.to_path_buf(),
        reason,
    };

    let dir = parent_dir(path);
    fs::create_dir_all(dir).map_err(|e| write_err(e.to_string()))?;
    NamedTempFile::new_in(dir).map_err(|e| write_err(e.to_string()))?;

    if let Ok(metadata) = fs::metadata(path) {
        if metadata.permissions().readonly() {
            return Err(write_err("file is read-only".to_string()));
        }
    }

    Ok(())
}

/// The directory containing `path`, treating a bare file name as relative to
/// the working directory
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}
