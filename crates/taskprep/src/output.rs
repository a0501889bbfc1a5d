//! Writing the rendered document to disk.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::PrepareError;

/// Write `contents` to `path`, replacing any existing file.
///
/// Parent directories are created as needed. The contents go to a sibling
/// temporary file first and are renamed into place, so readers never see a
/// half-written document.
pub fn write_document(path: &Path, contents: &str) -> Result<(), PrepareError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|e| PrepareError::io("create directory", parent, e))?;
    }

    let tmp = temp_path(path);
    fs::write(&tmp, contents).map_err(|e| PrepareError::io("write", &tmp, e))?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(PrepareError::io("replace", path, e));
    }

    debug!(path = %path.display(), bytes = contents.len(), "document written");
    Ok(())
}

/// `dir/.name.tmp` next to `path`.
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "context".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}
