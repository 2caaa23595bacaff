//! File output.

use std::fs;
use std::path::{Path, PathBuf};

use crate::{PipelineError, Result};

/// Writes `content` to `path` through a sibling temp file and a rename, so
/// readers never see a partially written file. Parent directories are created
/// as needed.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|source| PipelineError::Io { path: parent.to_path_buf(), source })?;
    }

    let temp_path = temp_path(path);
    if let Err(source) = fs::write(&temp_path, content) {
        let _ = fs::remove_file(&temp_path);
        return Err(PipelineError::Io { path: temp_path, source });
    }
    if let Err(source) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(PipelineError::Io { path: path.to_path_buf(), source });
    }

    tracing::info!(path = %path.display(), bytes = content.len(), "wrote file");
    Ok(())
}

/// `out.rs` becomes `out.rs.tmp`, so files differing only in extension
/// never share a temp file.
fn temp_path(path: &Path) -> PathBuf {
    match path.extension() {
        Some(ext) => {
            let mut ext = ext.to_os_string();
            ext.push(".tmp");
            path.with_extension(ext)
        }
        None => path.with_extension("tmp"),
    }
}
