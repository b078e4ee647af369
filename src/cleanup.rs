//! Removal of leftover edit intermediates.

use crate::Result;
use std::path::{Path, PathBuf};
use tracing::info;

const INTERMEDIATE_MARKER: &str = "-edit.";

/// True when the first `-edit.` in `name` is not at the very start.
pub fn is_intermediate(name: &str) -> bool {
    matches!(name.find(INTERMEDIATE_MARKER), Some(idx) if idx > 0)
}

/// Delete every intermediate file directly inside `dir`.
pub fn cleanup_intermediates(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for entry in std::fs::read_dir(dir.as_ref())? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if is_intermediate(name) {
            let path = entry.path();
            std::fs::remove_file(&path)?;
            info!(path = %path.display(), "removed intermediate");
            removed.push(path);
        }
    }
    removed.sort();
    Ok(removed)
}
