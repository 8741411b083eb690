//! Finding script files on disk.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

pub const SCRIPT_EXTENSION: &str = "svnm";

/// Every `.svnm` file under `root`, recursively, in file-name order at each
/// directory level. A `root` that names a file is returned as given.
///
/// # Errors
/// Fails when `root` or a directory below it cannot be read.
pub fn script_files(root: &Path) -> Result<Vec<PathBuf>, walkdir::Error> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.depth() == 0 || entry.path().extension().is_some_and(|ext| ext == SCRIPT_EXTENSION) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
