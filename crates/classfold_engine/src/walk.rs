//! Source file discovery under the scan root.

use std::path::{Path, PathBuf};

use classfold_config::ScanConfig;

use crate::error::EngineError;

/// Discovers scanned files below `root` (recursive), sorted by path.
///
/// Directories whose name is listed in `excluded_directories` are skipped
/// entirely; files are kept when their name ends with one of `file_types`.
/// Symbolic links to directories are not followed.
pub fn discover_files(root: &Path, scan: &ScanConfig) -> Result<Vec<PathBuf>, EngineError> {
    let mut files = Vec::new();
    walk_dir(root, scan, &mut files)?;
    files.sort();
    Ok(files)
}

fn walk_dir(dir: &Path, scan: &ScanConfig, files: &mut Vec<PathBuf>) -> Result<(), EngineError> {
    let entries = std::fs::read_dir(dir).map_err(|e| EngineError::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| EngineError::io(dir, e))?;
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();
        let file_type = entry.file_type().map_err(|e| EngineError::io(&path, e))?;
        if file_type.is_dir() {
            if !scan.is_excluded(&name) {
                walk_dir(&path, scan, files)?;
            }
        } else if scan.is_scanned(&name) {
            files.push(path);
        }
    }
    Ok(())
}

/// Returns the cache key of `path`: relative to `root`, `/`-separated.
///
/// Paths outside `root` keep their full form.
pub fn file_key(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
