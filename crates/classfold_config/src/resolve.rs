//! Path resolution: anchoring configured paths at the project root.

use crate::types::ProjectConfig;
use std::path::{Path, PathBuf};

/// Absolute locations derived from a [`ProjectConfig`] and its project directory.
///
/// Relative paths in the configuration are resolved against the directory
/// holding `classfold.toml`; absolute paths are kept as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    /// Directory containing `classfold.toml`.
    pub project_dir: PathBuf,
    /// Directory walked for source files.
    pub scan_root: PathBuf,
    /// Change cache file.
    pub cache_file: PathBuf,
    /// Utility table consumed by the CSS compiler.
    pub utilities_file: PathBuf,
}

/// Resolves every configured path against `project_dir`.
pub fn resolve_paths(config: &ProjectConfig, project_dir: &Path) -> ResolvedPaths {
    ResolvedPaths {
        project_dir: project_dir.to_path_buf(),
        scan_root: anchor(project_dir, &config.scan.root),
        cache_file: anchor(project_dir, &config.cache.path),
        utilities_file: anchor(project_dir, &config.css.utilities),
    }
}

fn anchor(base: &Path, configured: &str) -> PathBuf {
    let p = Path::new(configured);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}
