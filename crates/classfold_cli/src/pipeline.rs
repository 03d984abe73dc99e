//! Shared pipeline helpers for CLI commands.
//!
//! Contains project root resolution, configuration loading with CLI
//! overrides, and construction of a rewrite [`Engine`] from configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use classfold_cache::ChangeCache;
use classfold_config::{resolve_paths, ProjectConfig, ResolvedPaths, CONFIG_FILE};
use classfold_engine::{
    discover_files, Engine, HttpNamingStrategy, NameResolver, NamingStrategy, RunOptions,
    UtilityTable,
};

use crate::{GlobalArgs, RunArgs};

/// A loaded project: its directory, configuration and resolved paths.
pub struct Project {
    /// Configuration, after CLI overrides.
    pub config: ProjectConfig,
    /// Paths anchored at the project directory.
    pub paths: ResolvedPaths,
}

/// Walks up from `start` looking for the nearest directory containing `classfold.toml`.
///
/// Returns the directory containing `classfold.toml`, or an error if none is found.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE} in {} or any parent directory (run `classfold init`)",
                start.display()
            )
            .into());
        }
    }
}

/// Loads the project selected by the global args.
///
/// If `--config` names a file, that file is loaded and its directory is the
/// project root; if it names a directory, `classfold.toml` is read from it.
/// Otherwise walks up from the current directory looking for `classfold.toml`.
pub fn load_project(global: &GlobalArgs) -> Result<Project, Box<dyn std::error::Error>> {
    let (project_dir, config) = match global.config {
        Some(ref config_path) => {
            let p = PathBuf::from(config_path);
            if p.is_file() {
                let dir = p
                    .parent()
                    .map(|d| d.to_path_buf())
                    .unwrap_or_else(|| PathBuf::from("."));
                (dir, classfold_config::load_config_file(&p)?)
            } else {
                let config = classfold_config::load_config(&p)?;
                (p, config)
            }
        }
        None => {
            let dir = find_project_root(&std::env::current_dir()?)?;
            let config = classfold_config::load_config(&dir)?;
            (dir, config)
        }
    };

    let paths = resolve_paths(&config, &project_dir);
    Ok(Project { config, paths })
}

/// Applies `run` flags on top of the loaded configuration.
pub fn apply_overrides(config: &mut ProjectConfig, args: &RunArgs) {
    if args.order_matters {
        config.scan.order_matters = true;
    }
    if args.no_naming {
        config.naming.use_strategy = false;
    }
    if let Some(max) = args.max_invocations {
        config.naming.max_invocations = max;
    }
}

/// Discovers the files to process below the scan root.
pub fn source_files(project: &Project) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    if !project.paths.scan_root.is_dir() {
        return Err(format!(
            "scan root {} does not exist or is not a directory",
            project.paths.scan_root.display()
        )
        .into());
    }
    Ok(discover_files(&project.paths.scan_root, &project.config.scan)?)
}

/// Builds a rewrite engine from the project configuration.
pub fn build_engine(project: &Project, dry_run: bool) -> Result<Engine, Box<dyn std::error::Error>> {
    let config = &project.config;
    let utilities = UtilityTable::load(&project.paths.utilities_file)?;
    tracing::debug!(utilities = utilities.len(), "loaded utility table");

    let strategy: Option<Box<dyn NamingStrategy>> = if config.naming.use_strategy {
        let timeout = Duration::from_millis(config.naming.timeout_ms);
        Some(Box::new(HttpNamingStrategy::new(
            &config.naming.endpoint,
            timeout,
        )?))
    } else {
        None
    };
    let resolver = NameResolver::new(
        config.naming.prefix.clone(),
        config.naming.max_invocations,
        strategy,
    );

    let options = RunOptions {
        order_matters: config.scan.order_matters,
        dry_run,
    };
    Ok(Engine::new(
        &project.paths.scan_root,
        ChangeCache::load(&project.paths.cache_file),
        Box::new(utilities),
        resolver,
        options,
    ))
}
