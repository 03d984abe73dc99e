//! `classfold init`: project scaffolding command.
//!
//! Writes a `classfold.toml` with every setting at its default, an example
//! `utilities.json` utility table, and the `src/` scan root.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use classfold_config::CONFIG_FILE;

use crate::GlobalArgs;

const UTILITIES_FILE: &str = "utilities.json";

/// Runs the `classfold init` command.
///
/// Initializes `dir` (created if missing) or the current working directory.
/// Refuses to overwrite an existing `classfold.toml`. Returns exit code 0 on success.
pub fn run(dir: Option<String>, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = match dir {
        Some(d) => PathBuf::from(d),
        None => std::env::current_dir()?,
    };
    if project_dir.join(CONFIG_FILE).exists() {
        return Err(format!(
            "{} already exists in '{}'",
            CONFIG_FILE,
            project_dir.display()
        )
        .into());
    }
    fs::create_dir_all(project_dir.join("src"))?;

    if !global.quiet {
        eprintln!("  Initializing classfold in {}", project_dir.display());
    }

    write_config(&project_dir)?;
    let wrote_utilities = write_utilities(&project_dir)?;

    if !global.quiet {
        eprintln!("     Created {}", project_dir.join(CONFIG_FILE).display());
        if wrote_utilities {
            eprintln!("     Created {}", project_dir.join(UTILITIES_FILE).display());
        }
    }

    Ok(0)
}

/// Writes `classfold.toml` with the default settings spelled out.
fn write_config(root: &Path) -> io::Result<()> {
    let content = r#"[scan]
# Directory walked for source files, relative to this file.
root = "src"
file_types = [".astro", ".tsx", ".jsx", ".vue", ".html"]
excluded_directories = ["node_modules", ".git", "dist"]
# When true, "p-4 flex" and "flex p-4" get different names.
order_matters = false

[naming]
prefix = "twk-"
# Ask a text-completion endpoint for readable names instead of hashes.
use_strategy = false
endpoint = "http://localhost:8787"
max_invocations = 999
timeout_ms = 10000

[css]
# Utility class -> CSS declarations.
utilities = "utilities.json"

[cache]
path = "classfold.lock"
"#;
    fs::write(root.join(CONFIG_FILE), content)
}

/// Writes an example utility table unless one is already present.
fn write_utilities(root: &Path) -> io::Result<bool> {
    let path = root.join(UTILITIES_FILE);
    if path.exists() {
        return Ok(false);
    }
    let content = r##"{
  "flex": "display: flex;",
  "items-center": "align-items: center;",
  "p-4": "padding: 1rem;",
  "mt-2": "margin-top: 0.5rem;",
  "rounded": "border-radius: 0.25rem;",
  "font-semibold": "font-weight: 600;",
  "text-sm": "font-size: 0.875rem; line-height: 1.25rem;",
  "text-gray-600": "color: #4b5563;",
  "bg-red-500": "background-color: #ef4444;"
}
"##;
    fs::write(path, content)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use classfold_config::ProjectConfig;
    use classfold_engine::{CssCompiler, UtilityTable};
    use tempfile::TempDir;

    fn quiet() -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            config: None,
        }
    }

    #[test]
    fn init_creates_config_and_layout() {
        let tmp = TempDir::new().unwrap();
        let project_dir = tmp.path().join("site");
        run(Some(project_dir.to_string_lossy().into_owned()), &quiet()).unwrap();

        assert!(project_dir.join(CONFIG_FILE).exists());
        assert!(project_dir.join(UTILITIES_FILE).exists());
        assert!(project_dir.join("src").is_dir());
    }

    #[test]
    fn generated_config_matches_defaults() {
        let tmp = TempDir::new().unwrap();
        run(Some(tmp.path().to_string_lossy().into_owned()), &quiet()).unwrap();

        let config = classfold_config::load_config(tmp.path()).unwrap();
        assert_eq!(config, ProjectConfig::default());
    }

    #[test]
    fn generated_utilities_load() {
        let tmp = TempDir::new().unwrap();
        run(Some(tmp.path().to_string_lossy().into_owned()), &quiet()).unwrap();

        let table = UtilityTable::load(&tmp.path().join(UTILITIES_FILE)).unwrap();
        assert_eq!(table.compile("flex p-4"), "display: flex;\n  padding: 1rem;");
    }

    #[test]
    fn existing_utilities_are_kept() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(UTILITIES_FILE), "{}").unwrap();
        run(Some(tmp.path().to_string_lossy().into_owned()), &quiet()).unwrap();
        assert_eq!(fs::read_to_string(tmp.path().join(UTILITIES_FILE)).unwrap(), "{}");
    }

    #[test]
    fn init_refuses_existing_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "").unwrap();
        let result = run(Some(tmp.path().to_string_lossy().into_owned()), &quiet());
        assert!(result.is_err());
    }
}
