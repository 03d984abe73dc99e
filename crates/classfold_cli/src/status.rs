//! `classfold status`: what the next run would reprocess.

use classfold_cache::{ChangeCache, ChangeSet};
use classfold_engine::file_key;

use crate::pipeline::{load_project, source_files};
use crate::{GlobalArgs, ReportFormat, StatusArgs};

/// Runs the `classfold status` command.
///
/// Compares the scanned files against the change cache without touching
/// either. Returns exit code 0.
pub fn run(args: &StatusArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;
    let files = source_files(&project)?;
    let keyed: Vec<(String, std::path::PathBuf)> = files
        .into_iter()
        .map(|path| (file_key(&project.paths.scan_root, &path), path))
        .collect();

    let cache = ChangeCache::load(&project.paths.cache_file);
    let changes = cache.detect_changes(&keyed);

    match args.format {
        ReportFormat::Text => {
            if !global.quiet {
                print_text(&changes, global.verbose);
            }
        }
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&changes)?),
    }
    Ok(0)
}

fn print_text(changes: &ChangeSet, verbose: bool) {
    for path in &changes.new_files {
        eprintln!("        New {path}");
    }
    for path in &changes.modified_files {
        eprintln!("   Modified {path}");
    }
    for path in &changes.deleted_files {
        eprintln!("    Deleted {path}");
    }
    if verbose {
        for path in &changes.unchanged_files {
            eprintln!("  Unchanged {path}");
        }
    }
    if changes.is_empty() {
        eprintln!("   Up to date ({} file(s))", changes.unchanged_files.len());
    } else {
        eprintln!(
            "   Result: {} to rewrite, {} deleted, {} unchanged",
            changes.dirty_count(),
            changes.deleted_files.len(),
            changes.unchanged_files.len()
        );
    }
}
