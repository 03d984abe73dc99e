//! `classfold run`: the incremental rewrite.
//!
//! 1. Find the project root (walk up looking for `classfold.toml`)
//! 2. Load config and apply CLI overrides
//! 3. Discover scanned files under the scan root
//! 4. Run the engine over them, flushing and saving the cache on success
//! 5. Print the run report

use classfold_engine::{run_files, Action, RunReport};

use crate::pipeline::{apply_overrides, build_engine, load_project, source_files};
use crate::{GlobalArgs, ReportFormat, RunArgs};

/// Runs the `classfold run` command.
///
/// Returns exit code 0 on success; any error aborts the run before files
/// or the cache are written.
pub fn run(args: &RunArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let mut project = load_project(global)?;
    apply_overrides(&mut project.config, args);
    classfold_config::validate_config(&project.config)?;

    let files = source_files(&project)?;
    if !global.quiet && args.format == ReportFormat::Text {
        eprintln!(
            "   Scanning {} ({} file(s))",
            project.paths.scan_root.display(),
            files.len()
        );
    }

    let engine = build_engine(&project, args.dry_run)?;
    let report = run_files(engine, files)?;

    match args.format {
        ReportFormat::Text => {
            if !global.quiet {
                print_text(&report, global.verbose);
            }
        }
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(0)
}

fn print_text(report: &RunReport, verbose: bool) {
    let verb = if report.dry_run { "Would rewrite" } else { "Rewrote" };
    for file in &report.files {
        match &file.action {
            Action::Rewritten {
                occurrences,
                companion,
            } => {
                eprintln!("   {verb} {} ({occurrences} class attribute(s))", file.path);
                if let Some(sheet) = companion {
                    eprintln!("     Created {sheet}");
                }
            }
            Action::Unsupported => eprintln!("   Skipped {} (no style strategy)", file.path),
            Action::Unchanged | Action::NoClasses if verbose => {
                eprintln!("   Skipped {} ({})", file.path, skip_reason(&file.action))
            }
            _ => {}
        }
    }
    eprintln!("   {}", summary(report));
}

fn skip_reason(action: &Action) -> &'static str {
    match action {
        Action::Unchanged => "unchanged",
        Action::NoClasses => "no classes",
        Action::Unsupported => "unsupported",
        Action::Rewritten { .. } => "rewritten",
    }
}

/// One-line summary of a run report.
pub fn summary(report: &RunReport) -> String {
    let mut line = format!(
        "Result: {} rewritten, {} unchanged, {} without classes, {} name(s) assigned",
        report.rewritten(),
        report.unchanged(),
        report.no_classes(),
        report.names_assigned
    );
    if report.strategy_invocations > 0 {
        line.push_str(&format!(", {} naming call(s)", report.strategy_invocations));
    }
    if report.dry_run {
        line.push_str(" (dry run, nothing written)");
    }
    line
}
