//! The run context and the two-phase rewrite pipeline.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use classfold_cache::ChangeCache;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::canonical::canonical_key;
use crate::css::{CssAggregator, CssCompiler};
use crate::error::EngineError;
use crate::inject::{companion_path, Injection, StyleStrategy};
use crate::occurrence::{Occurrence, OccurrenceIndex};
use crate::report::{Action, RunReport};
use crate::resolver::NameResolver;
use crate::rewrite::PositionalRewriter;
use crate::scanner::{BoundaryScanner, MarkupScanner};
use crate::walk::file_key;
use crate::write_buffer::WriteBuffer;

/// Per-run switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Treat token order as significant when comparing class strings.
    pub order_matters: bool,
    /// Compute everything but write nothing and keep the cache file as it was.
    pub dry_run: bool,
}

/// Everything a finished run produced, not yet applied to disk.
#[derive(Debug)]
pub struct RunOutput {
    /// Buffered file contents.
    pub writes: WriteBuffer,
    /// The cache updated with every processed file.
    pub cache: ChangeCache,
    /// Per-file action log.
    pub report: RunReport,
}

/// A file that passed the cache gate and has class values to rewrite.
struct PendingFile {
    key: String,
    path: PathBuf,
    content: String,
    strategy: StyleStrategy,
    occurrences: usize,
    /// Companion sheet left by an earlier run.
    existing_sheet: Option<String>,
}

/// Report slot kept in traversal order; pending files are filled in by [`Engine::finish`].
enum Slot {
    Done(String, Action),
    Pending(usize),
}

/// Run-scoped state of one rewrite run.
///
/// Feed every file to [`process_file`](Self::process_file) in traversal
/// order, then call [`finish`](Self::finish). The engine owns the change
/// cache for the duration of the run and hands it back in the [`RunOutput`].
pub struct Engine {
    scan_root: PathBuf,
    options: RunOptions,
    cache: ChangeCache,
    scanner: Box<dyn BoundaryScanner>,
    compiler: Box<dyn CssCompiler>,
    resolver: NameResolver,
    index: OccurrenceIndex,
    css: CssAggregator,
    pending: Vec<PendingFile>,
    slots: Vec<Slot>,
    seen: HashSet<String>,
    rng: StdRng,
}

impl Engine {
    /// Creates an engine for files below `scan_root`, using [`MarkupScanner`].
    pub fn new(
        scan_root: impl Into<PathBuf>,
        cache: ChangeCache,
        compiler: Box<dyn CssCompiler>,
        resolver: NameResolver,
        options: RunOptions,
    ) -> Self {
        Self {
            scan_root: scan_root.into(),
            options,
            cache,
            scanner: Box::new(MarkupScanner::new()),
            compiler,
            resolver,
            index: OccurrenceIndex::new(),
            css: CssAggregator::new(),
            pending: Vec::new(),
            slots: Vec::new(),
            seen: HashSet::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Replaces the boundary scanner.
    pub fn with_scanner(mut self, scanner: Box<dyn BoundaryScanner>) -> Self {
        self.scanner = scanner;
        self
    }

    /// Seeds the random source used for companion import names.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Phase 1 for one file: gate on the cache, scan, accumulate, name and
    /// generate CSS for keys seen here first.
    ///
    /// A file already processed this run is ignored.
    pub fn process_file(&mut self, path: &Path) -> Result<(), EngineError> {
        let key = file_key(&self.scan_root, path);
        if !self.seen.insert(key.clone()) {
            debug!(file = %key, "already processed this run");
            return Ok(());
        }

        let content = std::fs::read_to_string(path).map_err(|e| EngineError::io(path, e))?;
        if !self.cache.is_modified(&key, &content) {
            debug!(file = %key, "unchanged since last run");
            self.slots.push(Slot::Done(key, Action::Unchanged));
            return Ok(());
        }

        let Some(strategy) = StyleStrategy::for_path(path) else {
            info!(file = %key, "no style strategy for this file type, skipping");
            self.slots.push(Slot::Done(key, Action::Unsupported));
            return Ok(());
        };

        let scanned = self.scanner.scan(&content);
        if scanned.is_empty() {
            debug!(file = %key, "no class attributes");
            self.cache.record(&key, &content, &content);
            self.slots.push(Slot::Done(key, Action::NoClasses));
            return Ok(());
        }

        let occurrences = scanned.len();
        for found in scanned {
            let occurrence = Occurrence {
                file: key.clone(),
                key: canonical_key(&found.class_string, self.options.order_matters),
                class_string: found.class_string,
                offset: found.offset,
                length: found.length,
                tag: found.tag,
            };
            debug!(
                file = %key,
                offset = occurrence.offset,
                class = %occurrence.class_string,
                "found class attribute"
            );
            self.css.generate(
                &occurrence.key,
                &occurrence,
                self.compiler.as_ref(),
                &mut self.resolver,
            );
            self.index.accumulate(occurrence);
        }

        let existing_sheet = match strategy {
            StyleStrategy::Companion => read_existing(&companion_path(path))?,
            StyleStrategy::Inline => None,
        };

        self.slots.push(Slot::Pending(self.pending.len()));
        self.pending.push(PendingFile {
            key,
            path: path.to_path_buf(),
            content,
            strategy,
            occurrences,
            existing_sheet,
        });
        Ok(())
    }

    /// Drops cache entries for files not visited this run.
    ///
    /// Only meaningful after a complete walk of the scan root.
    pub fn forget_unseen(&mut self) -> Vec<String> {
        let stale: Vec<String> = self
            .cache
            .manifest()
            .entries
            .keys()
            .filter(|k| !self.seen.contains(k.as_str()))
            .cloned()
            .collect();
        for key in &stale {
            debug!(file = %key, "forgetting cache entry of missing file");
            self.cache.forget(key);
        }
        stale
    }

    /// Phase 2: rewrites and injects every pending file in parallel, then
    /// buffers the results in traversal order and records them in the cache.
    pub fn finish(self) -> Result<RunOutput, EngineError> {
        let Engine {
            scan_root,
            options,
            mut cache,
            compiler,
            resolver,
            index,
            css,
            pending,
            slots,
            mut rng,
            ..
        } = self;

        let suffixes: Vec<u32> = pending.iter().map(|_| rng.gen_range(0..100)).collect();
        let rewriter = PositionalRewriter::new(&index, resolver.assignments(), compiler.as_ref());

        let injections = pending
            .par_iter()
            .zip(suffixes.par_iter())
            .map(|(file, &suffix)| -> Result<Injection, EngineError> {
                let rewritten = rewriter.replace(&file.content, &file.key)?;
                let file_css = css.file_css(&index, &file.key).unwrap_or_default();
                Ok(file.strategy.inject(
                    &file.path,
                    rewritten,
                    &file_css,
                    file.existing_sheet.as_deref(),
                    suffix,
                ))
            })
            .collect::<Result<Vec<_>, EngineError>>()?;

        let mut writes = WriteBuffer::new();
        let mut actions: Vec<Option<Action>> = vec![None; pending.len()];
        for ((file, injection), action) in pending.iter().zip(injections).zip(actions.iter_mut()) {
            let companion = injection.companion.map(|(path, sheet)| {
                let companion_key = file_key(&scan_root, &path);
                writes.add_to_write(path, sheet);
                companion_key
            });
            cache.record(&file.key, &file.content, &injection.content);
            writes.add_to_write(&file.path, injection.content);
            info!(file = %file.key, occurrences = file.occurrences, "rewrote class attributes");
            *action = Some(Action::Rewritten {
                occurrences: file.occurrences,
                companion,
            });
        }

        let mut report = RunReport {
            names_assigned: resolver.assignments().len(),
            strategy_invocations: resolver.invocations(),
            dry_run: options.dry_run,
            ..RunReport::default()
        };
        for slot in slots {
            match slot {
                Slot::Done(key, action) => report.record(key, action),
                Slot::Pending(i) => {
                    if let Some(action) = actions[i].take() {
                        report.record(pending[i].key.clone(), action);
                    }
                }
            }
        }

        Ok(RunOutput {
            writes,
            cache,
            report,
        })
    }
}

/// Reads a file that may not exist yet.
fn read_existing(path: &Path) -> Result<Option<String>, EngineError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(EngineError::io(path, e)),
    }
}

/// Runs the whole pipeline over `files`: both phases, then, unless this is
/// a dry run, the single flush followed by the cache save.
///
/// Any error aborts before anything is written, leaving the cache file as it was.
pub fn run_files<I, P>(mut engine: Engine, files: I) -> Result<RunReport, EngineError>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    for file in files {
        engine.process_file(file.as_ref())?;
    }
    let forgotten = engine.forget_unseen();
    if !forgotten.is_empty() {
        info!(count = forgotten.len(), "dropped cache entries of removed files");
    }

    let dry_run = engine.options.dry_run;
    let output = engine.finish()?;
    if dry_run {
        info!(pending = output.writes.len(), "dry run, nothing written");
        return Ok(output.report);
    }

    let written = output.writes.flush()?;
    output.cache.save()?;
    info!(
        files = written,
        cache = %output.cache.path().display(),
        "run complete"
    );
    Ok(output.report)
}
