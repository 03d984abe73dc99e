//! Per-file action log of a run.

use serde::Serialize;

/// What a run did with one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Content matched the cache; the file was not processed.
    Unchanged,
    /// The file was scanned but its extension has no style strategy.
    Unsupported,
    /// No class attributes were found.
    NoClasses,
    /// Class values were rewritten.
    Rewritten {
        /// Number of class values replaced.
        occurrences: usize,
        /// Companion stylesheet written for the file, relative to the scan root.
        #[serde(skip_serializing_if = "Option::is_none")]
        companion: Option<String>,
    },
}

/// One entry of the action log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileAction {
    /// Cache key of the file.
    pub path: String,
    /// What happened to it.
    #[serde(flatten)]
    pub action: Action,
}

/// Outcome of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Per-file actions in traversal order.
    pub files: Vec<FileAction>,
    /// Distinct class combinations that received a name.
    pub names_assigned: usize,
    /// Calls made to the naming strategy.
    pub strategy_invocations: usize,
    /// Whether writes and the cache save were skipped.
    pub dry_run: bool,
}

impl RunReport {
    /// Appends an action for `path`.
    pub fn record(&mut self, path: impl Into<String>, action: Action) {
        self.files.push(FileAction {
            path: path.into(),
            action,
        });
    }

    /// Returns the action logged for `path`.
    pub fn action_for(&self, path: &str) -> Option<&Action> {
        self.files
            .iter()
            .find(|f| f.path == path)
            .map(|f| &f.action)
    }

    /// Number of rewritten files.
    pub fn rewritten(&self) -> usize {
        self.count(|a| matches!(a, Action::Rewritten { .. }))
    }

    /// Number of files skipped as unchanged.
    pub fn unchanged(&self) -> usize {
        self.count(|a| matches!(a, Action::Unchanged))
    }

    /// Number of files skipped for lack of a style strategy.
    pub fn unsupported(&self) -> usize {
        self.count(|a| matches!(a, Action::Unsupported))
    }

    /// Number of processed files without class attributes.
    pub fn no_classes(&self) -> usize {
        self.count(|a| matches!(a, Action::NoClasses))
    }

    fn count(&self, pred: impl Fn(&Action) -> bool) -> usize {
        self.files.iter().filter(|f| pred(&f.action)).count()
    }
}
