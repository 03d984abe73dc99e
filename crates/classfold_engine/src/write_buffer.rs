//! Deferred writes, flushed once at the end of a successful run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::EngineError;

/// Pending content for one output path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteTask {
    /// Destination path.
    pub path: PathBuf,
    /// Blobs in the order they were added.
    pub blobs: Vec<String>,
}

impl WriteTask {
    /// Returns the final content: every blob concatenated in order.
    pub fn content(&self) -> String {
        self.blobs.concat()
    }
}

/// Accumulates writes so nothing touches disk until the run is known to succeed.
#[derive(Debug, Default)]
pub struct WriteBuffer {
    tasks: Vec<WriteTask>,
    positions: HashMap<PathBuf, usize>,
}

impl WriteBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `blob` to the pending content of `path`.
    pub fn add_to_write(&mut self, path: impl Into<PathBuf>, blob: impl Into<String>) {
        let path = path.into();
        match self.positions.get(&path) {
            Some(&i) => self.tasks[i].blobs.push(blob.into()),
            None => {
                self.positions.insert(path.clone(), self.tasks.len());
                self.tasks.push(WriteTask {
                    path,
                    blobs: vec![blob.into()],
                });
            }
        }
    }

    /// Returns the pending tasks in first-insertion order.
    pub fn tasks(&self) -> &[WriteTask] {
        &self.tasks
    }

    /// Returns the pending task for `path`, if any.
    pub fn get(&self, path: &Path) -> Option<&WriteTask> {
        self.positions.get(path).map(|&i| &self.tasks[i])
    }

    /// Returns the number of distinct paths pending.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Writes every pending path exactly once and returns how many were written.
    pub fn flush(self) -> Result<usize, EngineError> {
        let count = self.tasks.len();
        for task in self.tasks {
            if let Some(parent) = task.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| EngineError::io(parent, e))?;
            }
            std::fs::write(&task.path, task.content())
                .map_err(|e| EngineError::io(&task.path, e))?;
            info!(path = %task.path.display(), blobs = task.blobs.len(), "wrote file");
        }
        Ok(count)
    }
}
