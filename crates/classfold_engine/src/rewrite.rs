//! Positional rewriting of class attribute values.
//!
//! Occurrence offsets refer to the content as it was scanned. Replacing a
//! value with one of a different length shifts every later position, so
//! splices are applied in ascending offset order while carrying the
//! accumulated length difference.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use classfold_common::{ClassfoldResult, InternalError};

use crate::canonical::CanonicalKey;
use crate::css::CssCompiler;
use crate::occurrence::{Occurrence, OccurrenceIndex};

/// Replace `len` bytes at `offset` (in the original content) with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splice {
    /// Byte offset in the original content.
    pub offset: usize,
    /// Number of original bytes replaced.
    pub len: usize,
    /// Replacement text.
    pub replacement: String,
}

impl Splice {
    /// Creates a splice.
    pub fn new(offset: usize, len: usize, replacement: impl Into<String>) -> Self {
        Self {
            offset,
            len,
            replacement: replacement.into(),
        }
    }

    fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// Applies `splices` to `content`, producing a fresh string.
///
/// Splices must be sorted by offset, must not overlap, and must fall on
/// character boundaries inside `content`. Each one lands at
/// `offset + delta` in the output, where `delta` is the sum of
/// `replacement.len() - len` over all earlier splices.
pub fn apply_splices(content: &str, splices: &[Splice]) -> ClassfoldResult<String> {
    let growth: isize = splices
        .iter()
        .map(|s| s.replacement.len() as isize - s.len as isize)
        .sum();
    let capacity = (content.len() as isize + growth).max(0) as usize;

    let (mut out, _delta, cursor) = splices.iter().try_fold(
        (String::with_capacity(capacity), 0isize, 0usize),
        |(mut out, delta, cursor), splice| {
            if splice.offset < cursor {
                return Err(InternalError::new(format!(
                    "splice at {} overlaps or precedes previous splice ending at {cursor}",
                    splice.offset
                )));
            }
            if splice.end() > content.len()
                || !content.is_char_boundary(splice.offset)
                || !content.is_char_boundary(splice.end())
            {
                return Err(InternalError::new(format!(
                    "splice {}..{} is outside content of {} bytes or splits a character",
                    splice.offset,
                    splice.end(),
                    content.len()
                )));
            }

            out.push_str(&content[cursor..splice.offset]);
            let at = splice.offset as isize + delta;
            if at != out.len() as isize {
                return Err(InternalError::new(format!(
                    "splice drift mismatch: expected output position {at}, found {}",
                    out.len()
                )));
            }
            out.push_str(&splice.replacement);

            let delta = delta + splice.replacement.len() as isize - splice.len as isize;
            Ok((out, delta, splice.end()))
        },
    )?;

    out.push_str(&content[cursor..]);
    Ok(out)
}

/// Rewrites a file's class values to use generated names.
///
/// Each file is rewritten at most once per run; a repeat request returns
/// the content unchanged.
pub struct PositionalRewriter<'a> {
    index: &'a OccurrenceIndex,
    names: &'a HashMap<CanonicalKey, String>,
    compiler: &'a dyn CssCompiler,
    rewritten: Mutex<HashSet<String>>,
}

impl<'a> PositionalRewriter<'a> {
    /// Creates a rewriter over a run's resolved structures.
    pub fn new(
        index: &'a OccurrenceIndex,
        names: &'a HashMap<CanonicalKey, String>,
        compiler: &'a dyn CssCompiler,
    ) -> Self {
        Self {
            index,
            names,
            compiler,
            rewritten: Mutex::new(HashSet::new()),
        }
    }

    /// Returns the replacement text for one occurrence.
    ///
    /// Tokens the compiler does not recognize are kept in their original
    /// order; recognized utilities collapse into the key's generated name.
    pub fn render(&self, occurrence: &Occurrence) -> String {
        let tokens: Vec<&str> = occurrence.class_string.split_whitespace().collect();
        let Some(name) = self.names.get(&occurrence.key) else {
            return tokens.join(" ");
        };

        let (utilities, mut plain): (Vec<&str>, Vec<&str>) = tokens
            .into_iter()
            .partition(|token| !self.compiler.compile(token).trim().is_empty());
        if utilities.is_empty() {
            return plain.join(" ");
        }
        plain.push(name);
        plain.join(" ")
    }

    /// Builds the splices for `file`, checking each against `content`.
    pub fn plan(&self, content: &str, file: &str) -> ClassfoldResult<Vec<Splice>> {
        self.index
            .for_file(file)
            .into_iter()
            .map(|occurrence| {
                let end = occurrence.offset + occurrence.length;
                if content.get(occurrence.offset..end) != Some(occurrence.class_string.as_str()) {
                    return Err(InternalError::new(format!(
                        "{file}: content at {}..{end} does not match scanned class '{}'",
                        occurrence.offset, occurrence.class_string
                    )));
                }
                Ok(Splice::new(
                    occurrence.offset,
                    occurrence.length,
                    self.render(occurrence),
                ))
            })
            .collect()
    }

    /// Marks `file` as rewritten. Returns `false` if it already was.
    pub fn claim(&self, file: &str) -> bool {
        let mut rewritten = self
            .rewritten
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        rewritten.insert(file.to_string())
    }

    /// Rewrites every occurrence in `file`.
    pub fn replace(&self, content: &str, file: &str) -> ClassfoldResult<String> {
        if !self.claim(file) {
            return Ok(content.to_string());
        }
        let splices = self.plan(content, file)?;
        apply_splices(content, &splices)
    }
}
