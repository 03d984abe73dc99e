//! CSS generation per canonical key and aggregation per file.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::debug;

use crate::canonical::CanonicalKey;
use crate::error::EngineError;
use crate::occurrence::{Occurrence, OccurrenceIndex};
use crate::resolver::NameResolver;

/// Compiles a class string into CSS declarations.
///
/// An empty (or whitespace-only) result means the input contains no
/// recognized utility.
pub trait CssCompiler: Send + Sync {
    /// Returns the declarations produced by `class_string`.
    fn compile(&self, class_string: &str) -> String;
}

/// A lookup table from utility class to its CSS declarations.
///
/// Loaded from a JSON object such as
/// `{ "bg-red-500": "background-color: #ef4444;", "text-sm": "font-size: .875rem;" }`.
#[derive(Debug, Clone, Default)]
pub struct UtilityTable {
    utilities: HashMap<String, String>,
}

impl UtilityTable {
    /// Loads a table from a JSON file.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let text = std::fs::read_to_string(path).map_err(|e| EngineError::Utilities {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_json(&text).map_err(|e| EngineError::Utilities {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Parses a table from JSON text.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let utilities: HashMap<String, String> = serde_json::from_str(text)?;
        Ok(Self { utilities })
    }

    /// Returns the declarations of a single utility, if known.
    pub fn get(&self, utility: &str) -> Option<&str> {
        self.utilities.get(utility).map(String::as_str)
    }

    /// Returns the number of utilities in the table.
    pub fn len(&self) -> usize {
        self.utilities.len()
    }

    /// Returns `true` if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.utilities.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for UtilityTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            utilities: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl CssCompiler for UtilityTable {
    fn compile(&self, class_string: &str) -> String {
        let mut seen = HashSet::new();
        let mut declarations = Vec::new();
        for token in class_string.split_whitespace() {
            if !seen.insert(token) {
                continue;
            }
            let Some(decl) = self.get(token).map(str::trim) else {
                continue;
            };
            if decl.is_empty() {
                continue;
            }
            if decl.ends_with(';') {
                declarations.push(decl.to_string());
            } else {
                declarations.push(format!("{decl};"));
            }
        }
        declarations.join("\n  ")
    }
}

/// Generated CSS state of one canonical key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyCss {
    /// A complete rule for the key's generated name.
    Block(String),
    /// The compiler produced nothing; the key gets no rule and no name.
    NoCss,
}

/// Generates CSS exactly once per canonical key and groups it per file.
#[derive(Debug, Default)]
pub struct CssAggregator {
    blocks: HashMap<CanonicalKey, KeyCss>,
}

impl CssAggregator {
    /// Creates an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates the CSS for `key` from its representative occurrence.
    ///
    /// The first call for a key wins; later calls return the stored result
    /// without touching the compiler or the resolver. A name is assigned
    /// only when the compiler recognizes something.
    pub fn generate(
        &mut self,
        key: &CanonicalKey,
        representative: &Occurrence,
        compiler: &dyn CssCompiler,
        resolver: &mut NameResolver,
    ) -> &KeyCss {
        if !self.blocks.contains_key(key) {
            let css = compiler.compile(&representative.class_string);
            let entry = if css.trim().is_empty() {
                debug!(key = %key, "no utilities recognized");
                KeyCss::NoCss
            } else {
                let name = resolver.assign(
                    key,
                    representative.tag.as_deref(),
                    &representative.class_string,
                );
                KeyCss::Block(format_block(&name, &representative.class_string, css.trim()))
            };
            self.blocks.insert(key.clone(), entry);
        }
        &self.blocks[key]
    }

    /// Returns the CSS to inject into `file`: the blocks of the keys that
    /// occur there, in first-encounter order, joined by newlines.
    ///
    /// `None` when no key in the file produced CSS.
    pub fn file_css(&self, index: &OccurrenceIndex, file: &str) -> Option<String> {
        let blocks: Vec<&str> = index
            .keys_in_file(file)
            .into_iter()
            .filter_map(|key| match self.blocks.get(key) {
                Some(KeyCss::Block(block)) => Some(block.as_str()),
                _ => None,
            })
            .collect();
        if blocks.is_empty() {
            None
        } else {
            Some(blocks.join("\n"))
        }
    }
}

fn format_block(name: &str, class_string: &str, css: &str) -> String {
    format!(".{name} {{\n  /* generated from: {class_string} */\n  {css}\n}}")
}
