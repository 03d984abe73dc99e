//! Boundary scanning: locating class attribute values in file content.
//!
//! The engine depends only on the [`BoundaryScanner`] contract. Offsets are
//! byte positions of the attribute *value* (without quotes) in the content
//! passed to [`scan`](BoundaryScanner::scan), reported in ascending order.

use std::sync::LazyLock;

use regex::Regex;

/// One class attribute value found by a scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedClass {
    /// Name of the element carrying the attribute, if known.
    pub tag: Option<String>,
    /// The raw attribute value.
    pub class_string: String,
    /// Byte offset of the value in the scanned content.
    pub offset: usize,
    /// Byte length of the value.
    pub length: usize,
}

/// Locates class-list values in markup or component source.
pub trait BoundaryScanner: Send + Sync {
    /// Returns every class value in `content`, ordered by offset.
    fn scan(&self, content: &str) -> Vec<ScannedClass>;
}

/// Matches an opening tag name, or a quoted `class` / `className` /
/// `ngClass` / `[ngClass]` attribute value.
static MARKUP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"<(?P<tag>[A-Za-z][\w:.\-]*)|(?i:\[?(?:ng)?class(?:name)?\]?)\s*=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)')"#,
    )
    .expect("markup pattern is valid")
});

/// Regex scanner for HTML-like markup (HTML, Vue, Astro, JSX/TSX string attributes).
///
/// Each class value is paired with the closest preceding opening tag.
/// Empty and whitespace-only values are skipped; dynamic bindings such as
/// `className={...}` are not matched.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkupScanner;

impl MarkupScanner {
    /// Creates a markup scanner.
    pub fn new() -> Self {
        Self
    }
}

impl BoundaryScanner for MarkupScanner {
    fn scan(&self, content: &str) -> Vec<ScannedClass> {
        let mut found = Vec::new();
        let mut current_tag: Option<&str> = None;

        for caps in MARKUP_PATTERN.captures_iter(content) {
            if let Some(tag) = caps.name("tag") {
                current_tag = Some(tag.as_str());
                continue;
            }
            let Some(value) = caps.name("dq").or_else(|| caps.name("sq")) else {
                continue;
            };
            if value.as_str().trim().is_empty() {
                continue;
            }
            found.push(ScannedClass {
                tag: current_tag.map(str::to_string),
                class_string: value.as_str().to_string(),
                offset: value.start(),
                length: value.len(),
            });
        }

        found
    }
}
