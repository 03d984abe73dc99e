//! Style injection: placing a file's generated CSS where it will be loaded.

use std::path::{Path, PathBuf};

/// How generated CSS reaches a file, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleStrategy {
    /// CSS goes into a `<style>` element inside the file itself.
    Inline,
    /// CSS goes into a sibling `<stem>.module.css`, imported at the top of the file.
    Companion,
}

const INLINE_EXTENSIONS: &[&str] = &["astro", "html", "htm", "vue", "svelte"];
const COMPANION_EXTENSIONS: &[&str] = &["tsx", "jsx"];

/// Result of injecting CSS into one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Injection {
    /// The file's new content.
    pub content: String,
    /// Companion stylesheet to write alongside the file, if any.
    pub companion: Option<(PathBuf, String)>,
}

impl StyleStrategy {
    /// Returns the strategy for `path`, or `None` if its extension has none.
    pub fn for_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        if INLINE_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Inline)
        } else if COMPANION_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Companion)
        } else {
            None
        }
    }

    /// Injects `css` into `content` of the file at `path`.
    ///
    /// Empty `css` leaves the content untouched and produces no companion.
    /// `existing_sheet` is the companion stylesheet already on disk from an
    /// earlier run; new blocks are appended to it so rules for names already
    /// in the markup survive. `import_suffix` distinguishes the import binding
    /// of a companion sheet, and no import is added when the file already has one.
    pub fn inject(
        self,
        path: &Path,
        content: String,
        css: &str,
        existing_sheet: Option<&str>,
        import_suffix: u32,
    ) -> Injection {
        if css.trim().is_empty() {
            return Injection {
                content,
                companion: None,
            };
        }
        match self {
            Self::Inline => Injection {
                content: inject_inline(&content, css),
                companion: None,
            },
            Self::Companion => {
                let sheet = companion_path(path);
                let file_name = sheet
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let content = if imports_sheet(&content, &file_name) {
                    content
                } else {
                    format!("import styles_generated_{import_suffix} from \"./{file_name}\";\n{content}")
                };
                Injection {
                    content,
                    companion: Some((sheet, merge_sheet(existing_sheet, css))),
                }
            }
        }
    }
}

/// Whether `content` already imports the companion sheet `file_name`.
fn imports_sheet(content: &str, file_name: &str) -> bool {
    let target = format!("./{file_name}");
    content.lines().any(|line| {
        let line = line.trim_start();
        line.starts_with("import ")
            && (line.contains(&format!("\"{target}\"")) || line.contains(&format!("'{target}'")))
    })
}

/// Appends `css` to an existing companion sheet, keeping its rules.
fn merge_sheet(existing: Option<&str>, css: &str) -> String {
    match existing.map(str::trim_end) {
        None | Some("") => css.to_string(),
        Some(prev) if prev.contains(css) => prev.to_string(),
        Some(prev) => format!("{prev}\n{css}"),
    }
}

/// Inserts `css` right after the first `<style>` marker; failing that, as a
/// new `<style>` element before the first `</head>`; failing that, as a
/// trailing `<style>` element on its own line.
pub fn inject_inline(content: &str, css: &str) -> String {
    if let Some(pos) = content.find("<style>") {
        let at = pos + "<style>".len();
        return format!("{}{css}{}", &content[..at], &content[at..]);
    }
    if let Some(pos) = content.find("</head>") {
        return format!("{}<style>{css}</style>{}", &content[..pos], &content[pos..]);
    }
    format!("{content}\n<style>{css}</style>")
}

/// Returns the companion stylesheet path for a component file:
/// `src/Button.tsx` becomes `src/Button.module.css`.
pub fn companion_path(path: &Path) -> PathBuf {
    path.with_extension("module.css")
}
