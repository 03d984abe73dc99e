//! Incremental utility-class rewriting.
//!
//! The engine scans markup and component files for class attributes, gives
//! every distinct class combination one generated name, compiles the CSS for
//! it, and rewrites the files to use the generated names. A persistent
//! [`ChangeCache`](classfold_cache::ChangeCache) limits each run to files that
//! changed since the previous one.
//!
//! A run has two phases. [`Engine::process_file`] is called once per file in
//! traversal order and mutates the run-scoped occurrence index, name table and
//! CSS blocks; first sight of a class combination decides its name.
//! [`Engine::finish`] then rewrites every pending file in parallel against
//! those frozen tables and returns the buffered writes and updated cache,
//! which [`run_files`] flushes and saves only when the whole walk succeeded.

#![warn(missing_docs)]

pub mod canonical;
pub mod css;
pub mod engine;
pub mod error;
pub mod inject;
pub mod naming;
pub mod occurrence;
pub mod report;
pub mod resolver;
pub mod rewrite;
pub mod scanner;
pub mod walk;
pub mod write_buffer;

pub use canonical::{canonical_key, CanonicalKey};
pub use css::{CssAggregator, CssCompiler, KeyCss, UtilityTable};
pub use engine::{run_files, Engine, RunOptions, RunOutput};
pub use error::EngineError;
pub use inject::{Injection, StyleStrategy};
pub use naming::{HttpNamingStrategy, NamingError, NamingStrategy};
pub use occurrence::{Occurrence, OccurrenceIndex};
pub use report::{Action, FileAction, RunReport};
pub use resolver::{NameResolver, MAX_NAME_ATTEMPTS};
pub use rewrite::{apply_splices, PositionalRewriter, Splice};
pub use scanner::{BoundaryScanner, MarkupScanner, ScannedClass};
pub use walk::{discover_files, file_key};
pub use write_buffer::{WriteBuffer, WriteTask};
