//! Parsing and validation of `classfold.toml` project configuration files.
//!
//! This crate reads the project configuration file and produces a strongly-typed
//! [`ProjectConfig`], plus the [`ResolvedPaths`] anchored at the project root.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_file, load_config_from_str, validate_config, CONFIG_FILE};
pub use resolve::{resolve_paths, ResolvedPaths};
pub use types::*;
