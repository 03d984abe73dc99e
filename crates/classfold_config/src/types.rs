//! Configuration types deserialized from `classfold.toml`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Default extensions scanned for class attributes.
pub const DEFAULT_FILE_TYPES: &[&str] = &[".astro", ".tsx", ".jsx", ".vue", ".html"];

/// Default directory names skipped during traversal.
pub const DEFAULT_EXCLUDED_DIRECTORIES: &[&str] = &["node_modules", ".git", "dist"];

/// The top-level configuration parsed from `classfold.toml`.
///
/// Every section is optional; an empty file yields the defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ProjectConfig {
    /// Which files are scanned and how class strings are compared.
    #[serde(default)]
    pub scan: ScanConfig,
    /// Generated-name settings and the optional naming service.
    #[serde(default)]
    pub naming: NamingConfig,
    /// Where utility CSS comes from.
    #[serde(default)]
    pub css: CssConfig,
    /// Change cache location.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Traversal and comparison settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ScanConfig {
    /// Directory to scan, relative to the project root.
    #[serde(default = "default_scan_root")]
    pub root: String,
    /// File extensions to scan (e.g. `".html"`, or a single string).
    #[serde(
        default = "default_file_types",
        deserialize_with = "deserialize_string_or_vec"
    )]
    pub file_types: Vec<String>,
    /// Directory names skipped at any depth.
    #[serde(default = "default_excluded_directories")]
    pub excluded_directories: Vec<String>,
    /// Whether `"a b"` and `"b a"` are different class combinations.
    #[serde(default)]
    pub order_matters: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root: default_scan_root(),
            file_types: default_file_types(),
            excluded_directories: default_excluded_directories(),
            order_matters: false,
        }
    }
}

impl ScanConfig {
    /// Returns `true` if `file_name` ends with one of the scanned extensions.
    pub fn is_scanned(&self, file_name: &str) -> bool {
        self.file_types
            .iter()
            .any(|ext| file_name.ends_with(ext.as_str()))
    }

    /// Returns `true` if a directory with this name is skipped.
    pub fn is_excluded(&self, dir_name: &str) -> bool {
        self.excluded_directories.iter().any(|d| d == dir_name)
    }
}

/// Generated-name settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct NamingConfig {
    /// Prefix prepended to every generated class name.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Whether to ask the naming service for readable names.
    #[serde(default)]
    pub use_strategy: bool,
    /// Base URL of the naming service.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Maximum number of naming-service calls per run.
    #[serde(default = "default_max_invocations")]
    pub max_invocations: usize,
    /// Per-call timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            use_strategy: false,
            endpoint: default_endpoint(),
            max_invocations: default_max_invocations(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// CSS source settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CssConfig {
    /// JSON table mapping utility classes to CSS declarations, relative to the project root.
    #[serde(default = "default_utilities")]
    pub utilities: String,
}

impl Default for CssConfig {
    fn default() -> Self {
        Self {
            utilities: default_utilities(),
        }
    }
}

/// Change cache settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CacheConfig {
    /// Cache file, relative to the project root.
    #[serde(default = "default_cache_path")]
    pub path: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
        }
    }
}

fn default_scan_root() -> String {
    "src".to_string()
}

fn default_file_types() -> Vec<String> {
    DEFAULT_FILE_TYPES.iter().map(|s| s.to_string()).collect()
}

fn default_excluded_directories() -> Vec<String> {
    DEFAULT_EXCLUDED_DIRECTORIES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_prefix() -> String {
    "twk-".to_string()
}

fn default_endpoint() -> String {
    "http://localhost:8787".to_string()
}

fn default_max_invocations() -> usize {
    999
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_utilities() -> String {
    "utilities.json".to_string()
}

fn default_cache_path() -> String {
    "classfold.lock".to_string()
}

/// Deserializes a field that can be either a single string or a list of strings.
///
/// Allows `file_types = ".html"` as well as `file_types = [".html", ".vue"]`.
fn deserialize_string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut vec = Vec::new();
            while let Some(val) = seq.next_element::<String>()? {
                vec.push(val);
            }
            Ok(vec)
        }
    }

    deserializer.deserialize_any(StringOrVec)
}
