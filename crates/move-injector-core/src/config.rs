//! Loader configuration.
//!
//! Values come from code (builder methods), a JSON file, or the environment:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `MOVE_INJECT_DEBUG` | `debug` |
//! | `MOVE_INJECT_CODE_ROOT` | `code_root` |
//! | `MOVE_INJECT_SEARCH_PATH` | `search_path` (platform path-list syntax) |

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_DEBUG: &str = "MOVE_INJECT_DEBUG";
pub const ENV_CODE_ROOT: &str = "MOVE_INJECT_CODE_ROOT";
pub const ENV_SEARCH_PATH: &str = "MOVE_INJECT_SEARCH_PATH";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Log a digest of every injected module body (default: false).
    #[serde(default)]
    pub debug: bool,

    /// Where the host program's own modules live: either an unpacked
    /// directory tree or a single `.mvar` archive. Package ingestion fails
    /// when this is unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_root: Option<PathBuf>,

    /// Initial search roots (directories or `.mvar` archives), in lookup order.
    #[serde(default)]
    pub search_path: Vec<PathBuf>,
}

impl LoaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by whatever the environment sets.
    pub fn from_env() -> Self {
        Self::default().merge_env()
    }

    /// Apply environment overrides on top of this configuration.
    pub fn merge_env(mut self) -> Self {
        self.debug = env_bool(ENV_DEBUG, self.debug);
        if let Some(root) = std::env::var_os(ENV_CODE_ROOT).filter(|v| !v.is_empty()) {
            self.code_root = Some(PathBuf::from(root));
        }
        if let Some(paths) = std::env::var_os(ENV_SEARCH_PATH).filter(|v| !v.is_empty()) {
            self.search_path = std::env::split_paths(&paths).collect();
        }
        self
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read loader config {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("parse loader config {}", path.display()))
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_code_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.code_root = Some(root.into());
        self
    }

    pub fn with_search_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.search_path.push(root.into());
        self
    }
}

/// Truthy (`1`, `true`, `yes`, `on`) when set, `default` when unset.
fn env_bool(name: &str, default: bool) -> bool {
    match std::env::var(name).ok() {
        Some(v) => matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        None => default,
    }
}
