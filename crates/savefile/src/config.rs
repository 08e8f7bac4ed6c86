//! Save manager configuration structures and loaders.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::codec::CodecKind;
use crate::error::{Result, SaveError};
use crate::retention::{RetentionPolicy, TieBreak};

/// Everything needed to build a [`SaveManager`](crate::SaveManager) at runtime.
///
/// ```toml
/// directory = "saves"
/// codec = "bincode"       # "bincode" | "json" | "json-pretty"
/// max_files = 3           # omit for unlimited retention
/// tie_break = "file-name" # "file-name" | "scan-order"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SaveConfig {
    pub directory: PathBuf,
    #[serde(default)]
    pub codec: CodecKind,
    #[serde(default)]
    pub max_files: Option<usize>,
    #[serde(default)]
    pub tie_break: TieBreak,
}

impl SaveConfig {
    /// JSON saves in `directory`, unlimited retention.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            codec: CodecKind::default(),
            max_files: None,
            tie_break: TieBreak::default(),
        }
    }

    pub fn from_toml_str(input: &str) -> Result<Self> {
        toml::from_str(input).map_err(|e| SaveError::Config(e.to_string()))
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Retention policy described by this configuration.
    ///
    /// `max_files = 0` is rejected rather than read as "unlimited".
    pub fn retention_policy(&self) -> Result<RetentionPolicy> {
        let policy = match self.max_files {
            Some(max_files) => RetentionPolicy::with_limit(max_files)?,
            None => RetentionPolicy::unlimited(),
        };
        Ok(policy.with_tie_break(self.tie_break))
    }
}

/// Platform-specific save directory for `app_name`.
///
/// - macOS: `~/Library/Application Support/<app>/saves`
/// - Linux: `~/.local/share/<app>/saves` (or `$XDG_DATA_HOME/<app>/saves`)
/// - Windows: `%APPDATA%\<app>\data\saves`
/// - Fallback: `./save_data/saves`
pub fn default_save_dir(app_name: &str) -> PathBuf {
    directories::ProjectDirs::from("", "", app_name)
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./save_data"))
        .join("saves")
}
