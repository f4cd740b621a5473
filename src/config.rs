//! Input path configuration
//!
//! Defaults point at the working directory. An optional TOML file can move
//! them:
//!
//! ```toml
//! paired_input = "traces/transferFrom.txt"
//! single_input = "traces/all.txt"
//! ```

use crate::error::{Result, TallyError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Where each mode reads its input from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TallyConfig {
    /// Alternating key/duration lines
    #[serde(default = "default_paired_input")]
    pub paired_input: PathBuf,

    /// One key per line
    #[serde(default = "default_single_input")]
    pub single_input: PathBuf,
}

fn default_paired_input() -> PathBuf {
    PathBuf::from("transferFrom.txt")
}

fn default_single_input() -> PathBuf {
    PathBuf::from("all.txt")
}

impl Default for TallyConfig {
    fn default() -> Self {
        Self {
            paired_input: default_paired_input(),
            single_input: default_single_input(),
        }
    }
}

impl TallyConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| TallyError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| TallyError::Config(e.to_string()))
    }
}
