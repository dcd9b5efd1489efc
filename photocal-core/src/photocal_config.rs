//! Global photocal configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_API_BASE, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
use crate::error::{PhotocalError, PhotocalResult};

static DEFAULT_DATA_PATH: &str = "~/.photocal";

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_PATH)
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Global configuration at ~/.config/photocal/config.toml
///
/// The API key is deliberately absent: it only ever lives in memory.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PhotocalConfig {
    /// Where saved events live
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Vision-capable chat model
    #[serde(default = "default_model")]
    pub model: String,

    /// OpenAI-compatible API root
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Deadline for one photo analysis, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PhotocalConfig {
    fn default() -> Self {
        PhotocalConfig {
            data_dir: default_data_dir(),
            model: default_model(),
            api_base: default_api_base(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl PhotocalConfig {
    pub fn config_path() -> PhotocalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| PhotocalError::Config("Could not determine config directory".into()))?
            .join("photocal");

        Ok(config_dir.join("config.toml"))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> PhotocalResult<()> {
        let contents = format!(
            "\
# photocal configuration

# Where saved events live:
# data_dir = \"{}\"

# Vision model used to read photos:
# model = \"{}\"

# OpenAI-compatible API root:
# api_base = \"{}\"

# Give up on a photo after this many seconds:
# timeout_secs = {}

# The API key is never stored here. Pass --api-key or set OPENAI_API_KEY.
",
            DEFAULT_DATA_PATH, DEFAULT_MODEL, DEFAULT_API_BASE, DEFAULT_TIMEOUT_SECS
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PhotocalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| PhotocalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
