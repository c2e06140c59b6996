use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IoResultExt, Result};

/// repository configuration stored in config.toml
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// branch HEAD points at after init
    pub default_branch: String,
    /// empty the staging index once a commit succeeds
    pub clear_index_after_commit: bool,
    /// ignore file name, relative to the work tree
    pub ignore_file: String,
}

impl Config {
    /// load config from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_path(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// serialize to toml text
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_branch: "main".to_string(),
            clear_index_after_commit: false,
            ignore_file: ".minigitignore".to_string(),
        }
    }
}
