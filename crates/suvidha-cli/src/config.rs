use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use suvidha_ledger::LedgerConfig;
use suvidha_server::ServerConfig;

/// Name of the config file looked up inside the data directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Contents of the TOML config file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub ledger: LedgerConfig,
    pub server: ServerConfig,
}

impl CliConfig {
    /// Load `explicit` if given (it must exist), else `<data_dir>/config.toml`
    /// if present, else defaults.
    pub fn load(explicit: Option<&Path>, data_dir: &Path) -> anyhow::Result<Self> {
        let path: PathBuf = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let implicit = data_dir.join(CONFIG_FILE);
                if !implicit.exists() {
                    tracing::debug!(path = %implicit.display(), "no config file, using defaults");
                    return Ok(Self::default());
                }
                implicit
            }
        };

        let text = fs::read_to_string(&path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::from_toml(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.ledger.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
