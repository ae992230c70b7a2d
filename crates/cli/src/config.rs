// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime configuration for the `dt` binary

use anyhow::{anyhow, Context, Result};
use dt_core::{DirectoryEntry, StaticDirectory};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "DT_DATA_DIR";
pub const CONFIG_FILE: &str = "config.toml";
pub const LOG_FILE: &str = "dt.log";

/// Optional settings read from `<data-dir>/config.toml`
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Default log filter when `DT_LOG` is unset
    pub log_level: Option<String>,
    /// Team directory keyed by email
    #[serde(default)]
    pub directory: BTreeMap<String, DirectoryEntry>,
}

impl FileConfig {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[derive(Debug)]
pub struct Config {
    pub data_dir: PathBuf,
    pub log_path: PathBuf,
    pub log_level: Option<String>,
    pub directory: BTreeMap<String, DirectoryEntry>,
}

impl Config {
    /// Resolve the data directory and read its config file, if any
    pub fn load(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = resolve_data_dir(
            data_dir,
            std::env::var(DATA_DIR_ENV).ok(),
            dirs::data_local_dir(),
        )?;
        Self::for_data_dir(&data_dir)
    }

    pub fn for_data_dir(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE);
        let file = match std::fs::read_to_string(&path) {
            Ok(text) => FileConfig::parse(&text)
                .with_context(|| format!("invalid config file {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => FileConfig::default(),
            Err(e) => {
                return Err(e).with_context(|| format!("cannot read {}", path.display()))
            }
        };

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            log_path: data_dir.join(LOG_FILE),
            log_level: file.log_level,
            directory: file.directory,
        })
    }

    pub fn directory(&self) -> StaticDirectory {
        StaticDirectory::new(self.directory.clone())
    }
}

/// `--data-dir` wins over `DT_DATA_DIR`, which wins over the platform default
pub fn resolve_data_dir(
    flag: Option<PathBuf>,
    env: Option<String>,
    platform: Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir);
    }
    if let Some(dir) = env.filter(|d| !d.trim().is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    platform
        .map(|d| d.join("deploytrack"))
        .ok_or_else(|| anyhow!("no data directory; pass --data-dir or set {}", DATA_DIR_ENV))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
