// SPDX-FileCopyrightText: © 2026 PrivKey LLC
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};

use quorum_core::error::{QuorumError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        };
        f.write_str(s)
    }
}

fn deserialize_path<'de, D>(deserializer: D) -> std::result::Result<Option<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)
        .map(|opt| opt.map(|s| PathBuf::from(shellexpand::tilde(&s).as_ref())))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default, deserialize_with = "deserialize_path")]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        const MAX_CONFIG_SIZE: u64 = 1024 * 1024; // 1 MB
        let metadata = std::fs::metadata(path).map_err(|e| {
            QuorumError::Other(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        if metadata.len() > MAX_CONFIG_SIZE {
            return Err(QuorumError::Other("Config file too large".into()));
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            QuorumError::Other(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| QuorumError::Other(format!("Invalid config: {}", e)))
    }

    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("quorum").join("config.toml"))
            .ok_or_else(|| QuorumError::Other("could not determine config directory".into()))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(p) => Ok(p.clone()),
            None => dirs::home_dir()
                .map(|h| h.join(".quorum"))
                .ok_or_else(|| QuorumError::Other("could not determine home directory".into())),
        }
    }
}
