//! Optional user settings file.
//!
//! Lives at `<config_dir>/introcheck/config.toml` unless `--config` points
//! elsewhere. Command-line flags and environment variables always win over
//! values from the file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::exit_codes::EXIT_USAGE;
use crate::CliError;

/// Fallback task poll interval.
pub const DEFAULT_POLL_SECS: u64 = 10;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Server address including scheme, e.g. `http://127.0.0.1:8096`.
    pub address: Option<String>,
    pub api_key: Option<String>,
    pub poll_interval_secs: Option<u64>,
    /// Directory for generated files when no explicit destination is given.
    pub output_dir: Option<PathBuf>,
}

impl Settings {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("introcheck")
            .join("config.toml")
    }

    /// Load settings. A missing default file yields empty settings; a missing
    /// explicit file is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self, CliError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = Self::default_path();
                if !path.exists() {
                    return Ok(Self::default());
                }
                path
            }
        };

        let text = fs::read_to_string(&path).map_err(|e| {
            CliError::usage(format!("cannot read settings file {}: {}", path.display(), e))
        })?;
        log::debug!("loaded settings from {}", path.display());
        Self::parse(&text).map_err(|e| CliError {
            code: EXIT_USAGE,
            message: format!("invalid settings file {}: {}", path.display(), e),
            hint: Some("see `introcheck --help` for the supported keys".to_string()),
        })
    }

    pub fn parse(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|e| e.message().to_string())
    }

    /// Resolve the server address: flag/env value first, then the file.
    pub fn address(&self, flag: Option<String>) -> Result<String, CliError> {
        flag.or_else(|| self.address.clone())
            .filter(|a| !a.trim().is_empty())
            .ok_or_else(|| {
                CliError::usage("no server address given")
                    .with_hint("pass --address, set INTROCHECK_ADDRESS or add `address` to the settings file")
            })
    }

    pub fn api_key(&self, flag: Option<String>) -> Result<String, CliError> {
        flag.or_else(|| self.api_key.clone())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                CliError::usage("no API key given")
                    .with_hint("pass --key, set INTROCHECK_API_KEY or add `api_key` to the settings file")
            })
    }

    pub fn poll_interval(&self, flag: Option<u64>) -> Duration {
        Duration::from_secs(
            flag.or(self.poll_interval_secs)
                .unwrap_or(DEFAULT_POLL_SECS),
        )
    }

    /// Place `file_name` in the configured output directory, if any.
    pub fn output_path(&self, file_name: &str) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        }
    }
}
