//! Configuration for Mimir.
//!
//! Loaded from a TOML file; every field has a default so a missing or
//! partial file still produces a working configuration.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Default config file name, looked up in the data directory.
pub const CONFIG_FILE_NAME: &str = "mimir.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Knowledge base JSON document.
    #[serde(default = "default_knowledge_path")]
    pub knowledge_path: PathBuf,

    /// Transcript JSON document.
    #[serde(default = "default_transcript_path")]
    pub transcript_path: PathBuf,

    /// Persisted vector model cache.
    #[serde(default = "default_model_cache_path")]
    pub model_cache_path: PathBuf,

    /// Health probe command and arguments.
    #[serde(default = "default_probe_command")]
    pub probe_command: Vec<String>,

    /// Bounded wait for the probe process.
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
}

/// Per-user data directory, falling back to the working directory when the
/// platform directories cannot be resolved.
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("mimir"))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_knowledge_path() -> PathBuf {
    data_dir().join("knowledge.json")
}

fn default_transcript_path() -> PathBuf {
    data_dir().join("chat_history.json")
}

fn default_model_cache_path() -> PathBuf {
    data_dir().join("vector_model.json")
}

fn default_probe_command() -> Vec<String> {
    vec!["health-probe".to_string()]
}

fn default_probe_timeout() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            knowledge_path: default_knowledge_path(),
            transcript_path: default_transcript_path(),
            model_cache_path: default_model_cache_path(),
            probe_command: default_probe_command(),
            probe_timeout_secs: default_probe_timeout(),
        }
    }
}

impl Config {
    /// Load from `path`, or from the default location when `None`.
    ///
    /// A missing file yields defaults. A malformed file is logged and also
    /// yields defaults; configuration problems never stop the assistant.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| data_dir().join(CONFIG_FILE_NAME));

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        match toml::from_str(&raw) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                Ok(config)
            }
            Err(e) => {
                warn!("Ignoring malformed config {}: {}", path.display(), e);
                Ok(Self::default())
            }
        }
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("none.toml"))).unwrap();
        assert_eq!(config.probe_timeout_secs, 10);
        assert_eq!(config.probe_command, vec!["health-probe".to_string()]);
    }

    #[test]
    fn partial_file_fills_remaining_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mimir.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "probe_timeout_secs = 3").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.probe_timeout_secs, 3);
        assert_eq!(config.probe_command, vec!["health-probe".to_string()]);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mimir.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "probe_timeout_secs = \"soon\"").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.probe_timeout_secs, 10);
    }
}
