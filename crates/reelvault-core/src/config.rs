//! File-backed configuration.
//!
//! The top-level [`Config`] is deserialized from TOML. Every section is
//! optional so an empty file is valid; command-line flags are layered on top
//! by the binary, which also enforces the required settings.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::Error;

/// Storage class requested for objects uploaded by the bucket sync.
pub const DEFAULT_STORAGE_CLASS: &str = "INTELLIGENT_TIERING";

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub debug: DebugConfig,
    pub tools: ToolsConfig,
    pub sync: SyncConfig,
}

impl Config {
    /// Deserialize a `Config` from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str)
            .map_err(|e| Error::configuration(format!("config parse error: {e}")))
    }

    /// Load and parse a configuration file, expanding `~` in path values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration(format!(
                "failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        let mut config = Self::from_toml(&contents)?;
        config.expand_paths();
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    fn expand_paths(&mut self) {
        for slot in [
            &mut self.paths.ingest,
            &mut self.paths.archive,
            &mut self.paths.encode,
            &mut self.debug.stdout,
            &mut self.debug.stderr,
            &mut self.tools.ffmpeg_path,
            &mut self.tools.aws_path,
        ] {
            if let Some(path) = slot.take() {
                *slot = Some(expand_tilde(path));
            }
        }
    }
}

fn expand_tilde(path: PathBuf) -> PathBuf {
    match path.to_str() {
        Some(s) => PathBuf::from(shellexpand::tilde(s).as_ref()),
        None => path,
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Locations of the trees a run reads and writes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Source tree scanned for files to transcode.
    pub ingest: Option<PathBuf>,
    /// Remote bucket destination, passed through to the sync tool untouched.
    pub bucket: Option<String>,
    /// Tree receiving originals after a successful transcode.
    pub archive: Option<PathBuf>,
    /// Persistent encode workspace. When unset a temporary one is used.
    pub encode: Option<PathBuf>,
}

/// Files receiving the encoder's captured output streams.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub stdout: Option<PathBuf>,
    pub stderr: Option<PathBuf>,
}

/// Explicit executable locations; tools left unset are looked up on `PATH`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg_path: Option<PathBuf>,
    pub aws_path: Option<PathBuf>,
}

/// Bucket sync options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Storage class for newly uploaded objects.
    pub storage_class: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            storage_class: DEFAULT_STORAGE_CLASS.to_string(),
        }
    }
}
