//! External tool discovery.
//!
//! [`ToolPaths`] resolves the encoder and bucket sync executables once per
//! run. A configured path wins when it exists, otherwise `PATH` is searched.

use std::path::{Path, PathBuf};

use reelvault_core::config::ToolsConfig;

/// Executable name of the encoder.
pub const FFMPEG: &str = "ffmpeg";

/// Executable name of the bucket sync tool.
pub const AWS: &str = "aws";

/// Resolved executable locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub ffmpeg: PathBuf,
    pub aws: PathBuf,
}

impl ToolPaths {
    /// Resolve every tool from `config`, falling back to a `PATH` lookup.
    ///
    /// A tool that cannot be found anywhere keeps its bare name; the failure
    /// then surfaces as a spawn error on first use.
    pub fn discover(config: &ToolsConfig) -> Self {
        Self {
            ffmpeg: resolve(FFMPEG, config.ffmpeg_path.as_deref()),
            aws: resolve(AWS, config.aws_path.as_deref()),
        }
    }
}

fn resolve(name: &str, configured: Option<&Path>) -> PathBuf {
    if let Some(path) = configured {
        if path.exists() {
            return path.to_path_buf();
        }
        tracing::warn!(
            "Configured {name} path {} does not exist; searching PATH",
            path.display()
        );
    }

    match which::which(name) {
        Ok(path) => path,
        Err(_) => {
            tracing::warn!("{name} not found in PATH; is it installed?");
            PathBuf::from(name)
        }
    }
}
