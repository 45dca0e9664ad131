//! Unified error type for the ingest pipeline.
//!
//! None of these errors is retried. They all propagate to the program
//! controller, which finalizes the encode workspace and exits with
//! [`Error::exit_code`].

use std::path::{Path, PathBuf};

/// Every failure mode of a reelvault run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required setting is missing or invalid. Raised before any directory
    /// is created or any process is spawned.
    #[error("{0}")]
    Configuration(String),

    /// An external process (encoder, bucket sync) could not be started or
    /// exited unsuccessfully.
    #[error("Failed to run command {command} {args:?}: {reason}")]
    ExternalCommand {
        /// Program that was invoked.
        command: String,
        /// Arguments passed to the program.
        args: Vec<String>,
        /// Exit status or spawn failure description.
        reason: String,
    },

    /// Directory creation, move, removal or traversal failed.
    #[error("Failed to {action} {}: {source}", path.display())]
    FileSystem {
        /// What was being attempted, e.g. "create directory".
        action: String,
        /// The path the operation was applied to.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Convenience constructor for [`Error::Configuration`].
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }

    /// Convenience constructor for [`Error::ExternalCommand`].
    pub fn external_command(
        command: impl Into<String>,
        args: &[String],
        reason: impl Into<String>,
    ) -> Self {
        Error::ExternalCommand {
            command: command.into(),
            args: args.to_vec(),
            reason: reason.into(),
        }
    }

    /// Convenience constructor for [`Error::FileSystem`].
    pub fn file_system(
        action: impl Into<String>,
        path: impl AsRef<Path>,
        source: std::io::Error,
    ) -> Self {
        Error::FileSystem {
            action: action.into(),
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Whether this error should be accompanied by usage help.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }

    /// Process exit status to report for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Configuration(_) => 1,
            Error::ExternalCommand { .. } => 1,
            Error::FileSystem { .. } => 1,
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
