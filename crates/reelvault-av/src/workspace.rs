//! Encode workspace lifecycle.
//!
//! The workspace is the directory the transcoder writes into and the bucket
//! sync uploads from. It is either a caller-supplied directory that outlives
//! the run, or a temporary directory owned by the run and removed by
//! [`Workspace::finalize`].

use std::path::{Path, PathBuf};

use reelvault_core::{Error, Result};
use tempfile::TempDir;

/// Prefix of temporary workspace directory names.
pub const TEMP_PREFIX: &str = "reelvault-encode-";

/// The encode directory of one run.
///
/// # Example
///
/// ```no_run
/// use reelvault_av::Workspace;
///
/// let mut workspace = Workspace::from_option(None).unwrap();
/// // ... write encodes under workspace.path() ...
/// workspace.finalize().unwrap();
/// assert!(!workspace.path().exists());
/// ```
#[derive(Debug)]
pub enum Workspace {
    /// Caller-supplied directory; never deleted.
    Persistent(PathBuf),
    /// Temporary directory owned by this run. `dir` is `None` once finalized.
    Ephemeral { path: PathBuf, dir: Option<TempDir> },
}

impl Workspace {
    /// Adopt `path` as a persistent workspace, creating it if missing.
    pub fn persistent(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        std::fs::create_dir_all(&path)
            .map_err(|e| Error::file_system("create encode directory", &path, e))?;
        Ok(Workspace::Persistent(path))
    }

    /// Allocate a uniquely named temporary workspace.
    pub fn ephemeral() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempdir()
            .map_err(|e| Error::file_system("create temporary directory", std::env::temp_dir(), e))?;

        Ok(Workspace::Ephemeral {
            path: dir.path().to_path_buf(),
            dir: Some(dir),
        })
    }

    /// Persistent when `path` is given, ephemeral otherwise.
    pub fn from_option(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::persistent(path),
            None => Self::ephemeral(),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Workspace::Persistent(path) => path,
            Workspace::Ephemeral { path, .. } => path,
        }
    }

    pub fn is_ephemeral(&self) -> bool {
        matches!(self, Workspace::Ephemeral { .. })
    }

    /// Recursively delete an ephemeral workspace.
    ///
    /// Idempotent: later calls, and a directory that has already disappeared,
    /// are not errors. A persistent workspace is left untouched.
    pub fn finalize(&mut self) -> Result<()> {
        let Workspace::Ephemeral { path, dir } = self else {
            return Ok(());
        };
        let Some(dir) = dir.take() else {
            return Ok(());
        };

        match dir.close() {
            Ok(()) => {
                tracing::debug!("Removed encode workspace {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::file_system("remove encode workspace", &*path, e)),
        }
    }
}
