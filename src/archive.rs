//! Moving transcoded originals into the archive tree.

use reelvault_core::{Error, Result};
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;

/// Move `source` to `destination`, creating missing ancestor directories.
///
/// Only called after `source` was transcoded. An existing `destination` is
/// never overwritten and the file is never copied: a rename that fails,
/// including one across filesystems, is an error and leaves `source` where
/// it was.
pub async fn archive(source: &Path, destination: &Path) -> Result<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::file_system("create directory", parent, e))?;
    }

    match fs::symlink_metadata(destination).await {
        Ok(_) => {
            return Err(Error::file_system(
                "archive to",
                destination,
                std::io::Error::new(ErrorKind::AlreadyExists, "destination already exists"),
            ));
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(Error::file_system("inspect", destination, e)),
    }

    fs::rename(source, destination)
        .await
        .map_err(|e| Error::file_system("move", source, e))
}
