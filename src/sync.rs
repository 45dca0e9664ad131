//! Uploading the encode workspace to the bucket.

use reelvault_av::{path_arg, ProcessRunner, ToolCommand};
use reelvault_core::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use walkdir::WalkDir;

/// File names removed from the workspace before it is uploaded.
pub const STRIP_BEFORE_SYNC: &[&str] = &[".DS_Store"];

/// Arguments for `aws` syncing `workspace` to `bucket`.
pub fn sync_args(workspace: &Path, bucket: &str, storage_class: &str) -> Result<Vec<String>> {
    Ok(vec![
        "s3".to_string(),
        "sync".to_string(),
        path_arg(workspace)?,
        bucket.to_string(),
        "--storage-class".to_string(),
        storage_class.to_string(),
    ])
}

/// Recursively delete files named in [`STRIP_BEFORE_SYNC`] under `workspace`.
///
/// The tree is listed on the blocking pool. Returns how many files were
/// removed.
pub async fn strip_metadata(workspace: &Path) -> Result<usize> {
    let root = workspace.to_path_buf();
    let stray = tokio::task::spawn_blocking(move || find_stray(&root))
        .await
        .map_err(|e| Error::file_system("walk", workspace, std::io::Error::other(e)))??;

    for path in &stray {
        debug!("Stripping {}", path.display());
        tokio::fs::remove_file(path)
            .await
            .map_err(|e| Error::file_system("remove", path, e))?;
    }

    Ok(stray.len())
}

fn find_stray(workspace: &Path) -> Result<Vec<PathBuf>> {
    let mut stray = Vec::new();

    for entry in WalkDir::new(workspace) {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| workspace.to_path_buf());
            Error::file_system("walk", path, e.into())
        })?;

        let strip = entry
            .file_name()
            .to_str()
            .is_some_and(|name| STRIP_BEFORE_SYNC.contains(&name));
        if entry.file_type().is_file() && strip {
            stray.push(entry.into_path());
        }
    }

    Ok(stray)
}

/// Strips metadata files and hands the workspace to the bucket sync tool.
pub struct SyncStage {
    runner: Arc<dyn ProcessRunner>,
    aws: PathBuf,
    storage_class: String,
}

impl SyncStage {
    pub fn new(runner: Arc<dyn ProcessRunner>, aws: PathBuf, storage_class: impl Into<String>) -> Self {
        Self {
            runner,
            aws,
            storage_class: storage_class.into(),
        }
    }

    pub async fn sync(&self, workspace: &Path, bucket: &str) -> Result<()> {
        let stripped = strip_metadata(workspace).await?;
        if stripped > 0 {
            debug!("Stripped {stripped} metadata file(s) from {}", workspace.display());
        }

        let args = sync_args(workspace, bucket, &self.storage_class)?;
        info!("Syncing {} to {bucket}", workspace.display());

        let mut cmd = ToolCommand::new(&self.aws);
        cmd.args(args);
        self.runner.run(&cmd).await
    }
}
