//! Ingest tree traversal.
//!
//! The walker lists every regular file under the ingest root, then runs the
//! transcode-then-archive sequence on each one in order. The first failure
//! aborts the walk: files already archived stay archived, later files stay
//! in the ingest tree for the next run.

pub mod task;

pub use task::FileTask;

use crate::archive::archive;
use reelvault_av::Transcoder;
use reelvault_core::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// File names the walker never touches.
pub const IGNORED_NAMES: &[&str] = &[".DS_Store"];

/// Files found under the ingest root.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Eligible files in traversal order.
    pub tasks: Vec<FileTask>,
    /// Regular files skipped because their name is in [`IGNORED_NAMES`].
    pub ignored: usize,
}

/// Outcome of a completed walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub processed: usize,
    pub ignored: usize,
}

/// Drives transcode-then-archive over the ingest tree.
pub struct IngestWalker {
    ingest_root: PathBuf,
    encode_root: PathBuf,
    archive_root: PathBuf,
    transcoder: Transcoder,
}

impl IngestWalker {
    pub fn new(
        ingest_root: impl Into<PathBuf>,
        encode_root: impl Into<PathBuf>,
        archive_root: impl Into<PathBuf>,
        transcoder: Transcoder,
    ) -> Self {
        Self {
            ingest_root: ingest_root.into(),
            encode_root: encode_root.into(),
            archive_root: archive_root.into(),
            transcoder,
        }
    }

    /// List eligible files without touching anything.
    ///
    /// Entries within a directory are visited in file name order, so the
    /// result is stable for a given tree. Symlinks and other non-regular
    /// entries are skipped.
    pub fn discover(&self) -> Result<Discovery> {
        discover_tree(&self.ingest_root, &self.encode_root, &self.archive_root)
    }

    /// Transcode and archive every eligible file, stopping at the first error.
    pub async fn process(&self) -> Result<IngestSummary> {
        info!("Scanning {}", self.ingest_root.display());
        let (ingest_root, encode_root, archive_root) = (
            self.ingest_root.clone(),
            self.encode_root.clone(),
            self.archive_root.clone(),
        );
        let Discovery { tasks, ignored } =
            tokio::task::spawn_blocking(move || {
                discover_tree(&ingest_root, &encode_root, &archive_root)
            })
                .await
                .map_err(|e| {
                    Error::file_system("walk", &self.ingest_root, std::io::Error::other(e))
                })??;
        info!("Found {} file(s) to ingest", tasks.len());

        let mut summary = IngestSummary {
            processed: 0,
            ignored,
        };

        for task in &tasks {
            self.process_task(task).await?;
            summary.processed += 1;
        }

        Ok(summary)
    }

    async fn process_task(&self, task: &FileTask) -> Result<()> {
        info!(
            "Encoding {} to {}...",
            task.relative().display(),
            task.relative_output().display()
        );

        self.transcoder.encode(task.source(), task.output()).await?;
        archive(task.source(), task.archive()).await?;

        info!("Done: {}", task.relative().display());
        Ok(())
    }
}

fn discover_tree(ingest_root: &Path, encode_root: &Path, archive_root: &Path) -> Result<Discovery> {
    let mut discovery = Discovery::default();

    for entry in WalkDir::new(ingest_root).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| ingest_root.to_path_buf());
            Error::file_system("walk", path, e.into())
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        if is_ignored(entry.file_name()) {
            debug!("Ignoring {}", entry.path().display());
            discovery.ignored += 1;
            continue;
        }

        discovery.tasks.push(FileTask::derive(
            ingest_root,
            entry.path(),
            encode_root,
            archive_root,
        )?);
    }

    Ok(discovery)
}

fn is_ignored(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|name| IGNORED_NAMES.contains(&name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeRunner;
    use assert_matches::assert_matches;
    use reelvault_av::CaptureSinks;
    use std::fs;
    use std::sync::Arc;

    struct Trees {
        _dir: tempfile::TempDir,
        ingest: PathBuf,
        encode: PathBuf,
        archive: PathBuf,
    }

    fn trees(files: &[&str]) -> Trees {
        let dir = tempfile::tempdir().unwrap();
        let ingest = dir.path().join("in");
        for file in files {
            let path = ingest.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, format!("original {file}")).unwrap();
        }
        fs::create_dir_all(&ingest).unwrap();

        Trees {
            encode: dir.path().join("enc"),
            archive: dir.path().join("arc"),
            ingest,
            _dir: dir,
        }
    }

    fn walker(trees: &Trees, runner: Arc<FakeRunner>) -> IngestWalker {
        let transcoder = Transcoder::new(runner, PathBuf::from("ffmpeg"), CaptureSinks::default());
        IngestWalker::new(&trees.ingest, &trees.encode, &trees.archive, transcoder)
    }

    #[test]
    fn discover_skips_ignored_and_directories() {
        let t = trees(&["b.mov", "a.mov", ".DS_Store", "sub/c.mov", "sub/.DS_Store"]);
        fs::create_dir_all(t.ingest.join("empty")).unwrap();

        let discovery = walker(&t, Arc::new(FakeRunner::new())).discover().unwrap();

        let relatives: Vec<_> = discovery
            .tasks
            .iter()
            .map(|task| task.relative().to_path_buf())
            .collect();
        assert_eq!(
            relatives,
            [
                PathBuf::from("a.mov"),
                PathBuf::from("b.mov"),
                PathBuf::from("sub/c.mov"),
            ]
        );
        assert_eq!(discovery.ignored, 2);
    }

    #[cfg(unix)]
    #[test]
    fn discover_skips_symlinks() {
        let t = trees(&["a.mov"]);
        std::os::unix::fs::symlink(t.ingest.join("a.mov"), t.ingest.join("link.mov")).unwrap();

        let discovery = walker(&t, Arc::new(FakeRunner::new())).discover().unwrap();
        assert_eq!(discovery.tasks.len(), 1);
    }

    #[tokio::test]
    async fn process_encodes_then_archives_every_file() {
        let t = trees(&["a.mov", "sub/b.mov", ".DS_Store"]);
        let runner = Arc::new(FakeRunner::new());

        let summary = walker(&t, runner.clone()).process().await.unwrap();

        assert_eq!(summary, IngestSummary { processed: 2, ignored: 1 });
        assert!(t.encode.join("a.mp4").is_file());
        assert!(t.encode.join("sub/b.mp4").is_file());
        assert_eq!(
            fs::read_to_string(t.archive.join("sub/b.mov")).unwrap(),
            "original sub/b.mov"
        );
        assert!(!t.ingest.join("a.mov").exists());
        assert!(!t.ingest.join("sub/b.mov").exists());
        assert!(t.ingest.join(".DS_Store").exists());
        assert!(!t.archive.join(".DS_Store").exists());
        assert_eq!(runner.encoder_inputs().len(), 2);
    }

    #[tokio::test]
    async fn encode_failure_aborts_walk() {
        let t = trees(&["a.mov", "b.mov", "c.mov"]);
        let runner = Arc::new(FakeRunner::new().failing_on("b.mov"));

        let err = walker(&t, runner.clone()).process().await.unwrap_err();

        assert_matches!(err, Error::ExternalCommand { .. });
        assert!(t.archive.join("a.mov").exists());
        assert!(t.ingest.join("b.mov").exists());
        assert!(!t.archive.join("b.mov").exists());
        assert!(t.ingest.join("c.mov").exists());
        assert_eq!(runner.encoder_inputs().len(), 2);
    }

    #[tokio::test]
    async fn missing_ingest_root_is_walk_error() {
        let t = trees(&[]);
        fs::remove_dir(&t.ingest).unwrap();
        let runner = Arc::new(FakeRunner::new());

        let err = walker(&t, runner.clone()).process().await.unwrap_err();

        assert_matches!(err, Error::FileSystem { ref action, .. } if action == "walk");
        assert!(runner.encoder_inputs().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_utf8_name_aborts_before_any_encode() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let t = trees(&["a.mov"]);
        fs::write(t.ingest.join(OsStr::from_bytes(b"b\xff.mov")), "original").unwrap();
        let runner = Arc::new(FakeRunner::new());

        let err = walker(&t, runner.clone()).process().await.unwrap_err();

        assert_matches!(err, Error::FileSystem { .. });
        assert!(runner.encoder_inputs().is_empty());
        assert!(t.ingest.join("a.mov").exists());
        assert!(!t.archive.exists());
    }

    #[tokio::test]
    async fn archive_failure_aborts_walk() {
        let t = trees(&["a.mov", "b.mov"]);
        fs::create_dir_all(&t.archive).unwrap();
        fs::write(t.archive.join("a.mov"), "earlier run").unwrap();
        let runner = Arc::new(FakeRunner::new());

        let err = walker(&t, runner.clone()).process().await.unwrap_err();

        assert_matches!(err, Error::FileSystem { .. });
        assert!(t.ingest.join("a.mov").exists());
        assert!(t.ingest.join("b.mov").exists());
        assert_eq!(runner.encoder_inputs().len(), 1);
    }
}
