//! Per-file work items.

use reelvault_av::{path_arg, OUTPUT_EXTENSION};
use reelvault_core::{Error, Result};
use std::path::{Path, PathBuf};

/// One discovered ingest file and the paths derived from it.
///
/// `output` and `archive` mirror `relative` under the encode workspace and
/// the archive root; `output` has its extension replaced with
/// [`OUTPUT_EXTENSION`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    relative: PathBuf,
    source: PathBuf,
    output: PathBuf,
    archive: PathBuf,
}

impl FileTask {
    /// Derive the task for `source`, which must lie under `ingest_root`.
    ///
    /// The source and output paths are handed to the encoder as arguments,
    /// so both must be valid UTF-8.
    pub fn derive(
        ingest_root: &Path,
        source: &Path,
        encode_root: &Path,
        archive_root: &Path,
    ) -> Result<Self> {
        let relative = source
            .strip_prefix(ingest_root)
            .map_err(|_| {
                Error::file_system(
                    "relativize",
                    source,
                    std::io::Error::other(format!("not under {}", ingest_root.display())),
                )
            })?
            .to_path_buf();

        let output = encode_root.join(relative.with_extension(OUTPUT_EXTENSION));
        path_arg(source)?;
        path_arg(&output)?;

        Ok(Self {
            source: source.to_path_buf(),
            output,
            archive: archive_root.join(&relative),
            relative,
        })
    }

    /// Path relative to the ingest root.
    pub fn relative(&self) -> &Path {
        &self.relative
    }

    /// Relative path of the encoder output.
    pub fn relative_output(&self) -> PathBuf {
        self.relative.with_extension(OUTPUT_EXTENSION)
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn archive(&self) -> &Path {
        &self.archive
    }
}
