mod types;

pub use types::*;

use crate::cli::Cli;
use reelvault_av::CaptureSinks;
use reelvault_core::config::Config;
use reelvault_core::{Error, Result};
use std::path::PathBuf;

/// Resolve the run configuration from the command line and, if given, the
/// config file it names.
///
/// Nothing is created or spawned here; every error is a
/// [`Error::Configuration`].
pub fn resolve(cli: &Cli) -> Result<RunConfig> {
    let file = match cli.config.as_deref() {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    merge(cli, file)
}

/// Layer command-line values over `file` and validate the result.
pub fn merge(cli: &Cli, file: Config) -> Result<RunConfig> {
    let Config {
        paths,
        debug,
        tools,
        sync,
    } = file;

    let ingest = non_empty_path(cli.ingest.clone().or(paths.ingest))
        .ok_or_else(|| Error::configuration("Ingest folder required"))?;

    let bucket = cli
        .bucket
        .clone()
        .or(paths.bucket)
        .filter(|bucket| !bucket.is_empty())
        .ok_or_else(|| Error::configuration("Bucket required"))?;

    let archive = non_empty_path(cli.archive.clone().or(paths.archive))
        .ok_or_else(|| Error::configuration("Archive folder required"))?;

    if !ingest.is_dir() {
        return Err(Error::configuration(format!(
            "Ingest folder {} is not a directory",
            ingest.display()
        )));
    }

    let debug = CaptureSinks::new(
        non_empty_path(cli.debug_stdout.clone().or(debug.stdout)),
        non_empty_path(cli.debug_stderr.clone().or(debug.stderr)),
    );

    Ok(RunConfig {
        ingest,
        bucket,
        archive,
        encode: non_empty_path(cli.encode.clone().or(paths.encode)),
        debug,
        tools,
        storage_class: sync.storage_class,
    })
}

fn non_empty_path(path: Option<PathBuf>) -> Option<PathBuf> {
    path.filter(|p| !p.as_os_str().is_empty())
}
