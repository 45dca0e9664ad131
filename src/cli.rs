use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "reelvault")]
#[command(
    author,
    version,
    about = "Transcode an ingest tree, archive the originals and sync the encodes to a bucket"
)]
pub struct Cli {
    /// Folder to ingest (required)
    #[arg(long, value_name = "DIR")]
    pub ingest: Option<PathBuf>,

    /// Bucket destination handed to `aws s3 sync` (required)
    #[arg(long, value_name = "DESTINATION")]
    pub bucket: Option<String>,

    /// Folder receiving the originals after encoding (required)
    #[arg(long, value_name = "DIR")]
    pub archive: Option<PathBuf>,

    /// Folder to keep encodes in; a temporary folder is used and removed if omitted
    #[arg(long, value_name = "DIR")]
    pub encode: Option<PathBuf>,

    /// Write the encoder's standard output to this file
    #[arg(long, value_name = "FILE")]
    pub debug_stdout: Option<PathBuf>,

    /// Write the encoder's standard error to this file
    #[arg(long, value_name = "FILE")]
    pub debug_stderr: Option<PathBuf>,

    /// Path to a TOML config file providing defaults for the flags above
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
