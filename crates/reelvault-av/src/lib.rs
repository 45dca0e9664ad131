//! # reelvault-av
//!
//! External process plumbing for the reelvault pipeline.
//!
//! This crate provides:
//!
//! - **Command execution** ([`ProcessRunner`], [`SystemRunner`]) -- run an
//!   external program to completion, optionally teeing its output streams
//!   into capture files.
//! - **Tool discovery** ([`ToolPaths`]) -- resolve the encoder and bucket sync
//!   executables from configuration or `PATH`.
//! - **Transcoding** ([`Transcoder`]) -- the fixed ffmpeg profile applied to
//!   every ingested file.
//! - **Workspace management** ([`Workspace`]) -- persistent or temporary
//!   encode directory with a single idempotent finalization.

pub mod command;
pub mod tools;
pub mod transcode;
pub mod workspace;

pub use command::{path_arg, CaptureSinks, ProcessRunner, SystemRunner, ToolCommand};
pub use tools::ToolPaths;
pub use transcode::{encoder_args, Transcoder, OUTPUT_EXTENSION};
pub use workspace::Workspace;
