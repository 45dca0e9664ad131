//! Reelvault - media ingest pipeline.
//!
//! Walks an ingest tree, transcodes every file into an encode workspace,
//! moves each original into a mirrored archive tree, then syncs the workspace
//! to an object-storage bucket. This library crate exposes the stages for
//! the binary and for integration testing.

pub mod archive;
pub mod cli;
pub mod config;
pub mod controller;
pub mod ingest;
pub mod sync;

#[cfg(test)]
mod testing;
