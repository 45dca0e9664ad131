//! In-process stand-in for the encoder and bucket sync tools.

use async_trait::async_trait;
use reelvault_av::{CaptureSinks, ProcessRunner, ToolCommand};
use reelvault_core::Result;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use walkdir::WalkDir;

/// Records every invocation.
///
/// Captured runs behave like the encoder: the last argument is the output
/// file, written with a marker naming the `-i` input. Plain runs behave like
/// the sync tool: the workspace (third argument) is listed at call time.
#[derive(Default)]
pub(crate) struct FakeRunner {
    encodes: Mutex<Vec<ToolCommand>>,
    syncs: Mutex<Vec<ToolCommand>>,
    synced: Mutex<Vec<PathBuf>>,
    fail_on: Option<String>,
    fail_sync: bool,
}

impl FakeRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Fail encodes whose input path ends with `suffix`, after writing a
    /// partial output.
    pub(crate) fn failing_on(mut self, suffix: &str) -> Self {
        self.fail_on = Some(suffix.to_string());
        self
    }

    pub(crate) fn failing_sync(mut self) -> Self {
        self.fail_sync = true;
        self
    }

    pub(crate) fn encoder_inputs(&self) -> Vec<PathBuf> {
        self.encodes
            .lock()
            .unwrap()
            .iter()
            .filter_map(|cmd| input_of(cmd).map(PathBuf::from))
            .collect()
    }

    pub(crate) fn sync_calls(&self) -> Vec<ToolCommand> {
        self.syncs.lock().unwrap().clone()
    }

    /// Workspace-relative files present when the sync tool ran, sorted.
    pub(crate) fn synced_files(&self) -> Vec<PathBuf> {
        self.synced.lock().unwrap().clone()
    }
}

fn input_of(cmd: &ToolCommand) -> Option<&str> {
    let args = cmd.arguments();
    args.iter()
        .position(|arg| arg == "-i")
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

#[async_trait]
impl ProcessRunner for FakeRunner {
    async fn run(&self, command: &ToolCommand) -> Result<()> {
        self.syncs.lock().unwrap().push(command.clone());

        if let Some(workspace) = command.arguments().get(2).map(Path::new) {
            let mut files: Vec<PathBuf> = WalkDir::new(workspace)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file())
                .filter_map(|entry| {
                    entry
                        .path()
                        .strip_prefix(workspace)
                        .ok()
                        .map(Path::to_path_buf)
                })
                .collect();
            files.sort();
            *self.synced.lock().unwrap() = files;
        }

        if self.fail_sync {
            return Err(command.failure("exited with exit status: 1"));
        }
        Ok(())
    }

    async fn run_captured(&self, command: &ToolCommand, _sinks: &CaptureSinks) -> Result<()> {
        self.encodes.lock().unwrap().push(command.clone());

        let input = input_of(command).unwrap_or_default().to_string();
        let output = command.arguments().last().cloned().unwrap_or_default();
        let failing = self
            .fail_on
            .as_deref()
            .is_some_and(|suffix| input.ends_with(suffix));

        if failing {
            std::fs::write(&output, "partial").unwrap();
            return Err(command.failure("exited with exit status: 1"));
        }

        std::fs::write(&output, format!("encoded {input}")).unwrap();
        Ok(())
    }
}
