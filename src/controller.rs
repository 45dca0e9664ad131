//! Program controller.
//!
//! Runs the stages of one invocation in order and owns the encode workspace,
//! which is finalized on every exit path from [`Controller::run`].

use crate::config::RunConfig;
use crate::ingest::{IngestSummary, IngestWalker};
use crate::sync::SyncStage;
use reelvault_av::{ProcessRunner, ToolPaths, Transcoder, Workspace};
use reelvault_core::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Stage of a run.
///
/// `Configuring` covers everything up to and including workspace creation.
/// `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Configuring,
    Walking,
    Syncing,
    Finalizing,
    Completed,
    Failed,
}

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub processed: usize,
    pub ignored: usize,
    pub workspace: PathBuf,
    pub ephemeral: bool,
}

pub struct Controller {
    config: RunConfig,
    runner: Arc<dyn ProcessRunner>,
    tools: ToolPaths,
    workspace: Workspace,
    state: RunState,
}

impl Controller {
    /// Resolve tools and create or adopt the encode workspace.
    pub fn new(config: RunConfig, runner: Arc<dyn ProcessRunner>) -> Result<Self> {
        let tools = ToolPaths::discover(&config.tools);
        debug!("Using ffmpeg at {}", tools.ffmpeg.display());
        debug!("Using aws at {}", tools.aws.display());

        let workspace = Workspace::from_option(config.encode.as_deref())?;
        info!(
            "Encode workspace: {}{}",
            workspace.path().display(),
            if workspace.is_ephemeral() { " (temporary)" } else { "" }
        );

        Ok(Self {
            config,
            runner,
            tools,
            workspace,
            state: RunState::Configuring,
        })
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Walk, sync, then finalize the workspace regardless of the outcome.
    ///
    /// When both the run and the cleanup fail, the run's error is returned
    /// and the cleanup failure is logged.
    pub async fn run(&mut self) -> Result<RunReport> {
        let outcome = self.execute().await;

        self.transition(RunState::Finalizing);
        let cleanup = self.workspace.finalize();

        match (outcome, cleanup) {
            (Ok(summary), Ok(())) => {
                self.transition(RunState::Completed);
                Ok(RunReport {
                    processed: summary.processed,
                    ignored: summary.ignored,
                    workspace: self.workspace.path().to_path_buf(),
                    ephemeral: self.workspace.is_ephemeral(),
                })
            }
            (Ok(_), Err(cleanup_err)) => {
                self.transition(RunState::Failed);
                Err(cleanup_err)
            }
            (Err(err), cleanup) => {
                if let Err(cleanup_err) = cleanup {
                    warn!("Workspace cleanup also failed: {cleanup_err}");
                }
                self.transition(RunState::Failed);
                Err(err)
            }
        }
    }

    async fn execute(&mut self) -> Result<IngestSummary> {
        self.config.debug.reset().await?;

        self.transition(RunState::Walking);
        let transcoder = Transcoder::new(
            Arc::clone(&self.runner),
            self.tools.ffmpeg.clone(),
            self.config.debug.clone(),
        );
        let walker = IngestWalker::new(
            &self.config.ingest,
            self.workspace.path(),
            &self.config.archive,
            transcoder,
        );
        let summary = walker.process().await?;

        self.transition(RunState::Syncing);
        SyncStage::new(
            Arc::clone(&self.runner),
            self.tools.aws.clone(),
            self.config.storage_class.as_str(),
        )
        .sync(self.workspace.path(), &self.config.bucket)
        .await?;

        Ok(summary)
    }

    fn transition(&mut self, next: RunState) {
        debug!("{:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
