//! Running external programs to completion.
//!
//! [`ProcessRunner`] is the seam the transcoder and bucket sync depend on, so
//! tests can substitute a fake that never spawns anything. [`SystemRunner`] is
//! the tokio-backed implementation used by the binary.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use reelvault_core::{Error, Result};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncRead, AsyncWriteExt};
use tokio::process::Command;

/// A program invocation: executable path plus arguments.
///
/// # Example
///
/// ```
/// use reelvault_av::ToolCommand;
///
/// let mut cmd = ToolCommand::new("ffmpeg");
/// cmd.arg("-i").arg("in.mov").args(["-y", "out.mp4"]);
/// assert_eq!(cmd.arguments(), ["-i", "in.mov", "-y", "out.mp4"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Build an [`Error::ExternalCommand`] describing this invocation.
    pub fn failure(&self, reason: impl Into<String>) -> Error {
        Error::external_command(self.program.display().to_string(), &self.args, reason)
    }
}

/// Render `path` as a command-line argument.
///
/// # Errors
///
/// [`Error::FileSystem`] with [`std::io::ErrorKind::InvalidData`] if the path
/// is not valid UTF-8; it is never rewritten lossily.
pub fn path_arg(path: &Path) -> Result<String> {
    path.to_str().map(str::to_string).ok_or_else(|| {
        Error::file_system(
            "pass as argument",
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidData, "path is not valid UTF-8"),
        )
    })
}

/// Optional files receiving a child's standard output and standard error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureSinks {
    pub stdout: Option<PathBuf>,
    pub stderr: Option<PathBuf>,
}

impl CaptureSinks {
    pub fn new(stdout: Option<PathBuf>, stderr: Option<PathBuf>) -> Self {
        Self { stdout, stderr }
    }

    /// Neither stream is captured.
    pub fn is_empty(&self) -> bool {
        self.stdout.is_none() && self.stderr.is_none()
    }

    /// Create or truncate every configured sink file.
    ///
    /// Called once per run; each captured invocation afterwards appends.
    pub async fn reset(&self) -> Result<()> {
        for path in [&self.stdout, &self.stderr].into_iter().flatten() {
            File::create(path)
                .await
                .map_err(|e| Error::file_system("create capture file", path, e))?;
        }
        Ok(())
    }
}

/// Capability to run external programs.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run `command` with inherited standard streams and wait for it to exit.
    ///
    /// # Errors
    ///
    /// [`Error::ExternalCommand`] if the process cannot be spawned or exits
    /// with a failure status.
    async fn run(&self, command: &ToolCommand) -> Result<()>;

    /// Run `command`, copying its stdout/stderr into `sinks` while it runs.
    ///
    /// Streams without a sink are discarded. The call returns only after both
    /// copies have finished and the sink files are flushed and closed.
    ///
    /// # Errors
    ///
    /// [`Error::ExternalCommand`] as for [`run`](ProcessRunner::run), which
    /// takes precedence over an [`Error::FileSystem`] from a failed copy.
    async fn run_captured(&self, command: &ToolCommand, sinks: &CaptureSinks) -> Result<()>;
}

/// [`ProcessRunner`] that spawns real OS processes through tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(&self, command: &ToolCommand) -> Result<()> {
        tracing::debug!(
            "run: {} {}",
            command.program().display(),
            command.arguments().join(" ")
        );

        let mut child = Command::new(command.program())
            .args(command.arguments())
            .spawn()
            .map_err(|e| command.failure(format!("failed to spawn: {e}")))?;

        let status = child
            .wait()
            .await
            .map_err(|e| command.failure(format!("I/O error waiting for process: {e}")))?;

        check_status(command, status)
    }

    async fn run_captured(&self, command: &ToolCommand, sinks: &CaptureSinks) -> Result<()> {
        tracing::debug!(
            "run (captured): {} {}",
            command.program().display(),
            command.arguments().join(" ")
        );

        let mut child = Command::new(command.program())
            .args(command.arguments())
            .stdin(Stdio::null())
            .stdout(piped_if(sinks.stdout.is_some()))
            .stderr(piped_if(sinks.stderr.is_some()))
            .spawn()
            .map_err(|e| command.failure(format!("failed to spawn: {e}")))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let (status, stdout_copied, stderr_copied) = tokio::join!(
            child.wait(),
            tee(stdout, sinks.stdout.as_deref()),
            tee(stderr, sinks.stderr.as_deref()),
        );

        let status = status
            .map_err(|e| command.failure(format!("I/O error waiting for process: {e}")))?;
        check_status(command, status)?;

        let stdout_bytes = stdout_copied?;
        let stderr_bytes = stderr_copied?;
        tracing::debug!("captured {stdout_bytes} stdout bytes, {stderr_bytes} stderr bytes");

        Ok(())
    }
}

fn piped_if(capture: bool) -> Stdio {
    if capture {
        Stdio::piped()
    } else {
        Stdio::null()
    }
}

fn check_status(command: &ToolCommand, status: ExitStatus) -> Result<()> {
    if status.success() {
        Ok(())
    } else {
        Err(command.failure(format!("exited with {status}")))
    }
}

/// Copy `stream` into the file at `sink`, appending.
///
/// On any failure the rest of the stream is still drained so the child never
/// blocks on a full pipe.
async fn tee<R>(stream: Option<R>, sink: Option<&Path>) -> Result<u64>
where
    R: AsyncRead + Unpin,
{
    let (Some(mut stream), Some(path)) = (stream, sink) else {
        return Ok(0);
    };

    let mut file = match OpenOptions::new().create(true).append(true).open(path).await {
        Ok(file) => file,
        Err(e) => {
            let _ = tokio::io::copy(&mut stream, &mut tokio::io::sink()).await;
            return Err(Error::file_system("open capture file", path, e));
        }
    };

    let copied = match tokio::io::copy(&mut stream, &mut file).await {
        Ok(copied) => copied,
        Err(e) => {
            let _ = tokio::io::copy(&mut stream, &mut tokio::io::sink()).await;
            return Err(Error::file_system("write capture file", path, e));
        }
    };

    file.flush()
        .await
        .map_err(|e| Error::file_system("flush capture file", path, e))?;

    Ok(copied)
}
