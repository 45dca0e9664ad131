//! Transcoding with a fixed ffmpeg profile.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use reelvault_core::{Error, Result};

use crate::command::{path_arg, CaptureSinks, ProcessRunner, ToolCommand};

/// Extension given to every encoder output.
pub const OUTPUT_EXTENSION: &str = "mp4";

/// Arguments passed to ffmpeg for one file.
///
/// Overwrites the destination, encodes at CRF 23 with a 4:2:0 pixel format,
/// moves the index to the front of the container for progressive playback
/// and hides the banner. Fails if either path is not valid UTF-8.
pub fn encoder_args(input: &Path, output: &Path) -> Result<Vec<String>> {
    Ok(vec![
        "-i".to_string(),
        path_arg(input)?,
        "-y".to_string(),
        "-crf".to_string(),
        "23".to_string(),
        "-movflags".to_string(),
        "+faststart".to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-hide_banner".to_string(),
        path_arg(output)?,
    ])
}

/// Runs the encoder on single files.
pub struct Transcoder {
    runner: Arc<dyn ProcessRunner>,
    ffmpeg: PathBuf,
    sinks: CaptureSinks,
}

impl Transcoder {
    pub fn new(runner: Arc<dyn ProcessRunner>, ffmpeg: PathBuf, sinks: CaptureSinks) -> Self {
        Self {
            runner,
            ffmpeg,
            sinks,
        }
    }

    /// Encode `input` into `output`, creating the output's parent directory.
    ///
    /// A failed encode may leave a partial `output` behind; it is not removed.
    pub async fn encode(&self, input: &Path, output: &Path) -> Result<()> {
        let args = encoder_args(input, output)?;

        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::file_system("create directory", parent, e))?;
        }

        let mut cmd = ToolCommand::new(&self.ffmpeg);
        cmd.args(args);

        self.runner.run_captured(&cmd, &self.sinks).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingRunner {
        calls: Mutex<Vec<(ToolCommand, CaptureSinks)>>,
        fail: bool,
    }

    #[async_trait]
    impl ProcessRunner for RecordingRunner {
        async fn run(&self, _command: &ToolCommand) -> Result<()> {
            unreachable!("the transcoder always captures")
        }

        async fn run_captured(&self, command: &ToolCommand, sinks: &CaptureSinks) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push((command.clone(), sinks.clone()));
            if self.fail {
                Err(command.failure("exited with exit status: 1"))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn fixed_profile() {
        let args = encoder_args(Path::new("/in/a.mov"), Path::new("/enc/a.mp4")).unwrap();
        assert_eq!(
            args,
            [
                "-i",
                "/in/a.mov",
                "-y",
                "-crf",
                "23",
                "-movflags",
                "+faststart",
                "-pix_fmt",
                "yuv420p",
                "-hide_banner",
                "/enc/a.mp4",
            ]
        );
    }

    #[tokio::test]
    async fn encode_creates_parent_and_passes_sinks() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(RecordingRunner::default());
        let sinks = CaptureSinks::new(Some(dir.path().join("ffmpeg.out")), None);
        let transcoder = Transcoder::new(runner.clone(), PathBuf::from("ffmpeg"), sinks.clone());

        let output = dir.path().join("enc/sub/b.mp4");
        transcoder
            .encode(Path::new("/in/sub/b.mov"), &output)
            .await
            .unwrap();

        assert!(dir.path().join("enc/sub").is_dir());
        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0.program(), Path::new("ffmpeg"));
        assert_eq!(
            calls[0].0.arguments().last().map(String::as_str),
            Some(&*output.to_string_lossy())
        );
        assert_eq!(calls[0].1, sinks);
    }

    #[tokio::test]
    async fn encode_failure_is_surfaced_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(RecordingRunner {
            fail: true,
            ..Default::default()
        });
        let transcoder = Transcoder::new(runner, PathBuf::from("ffmpeg"), CaptureSinks::default());

        let err = transcoder
            .encode(Path::new("/in/a.mov"), &dir.path().join("a.mp4"))
            .await
            .unwrap_err();

        assert_matches!(err, Error::ExternalCommand { ref command, .. } if command == "ffmpeg");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_utf8_input_is_rejected_before_running() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(RecordingRunner::default());
        let transcoder = Transcoder::new(runner.clone(), PathBuf::from("ffmpeg"), CaptureSinks::default());
        let input = Path::new("/in").join(OsStr::from_bytes(b"clip\xff.mov"));
        let output = dir.path().join("enc/clip.mp4");

        let err = transcoder.encode(&input, &output).await.unwrap_err();

        assert_matches!(err, Error::FileSystem { ref path, .. } if *path == input);
        assert!(runner.calls.lock().unwrap().is_empty());
        assert!(!dir.path().join("enc").exists());
    }
}
