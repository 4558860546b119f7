//! ffmpeg process driver.

use super::progress::{is_block_end, ProgressSample};
use super::{EncodeSpec, ProgressStream, Transcoder};
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout, Command};
use tokio::task::JoinHandle;

/// ffmpeg invoked as an external process.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    program: PathBuf,
}

impl FfmpegTranscoder {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Spawn ffmpeg for `spec` with progress on stdout.
    pub fn spawn(&self, spec: &EncodeSpec) -> Result<FfmpegRun> {
        let args = spec.to_args();

        #[cfg(feature = "tracing")]
        tracing::info!(
            "Convert: {} to: {}",
            spec.input_path.display(),
            spec.output_path.display()
        );
        #[cfg(feature = "tracing")]
        tracing::debug!("ffmpeg args: {:?}", args);

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::spawn("ffmpeg", e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::parse("ffmpeg", "stdout was not captured"))?;

        // Drain stderr concurrently; ffmpeg stalls on a full pipe.
        let stderr = child.stderr.take().map(|mut stderr| {
            tokio::spawn(async move {
                let mut buf = String::new();
                let _ = stderr.read_to_string(&mut buf).await;
                buf
            })
        });

        Ok(FfmpegRun {
            child,
            lines: BufReader::new(stdout).lines(),
            stderr,
            finished: false,
        })
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

#[async_trait::async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn start(&self, spec: &EncodeSpec) -> Result<Box<dyn ProgressStream>> {
        Ok(Box::new(self.spawn(spec)?))
    }
}

/// A running ffmpeg process.
pub struct FfmpegRun {
    child: Child,
    lines: Lines<BufReader<ChildStdout>>,
    stderr: Option<JoinHandle<String>>,
    finished: bool,
}

impl FfmpegRun {
    async fn finish(&mut self) -> Result<()> {
        self.finished = true;
        let status = self.child.wait().await?;

        let stderr = match self.stderr.take() {
            Some(handle) => handle.await.unwrap_or_default(),
            None => String::new(),
        };

        #[cfg(feature = "tracing")]
        tracing::debug!("ffmpeg exited with {}", status);

        if !status.success() {
            return Err(Error::TranscodeFailed {
                status,
                stderr: stderr.trim().to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProgressStream for FfmpegRun {
    async fn next_sample(&mut self) -> Result<Option<ProgressSample>> {
        if self.finished {
            return Ok(None);
        }

        let mut sample = ProgressSample::default();
        while let Some(line) = self.lines.next_line().await? {
            if is_block_end(&line) {
                return Ok(Some(sample));
            }
            sample.apply_line(&line);
        }

        self.finish().await?;
        if sample.is_empty() {
            Ok(None)
        } else {
            Ok(Some(sample))
        }
    }
}
