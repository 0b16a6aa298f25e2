//! FFmpeg execution adapter
//!
//! Runs the `ffmpeg` executable against files in a private scratch directory.
//! The directory stands in for the engine's own file system and is removed
//! when the adapter is dropped.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU8, Ordering};

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

const LOADING: u8 = 0;
const READY: u8 = 1;
const FAILED: u8 = 2;

/// Readiness of the engine executable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    Loading,
    Ready,
    Failed,
}

/// FFmpeg-based execution adapter
#[derive(Debug)]
pub struct FFmpegAdapter {
    ffmpeg_path: PathBuf,
    scratch: TempDir,
    status: AtomicU8,
}

impl FFmpegAdapter {
    /// Create new FFmpeg adapter with a fresh scratch directory under `scratch_root`
    pub fn new(ffmpeg_path: impl Into<PathBuf>, scratch_root: Option<&Path>) -> Result<Self, DomainError> {
        let scratch = match scratch_root {
            Some(root) => {
                std::fs::create_dir_all(root).map_err(|e| {
                    DomainError::EngineUnavailable(format!(
                        "cannot create scratch root {}: {}",
                        root.display(),
                        e
                    ))
                })?;
                tempfile::Builder::new().prefix("markcut-").tempdir_in(root)
            }
            None => tempfile::Builder::new().prefix("markcut-").tempdir(),
        }
        .map_err(|e| DomainError::EngineUnavailable(format!("cannot create scratch directory: {}", e)))?;

        Ok(Self {
            ffmpeg_path: ffmpeg_path.into(),
            scratch,
            status: AtomicU8::new(LOADING),
        })
    }

    /// Run the executable once and record whether it can be used
    pub async fn load(&self) -> EngineStatus {
        let version_check = Command::new(&self.ffmpeg_path)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await;

        match version_check {
            Ok(output) if output.status.success() => {
                let banner = String::from_utf8_lossy(&output.stdout);
                info!(
                    engine = %banner.lines().next().unwrap_or("ffmpeg"),
                    "Video engine ready"
                );
                self.status.store(READY, Ordering::SeqCst);
            }
            Ok(output) => {
                error!(status = %output.status, path = %self.ffmpeg_path.display(), "Video engine failed to start");
                self.status.store(FAILED, Ordering::SeqCst);
            }
            Err(e) => {
                error!(error = %e, path = %self.ffmpeg_path.display(), "Video engine not found");
                self.status.store(FAILED, Ordering::SeqCst);
            }
        }

        self.status()
    }

    pub fn status(&self) -> EngineStatus {
        match self.status.load(Ordering::SeqCst) {
            READY => EngineStatus::Ready,
            FAILED => EngineStatus::Failed,
            _ => EngineStatus::Loading,
        }
    }

    pub fn scratch_dir(&self) -> &Path {
        self.scratch.path()
    }

    /// Resolve a scratch name, rejecting anything that is not a bare file name
    fn scratch_path(&self, name: &str) -> Result<PathBuf, DomainError> {
        let candidate = Path::new(name);
        match candidate.file_name() {
            Some(file_name) if file_name == candidate.as_os_str() => {
                Ok(self.scratch.path().join(file_name))
            }
            _ => Err(DomainError::EngineExecution(format!(
                "invalid scratch file name '{}'",
                name
            ))),
        }
    }

    fn build_args(&self, command: &ExtractCommand) -> Vec<String> {
        let codec = match command.codec_mode {
            CodecMode::StreamCopy => "copy",
        };
        vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-y".to_string(),
            "-i".to_string(),
            command.input.clone(),
            "-ss".to_string(),
            command.start_seconds.to_string(),
            "-t".to_string(),
            command.duration_seconds.to_string(),
            "-c".to_string(),
            codec.to_string(),
            "-avoid_negative_ts".to_string(),
            "make_zero".to_string(),
            command.output.clone(),
        ]
    }
}

#[async_trait]
impl EnginePort for FFmpegAdapter {
    async fn is_ready(&self) -> bool {
        self.status() == EngineStatus::Ready
    }

    async fn write_file(&self, name: &str, data: &[u8]) -> Result<(), DomainError> {
        let path = self.scratch_path(name)?;
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| DomainError::EngineExecution(format!("cannot write {}: {}", name, e)))
    }

    async fn extract(&self, command: &ExtractCommand) -> Result<(), DomainError> {
        // Both names must stay inside the scratch directory.
        self.scratch_path(&command.input)?;
        self.scratch_path(&command.output)?;

        let args = self.build_args(command);
        debug!(args = ?args, "Running ffmpeg");

        let output = Command::new(&self.ffmpeg_path)
            .args(&args)
            .current_dir(self.scratch.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| DomainError::EngineExecution(format!("failed to run ffmpeg: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DomainError::EngineExecution(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }

    async fn read_file(&self, name: &str) -> Result<Vec<u8>, DomainError> {
        let path = self.scratch_path(name)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| DomainError::EngineExecution(format!("cannot read {}: {}", name, e)))
    }

    async fn remove_file(&self, name: &str) -> Result<(), DomainError> {
        let path = self.scratch_path(name)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| DomainError::EngineExecution(format!("cannot remove {}: {}", name, e)))
    }
}
