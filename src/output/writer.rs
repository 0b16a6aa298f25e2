//! Output file writer implementation

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::app::persistence::encode_document;
use crate::domain::model::{MarkerDocument, Segment, SegmentResult};
use crate::error::{MarkCutError, MarkCutResult};
use crate::output::{markers_file_name, segment_info_text, segments_file_name};

/// Writes results into an output directory.
///
/// Every file is first written to a temporary file next to its destination
/// and then renamed into place.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    dir: PathBuf,
}

impl OutputWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the payload of every successful segment, returning the paths written
    pub fn write_segments(&self, results: &[SegmentResult]) -> MarkCutResult<Vec<PathBuf>> {
        let mut written = Vec::new();
        for result in results.iter().filter(|r| r.success) {
            if let (Some(name), Some(data)) = (&result.file_name, &result.output) {
                written.push(self.write_named(name, data)?);
            }
        }
        info!(count = written.len(), dir = %self.dir.display(), "Segments written");
        Ok(written)
    }

    /// Write the segment listing as `video_segments_<timestamp>.txt`
    pub fn write_segment_info(
        &self,
        segments: &[Segment],
        at: DateTime<Utc>,
    ) -> MarkCutResult<PathBuf> {
        self.write_named(&segments_file_name(at), segment_info_text(segments).as_bytes())
    }

    /// Write an export document as `video_markers_<timestamp>.json`
    pub fn write_document(
        &self,
        document: &MarkerDocument,
        at: DateTime<Utc>,
    ) -> MarkCutResult<PathBuf> {
        let text = encode_document(document)?;
        self.write_named(&markers_file_name(at), text.as_bytes())
    }

    /// Write `data` to `name` inside the output directory
    pub fn write_named(&self, name: &str, data: &[u8]) -> MarkCutResult<PathBuf> {
        let path = self.dir.join(name);
        self.write_to(&path, data)?;
        Ok(path)
    }

    /// Atomically write `data` to an arbitrary path
    pub fn write_to(&self, path: &Path, data: &[u8]) -> MarkCutResult<()> {
        let output_error = |message: String| MarkCutError::OutputError {
            path: path.display().to_string(),
            message,
        };

        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent)
            .map_err(|e| output_error(format!("cannot create directory: {}", e)))?;

        let mut temp = NamedTempFile::new_in(&parent)
            .map_err(|e| output_error(format!("cannot create temporary file: {}", e)))?;
        temp.write_all(data)
            .map_err(|e| output_error(format!("failed to write data: {}", e)))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| output_error(format!("failed to sync file to disk: {}", e)))?;
        temp.persist(path)
            .map_err(|e| output_error(format!("failed to rename temporary file: {}", e.error)))?;

        debug!(path = %path.display(), bytes = data.len(), "Output file written");
        Ok(())
    }
}
