// Domain models - Core types and data structures

use std::fmt;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::utils::time::TimeCode;

/// Version tag written into exported marker documents
pub const DOCUMENT_VERSION: &str = "1.0";

/// Opaque marker identifier, stable for the lifetime of the marker
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MarkerId(String);

impl MarkerId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MarkerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for MarkerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Older exports carry numeric ids; keep their textual form.
impl<'de> Deserialize<'de> for MarkerId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => MarkerId(text),
            RawId::Number(number) => MarkerId(number.to_string()),
        })
    }
}

/// Boundary kind of a marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Start,
    End,
}

impl MarkerKind {
    /// Parse marker kind from string
    pub fn parse(kind_str: &str) -> Result<Self, DomainError> {
        match kind_str.trim().to_lowercase().as_str() {
            "start" | "in" => Ok(MarkerKind::Start),
            "end" | "out" => Ok(MarkerKind::End),
            _ => Err(DomainError::Format(format!(
                "invalid marker type '{}', expected start or end",
                kind_str
            ))),
        }
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerKind::Start => f.write_str("start"),
            MarkerKind::End => f.write_str("end"),
        }
    }
}

/// A user-placed segment boundary on the source video timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MarkerRecord")]
pub struct Marker {
    pub id: MarkerId,
    pub time: f64,
    #[serde(rename = "type")]
    pub kind: MarkerKind,
    #[serde(rename = "timestamp")]
    pub label: String,
}

impl Marker {
    /// Create a marker with a fresh id; the label defaults to the formatted time
    pub fn new(time: f64, kind: MarkerKind, label: Option<String>) -> Self {
        Self::with_id(MarkerId::generate(), time, kind, label)
    }

    /// Create a marker with a caller-supplied id
    pub fn with_id(id: MarkerId, time: f64, kind: MarkerKind, label: Option<String>) -> Self {
        let label = label.unwrap_or_else(|| TimeCode::format(time));
        Self {
            id,
            time,
            kind,
            label,
        }
    }
}

/// Wire shape of a marker as found in stored state and export documents
#[derive(Debug, Deserialize)]
struct MarkerRecord {
    id: MarkerId,
    time: f64,
    #[serde(rename = "type")]
    kind: MarkerKind,
    #[serde(default)]
    timestamp: Option<String>,
}

impl TryFrom<MarkerRecord> for Marker {
    type Error = String;

    fn try_from(record: MarkerRecord) -> Result<Self, Self::Error> {
        if !record.time.is_finite() || record.time < 0.0 {
            return Err(format!(
                "marker {} has invalid time {}",
                record.id, record.time
            ));
        }
        Ok(Marker::with_id(
            record.id,
            record.time,
            record.kind,
            record.timestamp,
        ))
    }
}

/// A derived cut interval between a start and an end marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub duration: f64,
    pub start_formatted: String,
    pub end_formatted: String,
}

impl Segment {
    /// Build a segment spanning `start..end`; no ordering check is made here
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            duration: end - start,
            start_formatted: TimeCode::format(start),
            end_formatted: TimeCode::format(end),
        }
    }

    /// Whether the interval is non-degenerate
    pub fn is_valid(&self) -> bool {
        self.end > self.start && self.duration > 0.0
    }
}

/// Outcome of cutting one segment
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentResult {
    pub segment: Segment,
    /// 1-based position in the segment list
    pub index: usize,
    pub success: bool,
    #[serde(skip_serializing)]
    pub output: Option<Vec<u8>>,
    pub output_size: Option<u64>,
    pub file_name: Option<String>,
    pub error_detail: Option<String>,
}

impl SegmentResult {
    /// Create successful segment result
    pub fn success(segment: Segment, index: usize, output: Vec<u8>, file_name: String) -> Self {
        Self {
            segment,
            index,
            success: true,
            output_size: Some(output.len() as u64),
            output: Some(output),
            file_name: Some(file_name),
            error_detail: None,
        }
    }

    /// Create failed segment result
    pub fn failure(segment: Segment, index: usize, error_detail: String) -> Self {
        Self {
            segment,
            index,
            success: false,
            output: None,
            output_size: None,
            file_name: None,
            error_detail: Some(error_detail),
        }
    }
}

/// Metadata of the last loaded source video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInfo {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type", default)]
    pub mime_type: String,
    /// Milliseconds since the Unix epoch
    #[serde(default)]
    pub last_modified: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

/// Source video handed to the engine
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Lowercase container extension, `mp4` when the name has none
    pub fn extension(&self) -> String {
        Path::new(&self.name)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty())
            .map(|ext| ext.to_lowercase())
            .unwrap_or_else(|| "mp4".to_string())
    }
}

/// How the engine should produce its output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CodecMode {
    /// Copy packets without re-encoding
    StreamCopy,
}

/// Extraction request sent to the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractCommand {
    pub input: String,
    pub output: String,
    pub start_seconds: f64,
    pub duration_seconds: f64,
    pub codec_mode: CodecMode,
}

/// Cutting coordinator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CutState {
    Idle,
    WaitingForEngine,
    Processing,
}

impl fmt::Display for CutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CutState::Idle => f.write_str("idle"),
            CutState::WaitingForEngine => f.write_str("waiting-for-engine"),
            CutState::Processing => f.write_str("processing"),
        }
    }
}

/// Bulk copy of persisted state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub markers: Option<Vec<Marker>>,
    pub video_info: Option<VideoInfo>,
    pub export_timestamp: DateTime<Utc>,
}

/// File-based marker interchange document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerDocument {
    pub markers: Vec<Marker>,
    pub export_date: String,
    pub version: String,
}

impl MarkerDocument {
    /// Wrap markers with the current time as export date
    pub fn new(markers: Vec<Marker>) -> Self {
        Self::at(markers, Utc::now())
    }

    pub fn at(markers: Vec<Marker>, exported: DateTime<Utc>) -> Self {
        Self {
            markers,
            export_date: exported.to_rfc3339_opts(SecondsFormat::Millis, true),
            version: DOCUMENT_VERSION.to_string(),
        }
    }
}

#[cfg(test)]
mod tests;
