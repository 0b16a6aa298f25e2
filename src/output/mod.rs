//! Output file naming and rendering

use chrono::{DateTime, Utc};

use crate::domain::model::Segment;
use crate::utils::time::TimeCode;

pub mod writer;

pub use writer::OutputWriter;

/// Plain-text listing of segments, one line each
pub fn segment_info_text(segments: &[Segment]) -> String {
    segments
        .iter()
        .enumerate()
        .map(|(i, s)| {
            format!(
                "Segment {}: {} - {} ({})",
                i + 1,
                s.start_formatted,
                s.end_formatted,
                TimeCode::format_duration(s.duration)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Timestamp used in generated file names, e.g. `2024-05-01T09-30-00`
pub fn file_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H-%M-%S").to_string()
}

pub fn markers_file_name(at: DateTime<Utc>) -> String {
    format!("video_markers_{}.json", file_timestamp(at))
}

pub fn segments_file_name(at: DateTime<Utc>) -> String {
    format!("video_segments_{}.txt", file_timestamp(at))
}
