// Domain errors - Error types for the domain layer

use thiserror::Error;

/// Domain-specific error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Malformed time text or malformed import document
    #[error("Invalid format: {0}")]
    Format(String),

    /// A cutting run is already in flight
    #[error("Video processing is already running, wait for it to finish")]
    Busy,

    /// The video engine never reported ready
    #[error("Video engine is unavailable: {0}")]
    EngineUnavailable(String),

    /// Segment with a non-positive duration
    #[error("Invalid segment {start:.3}s - {end:.3}s: duration must be positive")]
    InvalidSegment { start: f64, end: f64 },

    /// Extraction failed for a single segment
    #[error("Engine execution failed: {0}")]
    EngineExecution(String),

    /// Marker time outside the loaded video
    #[error("Marker time {time:.3}s is outside the video (duration {duration:.3}s)")]
    MarkerOutOfRange { time: f64, duration: f64 },

    /// Run declined at the pre-flight confirmation gate
    #[error("Cancelled by user")]
    Cancelled,

    /// Key-value backend failure
    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    /// Errors that abort a whole cutting run instead of a single segment
    pub fn is_preflight(&self) -> bool {
        matches!(
            self,
            DomainError::Busy | DomainError::EngineUnavailable(_) | DomainError::Cancelled
        )
    }
}
