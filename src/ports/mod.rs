// Ports - Interface definitions (contracts)

use crate::domain::errors::*;
use crate::domain::model::*;
use async_trait::async_trait;

/// Port for the external video-processing engine.
///
/// The engine owns a private scratch file system addressed by plain file
/// names. It is not reentrant: callers must not interleave extractions.
#[async_trait]
pub trait EnginePort: Send + Sync {
    /// Whether the engine finished loading and accepts work
    async fn is_ready(&self) -> bool;

    /// Store bytes under `name` in the scratch file system
    async fn write_file(&self, name: &str, data: &[u8]) -> Result<(), DomainError>;

    /// Run an extraction between two scratch files
    async fn extract(&self, command: &ExtractCommand) -> Result<(), DomainError>;

    /// Read a scratch file back
    async fn read_file(&self, name: &str) -> Result<Vec<u8>, DomainError>;

    /// Delete a scratch file
    async fn remove_file(&self, name: &str) -> Result<(), DomainError>;
}

/// Port for key-value persistence of application state
pub trait KeyValuePort: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, DomainError>;

    fn set(&self, key: &str, value: &str) -> Result<(), DomainError>;

    fn remove(&self, key: &str) -> Result<(), DomainError>;
}

/// Pre-flight confirmation for very large inputs
pub trait ConfirmationGate: Send + Sync {
    /// Return `false` to cancel the run before any segment is cut
    fn confirm_large_input(&self, file_name: &str, size: u64) -> bool;
}

/// Gate that always lets the run proceed
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysProceed;

impl ConfirmationGate for AlwaysProceed {
    fn confirm_large_input(&self, _file_name: &str, _size: u64) -> bool {
        true
    }
}

/// Observer for cutting progress, all methods default to no-ops
pub trait CutObserver: Send + Sync {
    /// Called on every coordinator state transition
    fn on_state_changed(&self, _state: CutState) {}

    /// Called before a segment is handed to the engine
    fn on_segment_started(&self, _index: usize, _total: usize, _segment: &Segment) {}

    /// Called once a segment has a result, successful or not
    fn on_segment_finished(&self, _result: &SegmentResult) {}
}
