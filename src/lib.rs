//! MarkCut Library
//!
//! Marker bookkeeping for cutting segments out of a local video: markers are
//! kept in time order, paired into non-overlapping segments, persisted between
//! runs and handed one segment at a time to an external video engine.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod error;
pub mod output;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use app::{CuttingCoordinator, MarkerPersistence, MarkerSession};
pub use domain::errors::DomainError;
pub use domain::markers::MarkerStore;
pub use domain::model::{Marker, MarkerDocument, MarkerId, MarkerKind, Segment, SegmentResult};
pub use domain::rules::SegmentDeriver;
pub use error::{MarkCutError, MarkCutResult};
pub use utils::TimeCode;
