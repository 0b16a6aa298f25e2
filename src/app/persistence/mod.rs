// Marker persistence - Saves session state through the key-value port

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

const MARKERS_KEY: &str = "markers";
const VIDEO_INFO_KEY: &str = "videoInfo";

/// Persists markers and video info under a namespaced pair of keys.
///
/// Reads never fail: missing or unreadable state comes back as `None`.
/// Writes surface backend failures as [`DomainError::Storage`].
pub struct MarkerPersistence {
    store: Arc<dyn KeyValuePort>,
    namespace: String,
}

impl MarkerPersistence {
    pub fn new(store: Arc<dyn KeyValuePort>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
        }
    }

    fn key(&self, name: &str) -> String {
        format!("{}{}", self.namespace, name)
    }

    pub fn save_markers(&self, markers: &[Marker]) -> Result<(), DomainError> {
        let json = serde_json::to_string(markers)
            .map_err(|e| DomainError::Storage(format!("cannot encode markers: {}", e)))?;
        self.store.set(&self.key(MARKERS_KEY), &json)?;
        debug!(count = markers.len(), "Markers saved");
        Ok(())
    }

    /// Stored markers in time order, or `None` when absent or unreadable
    pub fn load_markers(&self) -> Option<Vec<Marker>> {
        let mut markers: Vec<Marker> = self.load_json(MARKERS_KEY)?;
        if let Some(id) = first_duplicate_id(&markers) {
            warn!(id = %id, "Discarding persisted markers with a repeated id");
            return None;
        }
        markers.sort_by(|a, b| a.time.total_cmp(&b.time));
        Some(markers)
    }

    pub fn save_video_info(&self, info: &VideoInfo) -> Result<(), DomainError> {
        let json = serde_json::to_string(info)
            .map_err(|e| DomainError::Storage(format!("cannot encode video info: {}", e)))?;
        self.store.set(&self.key(VIDEO_INFO_KEY), &json)
    }

    pub fn load_video_info(&self) -> Option<VideoInfo> {
        self.load_json(VIDEO_INFO_KEY)
    }

    /// Remove all persisted state
    pub fn clear(&self) -> Result<(), DomainError> {
        self.store.remove(&self.key(MARKERS_KEY))?;
        self.store.remove(&self.key(VIDEO_INFO_KEY))?;
        debug!("Persisted state cleared");
        Ok(())
    }

    pub fn export_snapshot(&self) -> Snapshot {
        Snapshot {
            markers: self.load_markers(),
            video_info: self.load_video_info(),
            export_timestamp: Utc::now(),
        }
    }

    /// Write back whichever parts of `snapshot` are present
    pub fn import_snapshot(&self, snapshot: &Snapshot) -> Result<(), DomainError> {
        if let Some(markers) = &snapshot.markers {
            self.save_markers(markers)?;
        }
        if let Some(info) = &snapshot.video_info {
            self.save_video_info(info)?;
        }
        Ok(())
    }

    fn load_json<T: serde::de::DeserializeOwned>(&self, name: &str) -> Option<T> {
        let key = self.key(name);
        let raw = match self.store.get(&key) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(key = %key, error = %e, "Cannot read persisted state");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = %key, error = %e, "Discarding unreadable persisted state");
                None
            }
        }
    }
}

/// Render the pretty-printed export document
pub fn encode_document(document: &MarkerDocument) -> Result<String, DomainError> {
    serde_json::to_string_pretty(document)
        .map_err(|e| DomainError::Format(format!("cannot encode marker document: {}", e)))
}

/// Parse an export document, returning its markers in time order
pub fn decode_document(text: &str) -> Result<Vec<Marker>, DomainError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| DomainError::Format(format!("marker file is not valid JSON: {}", e)))?;

    let items = match value.get("markers") {
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(DomainError::Format(
                "marker file field 'markers' must be an array".to_string(),
            ))
        }
        None => {
            return Err(DomainError::Format(
                "marker file has no 'markers' field".to_string(),
            ))
        }
    };

    let mut markers = items
        .iter()
        .enumerate()
        .map(|(position, item)| {
            Marker::deserialize(item).map_err(|e| {
                DomainError::Format(format!("marker {} is invalid: {}", position + 1, e))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(id) = first_duplicate_id(&markers) {
        return Err(DomainError::Format(format!("duplicate marker id '{}'", id)));
    }

    markers.sort_by(|a, b| a.time.total_cmp(&b.time));
    Ok(markers)
}

fn first_duplicate_id(markers: &[Marker]) -> Option<&MarkerId> {
    let mut seen = HashSet::with_capacity(markers.len());
    markers.iter().map(|m| &m.id).find(|id| !seen.insert(*id))
}
