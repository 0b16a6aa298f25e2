// Session interactor - Marker editing use cases with auto-save

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::app::persistence::{decode_document, MarkerPersistence};
use crate::domain::errors::*;
use crate::domain::markers::{MarkerEvent, MarkerStore};
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::utils::time::TimeCode;

/// Summary figures for the current session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub marker_count: usize,
    pub start_count: usize,
    pub end_count: usize,
    pub segment_count: usize,
    /// Seconds covered by all valid segments
    pub total_duration: f64,
    pub video_duration: Option<f64>,
}

/// Marker editing session bound to a persistence backend.
///
/// Every mutation is saved before it is applied; a failed save leaves the
/// session as it was.
pub struct MarkerSession {
    store: MarkerStore,
    persistence: Arc<MarkerPersistence>,
    video: Option<VideoInfo>,
}

impl MarkerSession {
    /// Start a session from whatever state was saved last
    pub fn restore(persistence: Arc<MarkerPersistence>) -> Self {
        let mut store = MarkerStore::new();
        if let Some(markers) = persistence.load_markers() {
            store.replace_all(markers);
        }
        let video = persistence.load_video_info();

        debug!(
            markers = store.count(),
            video = video.as_ref().map(|v| v.name.as_str()).unwrap_or("-"),
            "Session restored"
        );

        Self {
            store,
            persistence,
            video,
        }
    }

    /// Register a listener on the underlying marker store
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: Fn(&MarkerEvent, &[Marker]) + Send + Sync + 'static,
    {
        self.store.subscribe(listener);
    }

    pub fn set_video(&mut self, info: VideoInfo) -> Result<(), DomainError> {
        self.persistence.save_video_info(&info)?;
        info!(name = %info.name, size = info.size, "Video loaded");
        self.video = Some(info);
        Ok(())
    }

    pub fn video(&self) -> Option<&VideoInfo> {
        self.video.as_ref()
    }

    pub fn markers(&self) -> &[Marker] {
        self.store.list()
    }

    pub fn add_marker(&mut self, time: f64, kind: MarkerKind) -> Result<Marker, DomainError> {
        self.check_range(time)?;
        let marker = self.commit_new(Marker::new(time, kind, None))?;
        info!(kind = %marker.kind, time = marker.time, "Marker added");
        Ok(marker)
    }

    /// Add a marker from `HH:MM:SS` text, keeping the text as its label
    pub fn add_marker_from_timecode(
        &mut self,
        text: &str,
        kind: MarkerKind,
    ) -> Result<Marker, DomainError> {
        let time = TimeCode::parse(text)? as f64;
        self.check_range(time)?;
        let marker = self.commit_new(Marker::new(time, kind, Some(text.to_string())))?;
        info!(kind = %marker.kind, time = marker.time, "Marker added");
        Ok(marker)
    }

    pub fn delete_marker(&mut self, id: &MarkerId) -> Result<Option<Marker>, DomainError> {
        if self.store.get(id).is_none() {
            return Ok(None);
        }
        let remaining: Vec<Marker> = self
            .store
            .list()
            .iter()
            .filter(|m| &m.id != id)
            .cloned()
            .collect();
        self.persistence.save_markers(&remaining)?;

        let removed = self.store.delete(id);
        info!(id = %id, "Marker deleted");
        Ok(removed)
    }

    pub fn clear_markers(&mut self) -> Result<(), DomainError> {
        self.persistence.save_markers(&[])?;
        self.store.clear();
        info!("Markers cleared");
        Ok(())
    }

    /// Replace all markers with those of an export document.
    ///
    /// The session is left untouched when the document is rejected.
    pub fn import_document(&mut self, text: &str) -> Result<usize, DomainError> {
        let markers = decode_document(text)?;
        let count = markers.len();
        self.persistence.save_markers(&markers)?;
        self.store.replace_all(markers);
        info!(count, "Markers imported");
        Ok(count)
    }

    pub fn export_document(&self) -> MarkerDocument {
        MarkerDocument::new(self.store.list().to_vec())
    }

    /// Valid segments derived from the current markers
    pub fn segments(&self) -> Vec<Segment> {
        SegmentDeriver::validate(&SegmentDeriver::derive(self.store.list()))
    }

    pub fn stats(&self) -> SessionStats {
        let segments = self.segments();
        SessionStats {
            marker_count: self.store.count(),
            start_count: self.store.by_kind(MarkerKind::Start).len(),
            end_count: self.store.by_kind(MarkerKind::End).len(),
            segment_count: segments.len(),
            total_duration: SegmentDeriver::total_duration(&segments),
            video_duration: self.video.as_ref().and_then(|v| v.duration),
        }
    }

    fn check_range(&self, time: f64) -> Result<(), DomainError> {
        let duration = self.video.as_ref().and_then(|v| v.duration);
        let in_range = time.is_finite()
            && time >= 0.0
            && duration.map_or(true, |duration| time <= duration);

        if in_range {
            Ok(())
        } else {
            Err(DomainError::MarkerOutOfRange {
                time,
                duration: duration.unwrap_or(f64::INFINITY),
            })
        }
    }

    /// Save the list with `marker` added, then add it to the store
    fn commit_new(&mut self, marker: Marker) -> Result<Marker, DomainError> {
        let mut candidate = self.store.list().to_vec();
        candidate.push(marker.clone());
        candidate.sort_by(|a, b| a.time.total_cmp(&b.time));
        self.persistence.save_markers(&candidate)?;

        self.store.insert(marker.clone());
        Ok(marker)
    }
}
