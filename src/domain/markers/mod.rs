// Marker store - Owns the ordered marker collection

use crate::domain::model::*;

/// Mutation reported to store listeners
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerEvent {
    Added(Marker),
    Deleted(Marker),
    Cleared,
    Replaced,
}

type MarkerListener = Box<dyn Fn(&MarkerEvent, &[Marker]) + Send + Sync>;

/// Ordered set of markers.
///
/// Markers are kept sorted ascending by time after every mutation. The sort
/// is stable, so markers sharing a time stay in insertion order. Bounds
/// against the video duration are the caller's responsibility.
#[derive(Default)]
pub struct MarkerStore {
    markers: Vec<Marker>,
    listeners: Vec<MarkerListener>,
}

impl MarkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener called after every effective mutation
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: Fn(&MarkerEvent, &[Marker]) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Add a marker at `time`, labelled with the formatted time unless `label` is given
    pub fn add(&mut self, time: f64, kind: MarkerKind, label: Option<String>) -> Marker {
        let marker = Marker::new(time, kind, label);
        self.insert(marker.clone());
        marker
    }

    /// Insert an already built marker in time order
    pub fn insert(&mut self, marker: Marker) {
        self.markers.push(marker.clone());
        self.sort();
        self.notify(MarkerEvent::Added(marker));
    }

    /// Remove the marker with `id`; absent ids are ignored
    pub fn delete(&mut self, id: &MarkerId) -> Option<Marker> {
        let position = self.markers.iter().position(|m| &m.id == id)?;
        let removed = self.markers.remove(position);
        self.notify(MarkerEvent::Deleted(removed.clone()));
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.markers.clear();
        self.notify(MarkerEvent::Cleared);
    }

    /// Substitute the whole collection, restoring time order
    pub fn replace_all(&mut self, markers: Vec<Marker>) {
        self.markers = markers;
        self.sort();
        self.notify(MarkerEvent::Replaced);
    }

    pub fn list(&self) -> &[Marker] {
        &self.markers
    }

    pub fn count(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn by_kind(&self, kind: MarkerKind) -> Vec<&Marker> {
        self.markers.iter().filter(|m| m.kind == kind).collect()
    }

    /// Latest marker by time
    pub fn last(&self) -> Option<&Marker> {
        self.markers.last()
    }

    pub fn get(&self, id: &MarkerId) -> Option<&Marker> {
        self.markers.iter().find(|m| &m.id == id)
    }

    fn sort(&mut self) {
        self.markers.sort_by(|a, b| a.time.total_cmp(&b.time));
    }

    fn notify(&self, event: MarkerEvent) {
        for listener in &self.listeners {
            listener(&event, &self.markers);
        }
    }
}

impl std::fmt::Debug for MarkerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkerStore")
            .field("markers", &self.markers)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
