// Domain rules - Business logic and policies

use crate::domain::model::*;

/// Business rules for pairing markers into cut segments
pub struct SegmentDeriver;

impl SegmentDeriver {
    /// Pair start and end markers into non-overlapping segments.
    ///
    /// Markers are scanned in time order with a single pending start:
    /// - a start marker replaces any pending start, so the most recent start
    ///   is the active one and an earlier unmatched start is discarded;
    /// - an end marker after the pending start closes a segment;
    /// - an end marker at or before the pending start is dropped and the
    ///   start stays open;
    /// - an end marker with nothing pending is dropped;
    /// - a trailing start produces nothing.
    pub fn derive(markers: &[Marker]) -> Vec<Segment> {
        let mut ordered: Vec<&Marker> = markers.iter().collect();
        ordered.sort_by(|a, b| a.time.total_cmp(&b.time));

        let mut segments = Vec::new();
        let mut pending_start: Option<f64> = None;

        for marker in ordered {
            match (marker.kind, pending_start) {
                (MarkerKind::Start, _) => pending_start = Some(marker.time),
                (MarkerKind::End, Some(start)) if marker.time > start => {
                    segments.push(Segment::new(start, marker.time));
                    pending_start = None;
                }
                (MarkerKind::End, _) => {}
            }
        }

        segments
    }

    /// Keep only non-degenerate segments before they reach the engine
    pub fn validate(segments: &[Segment]) -> Vec<Segment> {
        segments.iter().filter(|s| s.is_valid()).cloned().collect()
    }

    /// Sum of segment durations in seconds
    pub fn total_duration(segments: &[Segment]) -> f64 {
        segments.iter().map(|s| s.duration).sum()
    }
}
