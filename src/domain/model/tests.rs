// Unit tests for domain models

use super::*;
use chrono::TimeZone;

#[test]
fn test_marker_label_defaults_to_timecode() {
    let marker = Marker::new(3725.9, MarkerKind::Start, None);
    assert_eq!(marker.label, "01:02:05");
    assert_eq!(marker.kind, MarkerKind::Start);

    let custom = Marker::new(10.0, MarkerKind::End, Some("0:00:10".to_string()));
    assert_eq!(custom.label, "0:00:10");
}

#[test]
fn test_generated_ids_are_unique() {
    let a = Marker::new(1.0, MarkerKind::Start, None);
    let b = Marker::new(1.0, MarkerKind::Start, None);
    assert_ne!(a.id, b.id);
}

#[test]
fn test_marker_wire_shape() {
    let marker = Marker::with_id(MarkerId::from("m-1"), 12.5, MarkerKind::End, None);
    let value = serde_json::to_value(&marker).unwrap();

    assert_eq!(
        value,
        serde_json::json!({
            "id": "m-1",
            "time": 12.5,
            "type": "end",
            "timestamp": "00:00:12"
        })
    );
}

#[test]
fn test_marker_accepts_numeric_id_and_missing_timestamp() {
    let marker: Marker =
        serde_json::from_str(r#"{"id": 1712345678901.42, "time": 65, "type": "start"}"#).unwrap();

    assert_eq!(marker.id.as_str(), "1712345678901.42");
    assert_eq!(marker.time, 65.0);
    assert_eq!(marker.kind, MarkerKind::Start);
    assert_eq!(marker.label, "00:01:05");
}

#[test]
fn test_marker_rejects_negative_time() {
    let result: Result<Marker, _> =
        serde_json::from_str(r#"{"id": "x", "time": -1, "type": "start"}"#);
    assert!(result.is_err());
}

#[test]
fn test_marker_rejects_unknown_kind() {
    let result: Result<Marker, _> =
        serde_json::from_str(r#"{"id": "x", "time": 1, "type": "middle"}"#);
    assert!(result.is_err());
}

#[test]
fn test_marker_kind_parse() {
    assert_eq!(MarkerKind::parse("START").unwrap(), MarkerKind::Start);
    assert_eq!(MarkerKind::parse("out").unwrap(), MarkerKind::End);
    assert!(matches!(MarkerKind::parse("both"), Err(DomainError::Format(_))));
}

#[test]
fn test_segment_new_computes_duration_and_labels() {
    let segment = Segment::new(5.0, 15.5);
    assert_eq!(segment.duration, 10.5);
    assert_eq!(segment.start_formatted, "00:00:05");
    assert_eq!(segment.end_formatted, "00:00:15");
    assert!(segment.is_valid());

    assert!(!Segment::new(8.0, 8.0).is_valid());
    assert!(!Segment::new(9.0, 3.0).is_valid());
}

#[test]
fn test_segment_result_constructors() {
    let ok = SegmentResult::success(
        Segment::new(0.0, 1.0),
        1,
        vec![1, 2, 3],
        "segment_1.mp4".to_string(),
    );
    assert!(ok.success);
    assert_eq!(ok.output_size, Some(3));
    assert!(ok.error_detail.is_none());

    let failed = SegmentResult::failure(Segment::new(0.0, 1.0), 2, "boom".to_string());
    assert!(!failed.success);
    assert_eq!(failed.index, 2);
    assert!(failed.output.is_none());
    assert_eq!(failed.error_detail.as_deref(), Some("boom"));
}

#[test]
fn test_source_file_extension() {
    assert_eq!(SourceFile::new("clip.MOV", vec![]).extension(), "mov");
    assert_eq!(SourceFile::new("noext", vec![]).extension(), "mp4");
    assert_eq!(SourceFile::new("archive.tar.mkv", vec![0; 4]).size(), 4);
}

#[test]
fn test_video_info_round_trip_uses_camel_case() {
    let info = VideoInfo {
        name: "holiday.mp4".to_string(),
        size: 1024,
        mime_type: "video/mp4".to_string(),
        last_modified: 1_700_000_000_000,
        duration: None,
    };
    let json = serde_json::to_value(&info).unwrap();
    assert_eq!(json["type"], "video/mp4");
    assert_eq!(json["lastModified"], 1_700_000_000_000i64);
    assert!(json.get("duration").is_none());
}

#[test]
fn test_marker_document_export_date_is_iso() {
    let exported = Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap();
    let document = MarkerDocument::at(vec![], exported);
    assert_eq!(document.export_date, "2024-03-01T08:30:00.000Z");
    assert_eq!(document.version, DOCUMENT_VERSION);
}
