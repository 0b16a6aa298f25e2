//! Command implementations

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::app::{AppContainer, DefaultAppContainer};
use crate::cli::args::{
    CutArgs, DeleteArgs, ExportArgs, ImportArgs, LoadArgs, MarkArgs, SegmentsArgs,
};
use crate::domain::model::{CutState, MarkerId, Segment, SegmentResult, SourceFile, VideoInfo};
use crate::domain::rules::SegmentDeriver;
use crate::output::{segment_info_text, OutputWriter};
use crate::ports::{AlwaysProceed, ConfirmationGate, CutObserver};
use crate::utils::{TimeCode, Utils};

/// Execute the load command
pub fn load(container: &DefaultAppContainer, args: LoadArgs) -> Result<()> {
    let metadata = std::fs::metadata(&args.video)
        .with_context(|| format!("Cannot open video file {}", args.video.display()))?;
    if !metadata.is_file() {
        bail!("Not a file: {}", args.video.display());
    }

    let last_modified = metadata
        .modified()
        .map(|time| DateTime::<Utc>::from(time).timestamp_millis())
        .unwrap_or(0);

    let info = VideoInfo {
        name: file_name(&args.video),
        size: metadata.len(),
        mime_type: mime_type(&args.video).to_string(),
        last_modified,
        duration: args.duration,
    };

    let mut session = container.session();
    session.set_video(info.clone())?;

    println!(
        "Loaded {} ({})",
        info.name,
        Utils::format_file_size(info.size)
    );
    if let Some(duration) = info.duration {
        println!("Duration: {}", TimeCode::format(duration));
    }
    Ok(())
}

/// Execute the mark command
pub fn mark(container: &DefaultAppContainer, args: MarkArgs) -> Result<()> {
    let mut session = container.session();
    let marker = match (&args.at, args.seconds) {
        (Some(text), _) => session.add_marker_from_timecode(text, args.kind)?,
        (None, Some(seconds)) => session.add_marker(seconds, args.kind)?,
        (None, None) => bail!("Either --at or --seconds is required"),
    };

    println!("Added {} marker at {} [{}]", marker.kind, marker.label, marker.id);
    Ok(())
}

/// Execute the list command
pub fn list(container: &DefaultAppContainer) -> Result<()> {
    let session = container.session();
    if let Some(video) = session.video() {
        println!("Video: {} ({})", video.name, Utils::format_file_size(video.size));
    }

    if session.markers().is_empty() {
        println!("No markers");
        return Ok(());
    }

    for (i, marker) in session.markers().iter().enumerate() {
        println!(
            "{:>3}. {:<5} {}  {}",
            i + 1,
            marker.kind,
            marker.label,
            marker.id
        );
    }

    let stats = session.stats();
    println!(
        "{} markers ({} start, {} end), {} segments, {} total",
        stats.marker_count,
        stats.start_count,
        stats.end_count,
        stats.segment_count,
        TimeCode::format_duration(stats.total_duration)
    );
    Ok(())
}

/// Execute the delete command
pub fn delete(container: &DefaultAppContainer, args: DeleteArgs) -> Result<()> {
    let mut session = container.session();
    match session.delete_marker(&MarkerId::from(args.id.as_str()))? {
        Some(marker) => println!("Deleted {} marker at {}", marker.kind, marker.label),
        None => println!("No marker with id {}", args.id),
    }
    Ok(())
}

/// Execute the clear command
pub fn clear(container: &DefaultAppContainer) -> Result<()> {
    let mut session = container.session();
    let count = session.markers().len();
    session.clear_markers()?;
    println!("Cleared {} markers", count);
    Ok(())
}

/// Execute the segments command
pub fn segments(container: &DefaultAppContainer, args: SegmentsArgs) -> Result<()> {
    let session = container.session();
    let segments = session.segments();

    if segments.is_empty() {
        println!("No segments, add start and end markers first");
        return Ok(());
    }

    println!("{}", segment_info_text(&segments));
    println!(
        "Total: {} in {} segments",
        TimeCode::format_duration(SegmentDeriver::total_duration(&segments)),
        segments.len()
    );

    let writer = OutputWriter::new(&container.config().cutting.output_dir);
    if let Some(path) = &args.info_out {
        writer.write_to(path, segment_info_text(&segments).as_bytes())?;
        println!("Segment list written to {}", path.display());
    } else if args.save_info {
        let path = writer.write_segment_info(&segments, Utc::now())?;
        println!("Segment list written to {}", path.display());
    }
    Ok(())
}

/// Execute the export command
pub fn export(container: &DefaultAppContainer, args: ExportArgs) -> Result<()> {
    let session = container.session();
    if session.markers().is_empty() {
        bail!("No markers to export");
    }

    let document = session.export_document();
    let writer = OutputWriter::new(&container.config().cutting.output_dir);
    let path = match &args.output {
        Some(path) => {
            let text = crate::app::persistence::encode_document(&document)?;
            writer.write_to(path, text.as_bytes())?;
            path.clone()
        }
        None => writer.write_document(&document, Utc::now())?,
    };

    println!("Exported {} markers to {}", document.markers.len(), path.display());
    Ok(())
}

/// Execute the import command
pub fn import(container: &DefaultAppContainer, args: ImportArgs) -> Result<()> {
    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Cannot read marker file {}", args.file.display()))?;

    let mut session = container.session();
    let count = session
        .import_document(&text)
        .with_context(|| format!("Cannot import {}", args.file.display()))?;

    println!("Imported {} markers", count);
    Ok(())
}

/// Execute the cut command
pub async fn cut(container: &DefaultAppContainer, args: CutArgs) -> Result<()> {
    let segments = container.session().segments();
    if segments.is_empty() {
        bail!("No valid segments to cut, add start and end markers first");
    }

    let bytes = tokio::fs::read(&args.input)
        .await
        .with_context(|| format!("Cannot read video file {}", args.input.display()))?;
    let source = SourceFile::new(file_name(&args.input), bytes);
    info!(file = %source.name, size = source.size(), segments = segments.len(), "Preparing cut");

    let gate: Arc<dyn ConfirmationGate> = if args.yes {
        Arc::new(AlwaysProceed)
    } else {
        Arc::new(StdinConfirmation)
    };
    let engine = container.start_engine()?;
    let coordinator = container
        .coordinator(engine)
        .with_gate(gate)
        .with_observer(Arc::new(ConsoleProgress));

    let results = match coordinator.cut_all(&source, &segments).await {
        Ok(results) => results,
        Err(e) if e.is_preflight() => {
            return Err(e).context(format!("Cutting {} did not start", source.name))
        }
        Err(e) => return Err(e.into()),
    };

    let out_dir = args
        .out_dir
        .clone()
        .unwrap_or_else(|| container.config().cutting.output_dir.clone());
    let writer = OutputWriter::new(out_dir);
    writer.write_segments(&results)?;

    for result in &results {
        println!("{}", describe_result(result, writer.dir()));
    }

    let succeeded = results.iter().filter(|r| r.success).count();
    println!("{} of {} segments cut", succeeded, results.len());
    if succeeded == 0 {
        bail!("No segment could be cut");
    }
    Ok(())
}

/// Asks on the terminal before cutting very large inputs
struct StdinConfirmation;

impl ConfirmationGate for StdinConfirmation {
    fn confirm_large_input(&self, file_name: &str, size: u64) -> bool {
        eprint!(
            "{} is {}. Processing may take a long time. Continue? [y/N] ",
            file_name,
            Utils::format_file_size(size)
        );
        let _ = io::stderr().flush();

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

/// Progress lines on stderr, keeping stdout for results
struct ConsoleProgress;

impl CutObserver for ConsoleProgress {
    fn on_state_changed(&self, state: CutState) {
        if state == CutState::WaitingForEngine {
            eprintln!("Waiting for video engine...");
        }
    }

    fn on_segment_started(&self, index: usize, total: usize, segment: &Segment) {
        eprintln!(
            "Cutting segment {}/{} ({} - {})",
            index, total, segment.start_formatted, segment.end_formatted
        );
    }
}

fn describe_result(result: &SegmentResult, dir: &Path) -> String {
    match (&result.file_name, &result.error_detail) {
        (Some(name), _) if result.success => format!(
            "Segment {}: {} ({})",
            result.index,
            dir.join(name).display(),
            Utils::format_file_size(result.output_size.unwrap_or(0))
        ),
        (_, detail) => format!(
            "Segment {}: failed - {}",
            result.index,
            detail.as_deref().unwrap_or("unknown error")
        ),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn mime_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());
    match extension.as_deref() {
        Some("mp4") | Some("m4v") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mov") => "video/quicktime",
        Some("mkv") => "video/x-matroska",
        Some("avi") => "video/x-msvideo",
        Some("ogv") => "video/ogg",
        _ => "application/octet-stream",
    }
}
