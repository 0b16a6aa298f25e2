//! Command-line argument definitions

use std::path::PathBuf;

use clap::{ArgGroup, Args};

use crate::domain::model::MarkerKind;

/// Arguments for the load command
#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Video file to work on
    pub video: PathBuf,

    /// Video duration in seconds, enables range checks on new markers
    #[arg(long, value_parser = parse_duration)]
    pub duration: Option<f64>,
}

/// Arguments for the mark command
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("position").required(true).args(["at", "seconds"])))]
pub struct MarkArgs {
    /// Marker type (start/in or end/out)
    #[arg(value_parser = parse_kind)]
    pub kind: MarkerKind,

    /// Position as HH:MM:SS
    #[arg(long)]
    pub at: Option<String>,

    /// Position in seconds
    #[arg(long)]
    pub seconds: Option<f64>,
}

/// Arguments for the delete command
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Marker id as shown by `list`
    pub id: String,
}

/// Arguments for the segments command
#[derive(Args, Debug)]
pub struct SegmentsArgs {
    /// Write the segment listing to this file
    #[arg(long)]
    pub info_out: Option<PathBuf>,

    /// Write the segment listing into the output directory
    #[arg(long, conflicts_with = "info_out")]
    pub save_info: bool,
}

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Destination file (default: video_markers_<timestamp>.json in the output directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the import command
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Marker document previously written by `export`
    pub file: PathBuf,
}

/// Arguments for the cut command
#[derive(Args, Debug)]
pub struct CutArgs {
    /// Source video file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Directory receiving the segments (default: cutting.output_dir)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Skip the confirmation for large inputs
    #[arg(short, long)]
    pub yes: bool,
}

fn parse_kind(value: &str) -> Result<MarkerKind, String> {
    MarkerKind::parse(value).map_err(|e| e.to_string())
}

/// Positive, finite number of seconds
fn parse_duration(value: &str) -> Result<f64, String> {
    let seconds: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number of seconds", value))?;
    if seconds.is_finite() && seconds > 0.0 {
        Ok(seconds)
    } else {
        Err(format!("duration must be a positive number of seconds, got {}", value))
    }
}
