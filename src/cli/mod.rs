//! CLI module for MarkCut
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::adapters::toml_config::AppConfig;
use crate::app::DefaultAppContainer;
use crate::config_initialization::ConfigOverrides;

pub mod args;
pub mod commands;

/// MarkCut video segment cutter
///
/// Place start and end markers on a local video, review the derived
/// segments and cut them out without re-encoding.
#[derive(Parser, Debug)]
#[command(name = "markcut")]
#[command(about = "MarkCut - mark in/out points on a video and cut the segments")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file (default: ./markcut.toml when present)
    #[arg(long, global = true, env = "MARKCUT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Marker state file
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_file: self.config.clone(),
            store: self.store.clone(),
            log_level: self.log_level.clone(),
            json_logs: self.json_logs,
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record the video markers are placed on
    Load(args::LoadArgs),
    /// Add a start or end marker
    Mark(args::MarkArgs),
    /// List markers in time order
    List,
    /// Delete one marker
    Delete(args::DeleteArgs),
    /// Delete all markers
    Clear,
    /// Show the segments derived from the markers
    Segments(args::SegmentsArgs),
    /// Export markers to a JSON document
    Export(args::ExportArgs),
    /// Replace markers with those of a JSON document
    Import(args::ImportArgs),
    /// Cut every segment out of a video
    Cut(args::CutArgs),
}

/// Execute the parsed command against a configured application
pub async fn run(command: Commands, config: AppConfig) -> Result<()> {
    let container = DefaultAppContainer::new(config)?;

    match command {
        Commands::Load(args) => commands::load(&container, args),
        Commands::Mark(args) => commands::mark(&container, args),
        Commands::List => commands::list(&container),
        Commands::Delete(args) => commands::delete(&container, args),
        Commands::Clear => commands::clear(&container),
        Commands::Segments(args) => commands::segments(&container, args),
        Commands::Export(args) => commands::export(&container, args),
        Commands::Import(args) => commands::import(&container, args),
        Commands::Cut(args) => commands::cut(&container, args).await,
    }
}
