//! MarkCut video segment cutter
//!
//! Mark start and end points on a local video file, review the segments they
//! define and cut each one out with a stream copy. Nothing leaves the machine.
//!
//! # Usage
//!
//! ```bash
//! markcut load holiday.mp4 --duration 754
//! markcut mark start --at 00:01:05
//! markcut mark end --seconds 95.5
//! markcut segments
//! markcut cut --input holiday.mp4 --out-dir clips
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};

use markcut::cli::{self, Cli};
use markcut::config_initialization::initialize_configuration;
use markcut::utils::logging::init_logging;

/// Main entry point for the MarkCut CLI application
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = initialize_configuration(&cli.overrides())?;
    init_logging(&config.logging);

    info!("Starting MarkCut");
    debug!(store = %config.storage.path.display(), "Configuration resolved");

    cli::run(cli.command, config).await
}
