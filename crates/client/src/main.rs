//! ContextQuest command runner binary.
//!
//! Reads newline-delimited commands from stdin and writes one JSON result per
//! recognized command to stdout. Logs go to stderr.
//!
//! # Examples
//!
//! ```bash
//! printf 'run start 0\ntool use tool-build\nstate\n' | cargo run -p quest-client -- --json-only
//! ```

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use quest_client::{CliRunner, logging};
use quest_content::ContentFactory;
use quest_runtime::{FileSlotRepository, RuntimeConfig, Session};

/// Line-oriented ContextQuest session
#[derive(Parser)]
#[command(name = "contextquest")]
#[command(about = "Drive a ContextQuest session from stdin", long_about = None)]
#[command(version)]
struct Cli {
    /// Write only JSON result lines (no logs)
    #[arg(long)]
    json_only: bool,

    /// Player seed for tool simulation and variant assignment
    #[arg(long)]
    seed: Option<String>,

    /// Directory for save slots (overrides SAVE_DATA_DIR)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Load catalog content from this directory instead of the builtin set
    #[arg(long)]
    content_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = logging::setup_logging(cli.json_only);

    let mut config = RuntimeConfig::from_env();
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(dir) = cli.data_dir {
        config.save_data_dir = dir;
    }

    let factory = match cli.content_dir {
        Some(dir) => ContentFactory::from_dir(dir),
        None => ContentFactory::builtin(),
    };
    let session = Session::from_content(&factory, config.session_options())
        .context("Failed to build the starting state")?;
    let slots = FileSlotRepository::new(&config.save_data_dir).with_context(|| {
        format!(
            "Failed to open save directory {}",
            config.save_data_dir.display()
        )
    })?;
    tracing::debug!("Save slots: {}", slots.path().display());

    let mut runner = CliRunner::new(session, Box::new(slots));

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read stdin")?;
        if let Some(result) = runner.handle_line(&line) {
            writeln!(stdout, "{}", result.to_json()?)?;
            stdout.flush()?;
        }
    }

    Ok(())
}
