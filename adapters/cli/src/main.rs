#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a scripted crawl session.

mod config;
mod input;
mod simulation;

use std::{io, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use crawl_rendering::{
    FrameControl, GridProjection, JsonBackend, Presentation, RenderingBackend, Scene, TextBackend,
};
use tracing_subscriber::EnvFilter;

use crate::simulation::Simulation;

const CELL_LENGTH: f32 = 32.0;

/// Output formats supported by the CLI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Character grid per changed frame.
    Text,
    /// One JSON record per changed frame.
    Json,
}

/// Command-line arguments for a scripted crawl session.
#[derive(Debug, Parser)]
#[command(name = "crawl", about = "Plays a scripted grid crawl session")]
struct Args {
    /// TOML file overriding the default game configuration.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Global seed; a random one is drawn when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Moves to play: w/a/s/d to step, `.` to wait, `n` for a new game.
    #[arg(long, default_value = "")]
    moves: String,
    /// Simulated milliseconds per frame.
    #[arg(long, default_value_t = 50)]
    dt_ms: u64,
    /// Upper bound on simulated frames.
    #[arg(long, default_value_t = 10_000)]
    max_frames: u64,
    /// How frames are written to stdout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Entry point for the crawl command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = config::load(args.config.as_deref())?;
    let intents = input::parse_script(&args.moves).context("invalid --moves script")?;
    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, intents = intents.len(), "starting session");

    let projection = GridProjection::new(config.board.columns, config.board.rows, CELL_LENGTH)
        .context("failed to build grid projection")?;
    let presentation = Presentation::new(format!("crawl (seed {seed})"), Scene::new(projection));
    let frame_dt = Duration::from_millis(args.dt_ms);

    let mut simulation = Simulation::new(config, seed, intents)?;
    let update = move |dt: Duration, scene: &mut Scene| -> Result<FrameControl> {
        Ok(simulation.step(dt, scene))
    };

    let stdout = io::stdout().lock();
    match args.format {
        OutputFormat::Text => {
            TextBackend::new(stdout, frame_dt, args.max_frames).run(presentation, update)
        }
        OutputFormat::Json => {
            JsonBackend::new(stdout, frame_dt, args.max_frames).run(presentation, update)
        }
    }
}
