#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that replays a MIPSman scene through the isometric
//! compositor and prints the resulting draw calls.

mod scene;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use mipsman_core::ClientId;
use mipsman_rendering::{FrameOutcome, IsoRenderer, RecordingSink, RendererConfig, Viewport};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::scene::Scene;

/// Replays a scene through the depth-sorted isometric compositor.
#[derive(Debug, Parser)]
#[command(name = "mipsman")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Renderer configuration (viewport, sprites, palette)
    #[arg(long)]
    config: PathBuf,

    /// Scene file holding the map rows, entities and pellets
    #[arg(long)]
    scene: PathBuf,

    /// Number of frames to render
    #[arg(short, long, default_value_t = 1)]
    frames: u32,

    /// Time between consecutive frames in milliseconds
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Override the configured viewport width
    #[arg(long, requires = "height")]
    width: Option<u32>,

    /// Override the configured viewport height
    #[arg(long, requires = "width")]
    height: Option<u32>,

    /// Present the scene for this client instead of the configured one
    #[arg(long)]
    local_client: Option<u32>,

    /// Frame at which the capture overlay starts
    #[arg(long, default_value_t = 0, requires = "capture")]
    capture_at: u32,

    /// Client whose entity the capture overlay shows
    #[arg(long)]
    capture: Option<u32>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Entry point for the MIPSman command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")?;

    let config = RendererConfig::from_path(&cli.config)?;
    let mut scene = Scene::from_path(&cli.scene)?;
    let (rows, columns) = scene.grid().dimensions();
    info!(
        rows,
        columns,
        entities = scene.entities().len(),
        pellets = scene.pellets().len(),
        "scene loaded"
    );

    let mut renderer =
        IsoRenderer::from_config(&config).context("failed to build renderer from config")?;
    if let (Some(width), Some(height)) = (cli.width, cli.height) {
        let viewport = Viewport::new(width, height).context("invalid viewport override")?;
        renderer
            .set_viewport(viewport, &config.sprites)
            .context("failed to apply viewport override")?;
    }
    if let Some(client) = cli.local_client {
        renderer
            .compositor_mut()
            .set_local_client(ClientId::new(client));
    }

    let frame_time = Duration::from_millis(cli.frame_ms);
    for frame in 0..cli.frames {
        let now = frame_time * frame;
        if let Some(client) = cli.capture.filter(|_| frame == cli.capture_at) {
            renderer.start_capture(ClientId::new(client), now);
        }

        let mut sink = RecordingSink::new();
        let outcome = renderer.render(&mut scene.snapshot(), now, &config.sprites, &mut sink);
        print_frame(frame, &sink, &outcome);
    }

    Ok(())
}

fn print_frame(frame: u32, sink: &RecordingSink, outcome: &FrameOutcome) {
    println!("frame {frame}");
    for command in sink.commands() {
        println!("  {command}");
    }

    match outcome {
        FrameOutcome::Composited(report) => println!(
            "  = {} floor, {} terrain, {} pellets, {} entities ({} late), {} markers",
            report.floor_tiles,
            report.terrain_tiles,
            report.pellets_drawn,
            report.entities_drawn,
            report.late_entities,
            report.markers_drawn
        ),
        FrameOutcome::Capture {
            captured,
            frame: overlay_frame,
            ..
        } => println!(
            "  = capture overlay for client {} (frame {overlay_frame})",
            captured.get()
        ),
    }
}
