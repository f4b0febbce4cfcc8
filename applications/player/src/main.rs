//! Tilawa player
//!
//! Terminal player for a numbered recitation set: spectrum and
//! loudness display, loop-range playback and RMS loudness
//! normalization.

mod app;
mod decode;
mod engine;
mod loader;
mod render;
mod ui;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tilawa_core::PlayerConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;

#[derive(Parser)]
#[command(name = "tilawa-player")]
#[command(about = "Terminal player with spectrum display and loudness normalization", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the numbered track files
    #[arg(long)]
    audio_dir: Option<PathBuf>,

    /// Number of tracks in the set
    #[arg(long)]
    tracks: Option<u32>,

    /// Disable the loop-range controls
    #[arg(long)]
    no_looping: bool,

    /// Normalizer target level at startup
    #[arg(long)]
    target: Option<f32>,
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout belongs to the frame painter.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tilawa_player=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = PlayerConfig::load(cli.config.as_deref())?;
    if let Some(audio_dir) = cli.audio_dir {
        config.assets.audio_dir = audio_dir;
    }
    if let Some(tracks) = cli.tracks {
        config.playback.total_tracks = tracks;
    }
    if cli.no_looping {
        config.playback.looping_supported = false;
    }
    if let Some(target) = cli.target {
        config.normalizer.initial_target = target;
    }
    config.validate()?;

    tracing::info!(
        tracks = config.playback.total_tracks,
        looping = config.playback.looping_supported,
        "starting player"
    );

    let mut player = App::new(config)?;
    player.run()
}
