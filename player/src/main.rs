//! cartvox - streaming speech player
//!
//! Plays cartridge track packs in the terminal, renders them headless to WAV
//! and builds packs from WAV recordings.

mod cli;
mod config;
mod pack;
mod render;
mod script;

#[cfg(feature = "playback")]
mod audio;
#[cfg(feature = "playback")]
mod display;
#[cfg(feature = "playback")]
mod host;

use anyhow::Result;
use clap::Parser;
use std::path::Path;

use cli::{Cli, Commands};
use config::PlayerConfig;

const LOG_FILE: &str = "cartvox.log";

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Play { .. } => init_file_logging()?,
        _ => init_stderr_logging(),
    }

    let config = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Play { pack } => run_player(&pack, &config),
        Commands::Render {
            pack,
            out,
            ticks,
            script,
        } => {
            let script = match script {
                Some(path) => script::load(&path)?,
                None => Vec::new(),
            };
            render::render(&pack, &out, ticks, script, &config.engine)?;
            Ok(())
        }
        Commands::Pack { out, inputs } => {
            pack::build(&out, &inputs)?;
            Ok(())
        }
        Commands::List { pack } => pack::list(&pack),
    }
}

fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// Log to a file so the status panel owns the terminal
fn init_file_logging() -> Result<()> {
    use anyhow::Context;

    let dir = config::data_dir().unwrap_or_else(std::env::temp_dir);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create data dir: {}", dir.display()))?;
    let path = dir.join(LOG_FILE);
    let file = std::fs::File::create(&path)
        .with_context(|| format!("Failed to create log file: {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .init();
    Ok(())
}

#[cfg(feature = "playback")]
fn run_player(path: &Path, config: &PlayerConfig) -> Result<()> {
    use anyhow::Context;
    use audio::AudioOutput;
    use cartvox_codec::SpeechDecoder;
    use cartvox_core::{Player, handheld_specs};
    use cartvox_pack::TrackPack;
    use display::TerminalStatus;
    use host::HostHardware;

    let pack = TrackPack::load(path)
        .with_context(|| format!("Failed to load pack: {}", path.display()))?;
    let mut player = Player::new(&pack, SpeechDecoder::new(), config.engine.clone())?;

    let audio = AudioOutput::new(handheld_specs().output_rate_hz(), config.audio.master_volume)?;
    let mut hw = HostHardware::start(audio, config.input.hold_ticks)?;

    let pack_name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut status = TerminalStatus::new(pack_name);

    while !hw.quit_requested() {
        player.tick(&mut hw, &mut status);
    }

    tracing::info!(
        "stopped after {} ticks ({} decode failures)",
        player.ticks(),
        player.adapter().decode_failures()
    );
    Ok(())
}

#[cfg(not(feature = "playback"))]
fn run_player(_path: &Path, _config: &PlayerConfig) -> Result<()> {
    anyhow::bail!("cartvox built without the `playback` feature; use `render` instead")
}
