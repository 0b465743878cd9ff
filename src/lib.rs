// Morsetone - Morse code tone player
// Module declarations
pub mod audio;
pub mod cli;
pub mod code;
pub mod commands;
pub mod error;
pub mod logging;
pub mod playback;
pub mod settings;
pub mod state;

use anyhow::Context;
use clap::Parser;
use std::io::Write;
use std::sync::Arc;
use tracing::info;

use audio::{CpalTonePlayer, SilentTonePlayer, TonePlayer};
use cli::{Cli, Commands};
use settings::AppSettings;
use state::AppState;

pub use error::{MorseError, Result};
pub use playback::{PlaybackEngine, PlaybackStep, SessionOutcome, SessionState, TimingConfig};

fn load_settings(cli: &Cli) -> anyhow::Result<AppSettings> {
    match &cli.config {
        Some(path) => AppSettings::load_file(path),
        None => match AppSettings::default_dir() {
            Some(dir) => AppSettings::load(&dir),
            None => Ok(AppSettings::default()),
        },
    }
}

pub async fn run() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();

    let settings = load_settings(&cli)?;
    let player: Arc<dyn TonePlayer> = if cli.silent {
        Arc::new(SilentTonePlayer::new())
    } else {
        Arc::new(CpalTonePlayer::new())
    };
    let state = AppState::new(player, settings)
        .context("Invalid timing in settings")?;

    if let Some(wpm) = cli.wpm {
        commands::set_wpm(wpm, &state).map_err(anyhow::Error::msg)?;
    }
    if let Some(frequency_hz) = cli.frequency {
        commands::set_frequency(frequency_hz, &state).map_err(anyhow::Error::msg)?;
    }

    let work = async {
        match &cli.command {
            Commands::Play { text } => {
                let text = text.join(" ");
                println!("{}", code::encode(&text));
                commands::play_text(text, &state).await.map(|_| ())
            }
            Commands::Random { count, .. } => {
                let count = count.unwrap_or(state.settings.practice.count);
                let categories = cli.command.categories(state.settings.practice.categories);
                let played = commands::play_random(count, categories, &state, |c| {
                    print!("{}", c);
                    let _ = std::io::stdout().flush();
                })
                .await;
                println!();
                played.map(|_| ())
            }
        }
    };

    let result = tokio::select! {
        result = work => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, stopping playback");
            commands::stop_playback(&state);
            Ok(())
        }
    };

    commands::shutdown(&state);
    result.map_err(anyhow::Error::msg)
}
