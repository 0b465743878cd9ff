// Command line interface
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::code::CategorySelection;

#[derive(Parser, Debug)]
#[command(version, about = "Play text as morse code tones")]
pub struct Cli {
    /// Settings file (defaults to settings.json in the config directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Speed in words per minute (PARIS)
    #[arg(short, long, global = true)]
    pub wpm: Option<f64>,

    /// Tone frequency in Hz
    #[arg(short, long, global = true)]
    pub frequency: Option<f32>,

    /// Don't open an audio device, only print what would be played
    #[arg(long, global = true)]
    pub silent: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Play the given text
    Play {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Play random practice characters
    Random {
        /// How many characters to play
        #[arg(short = 'n', long)]
        count: Option<usize>,
        #[arg(long)]
        numbers: bool,
        #[arg(long)]
        punctuation: bool,
        #[arg(long)]
        accented: bool,
        /// Leave letters out of the pool
        #[arg(long)]
        no_letters: bool,
    },
}

impl Commands {
    /// Categories for `random`: the flags if any were given, otherwise `defaults`
    pub fn categories(&self, defaults: CategorySelection) -> CategorySelection {
        match *self {
            Commands::Random { numbers, punctuation, accented, no_letters, .. }
                if numbers || punctuation || accented || no_letters =>
            {
                CategorySelection {
                    letters: !no_letters,
                    numbers,
                    punctuation,
                    accented,
                }
            }
            _ => defaults,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_play_with_global_flags() {
        let cli = Cli::try_parse_from(["morsetone", "play", "hello", "world", "--wpm", "25"]).unwrap();
        assert_eq!(cli.wpm, Some(25.0));
        match cli.command {
            Commands::Play { text } => assert_eq!(text.join(" "), "hello world"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn random_flags_override_settings() {
        let cli = Cli::try_parse_from(["morsetone", "random", "--numbers", "--no-letters"]).unwrap();
        let selection = cli.command.categories(CategorySelection::default());
        assert_eq!(
            selection,
            CategorySelection {
                letters: false,
                numbers: true,
                punctuation: false,
                accented: false,
            }
        );
    }

    #[test]
    fn random_without_flags_uses_settings() {
        let cli = Cli::try_parse_from(["morsetone", "random", "-n", "3"]).unwrap();
        let defaults = CategorySelection {
            accented: true,
            ..CategorySelection::default()
        };
        assert_eq!(cli.command.categories(defaults), defaults);
    }

    #[test]
    fn play_needs_text() {
        assert!(Cli::try_parse_from(["morsetone", "play"]).is_err());
    }
}
