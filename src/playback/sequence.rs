// Step sequences for morse characters
use std::time::Duration;

use crate::code::lookup;

pub const DOT_UNITS: u32 = 1;
pub const DASH_UNITS: u32 = 3;
pub const SYMBOL_GAP_UNITS: u32 = 1;
pub const CHARACTER_GAP_UNITS: u32 = 3;
pub const WORD_GAP_UNITS: u32 = 7;

/// One timed interval of playback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStep {
    Tone(Duration),
    Silence(Duration),
}

impl PlaybackStep {
    pub fn duration(&self) -> Duration {
        match *self {
            PlaybackStep::Tone(d) | PlaybackStep::Silence(d) => d,
        }
    }

    pub fn is_tone(&self) -> bool {
        matches!(self, PlaybackStep::Tone(_))
    }
}

fn symbol_units(symbol: char) -> Option<u32> {
    match symbol {
        '.' => Some(DOT_UNITS),
        '-' => Some(DASH_UNITS),
        _ => None,
    }
}

/// Build the steps for a dot/dash string: a tone per symbol, one unit of
/// silence between symbols and three units after the last one.
pub fn build_steps(symbols: &str, unit: Duration) -> Vec<PlaybackStep> {
    let tones: Vec<u32> = symbols.chars().filter_map(symbol_units).collect();
    let mut steps = Vec::with_capacity(tones.len() * 2);

    for (i, units) in tones.iter().enumerate() {
        steps.push(PlaybackStep::Tone(unit * *units));
        if i + 1 < tones.len() {
            steps.push(PlaybackStep::Silence(unit * SYMBOL_GAP_UNITS));
        }
    }
    steps.push(PlaybackStep::Silence(unit * CHARACTER_GAP_UNITS));

    steps
}

/// Steps for a single character, or `None` if it has no morse code
pub fn build_character_steps(character: char, unit: Duration) -> Option<Vec<PlaybackStep>> {
    lookup(character).map(|symbols| build_steps(symbols, unit))
}

/// Extra silence after a character's trailing gap that makes up a word gap
pub fn word_gap_step(unit: Duration) -> PlaybackStep {
    PlaybackStep::Silence(unit * (WORD_GAP_UNITS - CHARACTER_GAP_UNITS))
}

pub fn total_duration(steps: &[PlaybackStep]) -> Duration {
    steps.iter().map(PlaybackStep::duration).sum()
}
