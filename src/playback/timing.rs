// Morse timing using the PARIS standard
// "PARIS " is 50 units long, so at 1 WPM one unit lasts 1200ms

use std::time::Duration;

use crate::error::{MorseError, Result};

pub const DEFAULT_WPM: f64 = 20.0;
pub const DEFAULT_FREQUENCY_HZ: f32 = 700.0;

const UNIT_NANOS_AT_ONE_WPM: f64 = 1_200_000_000.0;

/// Shortest unit a rate may produce; anything faster collapses the timing
const MIN_UNIT: Duration = Duration::from_micros(1);

/// Unit length in milliseconds for a given rate
pub fn unit_duration_ms(wpm: f64) -> f64 {
    UNIT_NANOS_AT_ONE_WPM / wpm / 1_000_000.0
}

/// Unit length for a given rate, rounded to the nearest nanosecond
pub fn unit_duration(wpm: f64) -> Duration {
    Duration::from_nanos((UNIT_NANOS_AT_ONE_WPM / wpm).round() as u64)
}

fn validate(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(MorseError::InvalidConfig { field, value })
    }
}

/// Rate and pitch used for playback. Both are always finite and positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingConfig {
    wpm: f64,
    frequency_hz: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            wpm: DEFAULT_WPM,
            frequency_hz: DEFAULT_FREQUENCY_HZ,
        }
    }
}

impl TimingConfig {
    pub fn new(wpm: f64, frequency_hz: f32) -> Result<Self> {
        let mut config = Self::default();
        config.set_words_per_minute(wpm)?;
        config.set_tone_frequency(frequency_hz)?;
        Ok(config)
    }

    pub fn wpm(&self) -> f64 {
        self.wpm
    }

    pub fn frequency_hz(&self) -> f32 {
        self.frequency_hz
    }

    pub fn set_words_per_minute(&mut self, wpm: f64) -> Result<()> {
        validate("words per minute", wpm)?;
        if unit_duration(wpm) < MIN_UNIT {
            return Err(MorseError::InvalidConfig {
                field: "words per minute",
                value: wpm,
            });
        }
        self.wpm = wpm;
        Ok(())
    }

    pub fn set_tone_frequency(&mut self, frequency_hz: f32) -> Result<()> {
        validate("tone frequency", f64::from(frequency_hz))?;
        self.frequency_hz = frequency_hz;
        Ok(())
    }

    pub fn unit_duration(&self) -> Duration {
        unit_duration(self.wpm)
    }
}
