// Amplitude envelope and oscillator for click-free tones

use std::f32::consts::TAU;
use std::time::Duration;

/// Steady-state amplitude as a fraction of full scale
pub const PEAK_AMPLITUDE: f32 = 0.3;

/// Length of the fade in and fade out at each end of a tone
pub const RAMP: Duration = Duration::from_millis(5);

/// Linear attack/release envelope over a fixed number of samples.
///
/// The ramps sit inside the tone's length, so the envelope is silent at the
/// first and last sample and never longer than the tone itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope {
    total: u64,
    ramp: u64,
}

impl Envelope {
    pub fn new(total_samples: u64, ramp_samples: u64) -> Self {
        Self {
            total: total_samples,
            ramp: ramp_samples.min(total_samples / 2),
        }
    }

    pub fn for_duration(duration: Duration, sample_rate: u32) -> Self {
        Self::new(
            samples_for(duration, sample_rate),
            samples_for(RAMP, sample_rate),
        )
    }

    pub fn total_samples(&self) -> u64 {
        self.total
    }

    pub fn is_finished(&self, position: u64) -> bool {
        position >= self.total
    }

    /// Gain at a sample position
    pub fn gain(&self, position: u64) -> f32 {
        if position >= self.total {
            return 0.0;
        }
        if self.ramp == 0 {
            return PEAK_AMPLITUDE;
        }
        let from_start = position as f32 / self.ramp as f32;
        let to_end = (self.total - 1 - position) as f32 / self.ramp as f32;
        PEAK_AMPLITUDE * from_start.min(to_end).min(1.0)
    }

    /// Cut the envelope short so it fades out from `position` over one ramp
    pub fn release_at(&mut self, position: u64) {
        let end = position.saturating_add(self.ramp.max(1));
        self.total = self.total.min(end);
    }
}

pub fn samples_for(duration: Duration, sample_rate: u32) -> u64 {
    (duration.as_secs_f64() * f64::from(sample_rate)).round() as u64
}

/// Phase-accumulator sine oscillator
#[derive(Debug, Clone, Copy, Default)]
pub struct SineOscillator {
    phase: f32,
}

impl SineOscillator {
    pub fn new() -> Self {
        Self { phase: 0.0 }
    }

    /// Next sample in [-1.0, 1.0]
    #[inline]
    pub fn next_sample(&mut self, frequency_hz: f32, sample_rate: f32) -> f32 {
        let out = (self.phase * TAU).sin();
        self.phase += frequency_hz / sample_rate;
        self.phase -= self.phase.floor();
        out
    }
}
