// Tone generation capability
// The engine only sequences tones; producing sound is left to a TonePlayer
use std::time::Duration;

use crate::error::Result;

/// A sine tone request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency_hz: f32,
    pub duration: Duration,
}

/// Source of tone outputs (the audio context).
///
/// `open` is called lazily on the first playback and again after the
/// previous sink was released.
pub trait TonePlayer: Send + Sync {
    fn open(&self) -> Result<Box<dyn ToneSink>>;
}

/// An open tone output
pub trait ToneSink: Send {
    /// Start a tone now. The output ramps it in and out on its own and
    /// falls silent once `tone.duration` has elapsed.
    fn start(&mut self, tone: Tone) -> Result<Box<dyn ToneVoice>>;

    /// Close the output and free the device
    fn release(self: Box<Self>);
}

/// A single sounding tone
pub trait ToneVoice: Send {
    /// Silence the tone before its scheduled end.
    ///
    /// Returns `MorseError::AlreadyStopped` if it had already ended.
    fn stop(&mut self) -> Result<()>;
}
