// Audio output module
// Sine tone synthesis with a short envelope, played through cpal

pub mod envelope;
pub mod output;
pub mod silent;
pub mod tone;

pub use output::CpalTonePlayer;
pub use silent::{SilentTonePlayer, ToneEvent};
pub use tone::{Tone, TonePlayer, ToneSink, ToneVoice};
