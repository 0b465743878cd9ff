// Playback module
// PARIS timing, step sequencing and the cancellable playback engine

pub mod engine;
pub mod sequence;
pub mod session;
pub mod timing;

pub use engine::PlaybackEngine;
pub use sequence::{build_character_steps, build_steps, PlaybackStep};
pub use session::{SessionOutcome, SessionState};
pub use timing::{unit_duration, unit_duration_ms, TimingConfig};
