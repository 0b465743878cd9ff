// Error types for morse playback
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MorseError {
    /// The character has no entry in the code table
    #[error("no morse code for character {0:?}")]
    UnmappedCharacter(char),

    /// The tone output could not be created or used
    #[error("tone output unavailable: {0}")]
    ResourceUnavailable(String),

    /// A tone was stopped after it had already ended
    #[error("tone already stopped")]
    AlreadyStopped,

    #[error("invalid {field}: {value} (expected a finite number greater than zero)")]
    InvalidConfig { field: &'static str, value: f64 },
}

pub type Result<T> = std::result::Result<T, MorseError>;
