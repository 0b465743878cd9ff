// Settings module
// JSON configuration with defaults for anything left out

#[allow(clippy::module_inception)]
pub mod settings;

pub use settings::{AppSettings, PracticeSettings};
