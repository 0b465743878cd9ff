// Application state management
use std::sync::Arc;

use crate::audio::TonePlayer;
use crate::playback::PlaybackEngine;
use crate::settings::AppSettings;

pub struct AppState {
    pub engine: Arc<PlaybackEngine>,
    pub settings: AppSettings,
}

impl AppState {
    /// Build the engine from validated settings
    pub fn new(player: Arc<dyn TonePlayer>, settings: AppSettings) -> crate::error::Result<Self> {
        let timing = settings.timing()?;
        Ok(Self {
            engine: Arc::new(PlaybackEngine::with_timing(player, timing)),
            settings,
        })
    }
}
