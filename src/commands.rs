// Command handlers
use crate::code::{random_character, CategorySelection};
use crate::playback::SessionOutcome;
use crate::state::AppState;

pub async fn play_text(text: String, state: &AppState) -> Result<SessionOutcome, String> {
    state.engine
        .play_text(&text)
        .await
        .map_err(|e| format!("Failed to play text: {}", e))
}

/// Play `count` random practice characters, calling `on_character` as each
/// one starts. Returns the characters that were played.
pub async fn play_random<F>(
    count: usize,
    categories: CategorySelection,
    state: &AppState,
    mut on_character: F,
) -> Result<String, String>
where
    F: FnMut(char),
{
    let mut played = String::with_capacity(count);

    for _ in 0..count {
        let character = random_character(&categories);
        on_character(character);

        let outcome = state.engine
            .play_character(character)
            .await
            .map_err(|e| format!("Failed to play {:?}: {}", character, e))?;

        if outcome == SessionOutcome::Cancelled {
            break;
        }
        played.push(character);
    }

    Ok(played)
}

pub fn stop_playback(state: &AppState) {
    state.engine.stop();
}

pub fn shutdown(state: &AppState) {
    state.engine.shutdown();
}

pub fn set_wpm(wpm: f64, state: &AppState) -> Result<(), String> {
    state.engine
        .set_words_per_minute(wpm)
        .map_err(|e| format!("Failed to set speed: {}", e))
}

pub fn set_frequency(frequency_hz: f32, state: &AppState) -> Result<(), String> {
    state.engine
        .set_tone_frequency(frequency_hz)
        .map_err(|e| format!("Failed to set frequency: {}", e))
}
