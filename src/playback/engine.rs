// Playback engine
// Turns characters into timed tone/silence steps and plays them one session at a time

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::sequence::{build_character_steps, word_gap_step, PlaybackStep};
use super::session::{ActiveSession, SessionGuard, SessionOutcome, SessionState};
use super::timing::TimingConfig;
use crate::audio::{Tone, TonePlayer, ToneSink};
use crate::code::lookup;
use crate::error::{MorseError, Result};

/// Sequences morse playback onto a `TonePlayer`.
///
/// At most one session runs at a time. Starting a new one cancels the
/// previous session first, silencing its tone.
pub struct PlaybackEngine {
    player: Arc<dyn TonePlayer>,
    timing: Mutex<TimingConfig>,
    sink: Mutex<Option<Box<dyn ToneSink>>>,
    session: Mutex<ActiveSession>,
    /// Bumped by every `stop()`, so text playback notices stops between characters
    stops: AtomicU64,
}

impl PlaybackEngine {
    pub fn new(player: Arc<dyn TonePlayer>) -> Self {
        Self::with_timing(player, TimingConfig::default())
    }

    pub fn with_timing(player: Arc<dyn TonePlayer>, timing: TimingConfig) -> Self {
        Self {
            player,
            timing: Mutex::new(timing),
            sink: Mutex::new(None),
            session: Mutex::new(ActiveSession::default()),
            stops: AtomicU64::new(0),
        }
    }

    /// Set rate and pitch together. Nothing changes if either is invalid.
    pub fn configure(&self, wpm: f64, frequency_hz: f32) -> Result<()> {
        let timing = TimingConfig::new(wpm, frequency_hz)?;
        *self.timing.lock() = timing;
        info!(wpm, frequency_hz, "Playback configured");
        Ok(())
    }

    pub fn set_words_per_minute(&self, wpm: f64) -> Result<()> {
        self.timing.lock().set_words_per_minute(wpm)?;
        info!(wpm, "Playback rate changed");
        Ok(())
    }

    pub fn set_tone_frequency(&self, frequency_hz: f32) -> Result<()> {
        self.timing.lock().set_tone_frequency(frequency_hz)?;
        info!(frequency_hz, "Tone frequency changed");
        Ok(())
    }

    pub fn timing(&self) -> TimingConfig {
        *self.timing.lock()
    }

    /// Current unit length, read fresh for every character
    pub fn unit_duration(&self) -> Duration {
        self.timing.lock().unit_duration()
    }

    pub fn state(&self) -> SessionState {
        self.session.lock().state()
    }

    /// Play one character and its trailing gap.
    ///
    /// Characters without morse code are skipped with a warning. Resolves
    /// early with `Cancelled` if `stop()` is called or another playback
    /// starts.
    pub async fn play_character(&self, character: char) -> Result<SessionOutcome> {
        self.play_character_since(character, None).await
    }

    /// `stops` is the stop count the caller started from; if a `stop()` has
    /// happened since, the character is not started.
    async fn play_character_since(
        &self,
        character: char,
        stops: Option<u64>,
    ) -> Result<SessionOutcome> {
        let unit = self.unit_duration();
        match build_character_steps(character, unit) {
            Some(steps) => self.run_session(&steps, stops).await,
            None => {
                warn!("{}, skipping", MorseError::UnmappedCharacter(character));
                Ok(SessionOutcome::Skipped)
            }
        }
    }

    /// Play a string character by character. Whitespace between words
    /// stretches the gap to a full word space.
    pub async fn play_text(&self, text: &str) -> Result<SessionOutcome> {
        let stops = self.stops.load(Ordering::SeqCst);
        let mut played_any = false;
        let mut word_gap = false;

        for character in text.chars() {
            if self.stops.load(Ordering::SeqCst) != stops {
                return Ok(SessionOutcome::Cancelled);
            }

            if character.is_whitespace() {
                word_gap = played_any;
                continue;
            }

            if word_gap && lookup(character).is_some() {
                word_gap = false;
                let gap = [word_gap_step(self.unit_duration())];
                if self.run_session(&gap, Some(stops)).await? == SessionOutcome::Cancelled {
                    return Ok(SessionOutcome::Cancelled);
                }
            }

            match self.play_character_since(character, Some(stops)).await? {
                SessionOutcome::Cancelled => return Ok(SessionOutcome::Cancelled),
                SessionOutcome::Completed => played_any = true,
                SessionOutcome::Skipped => {}
            }
        }

        Ok(SessionOutcome::Completed)
    }

    /// Cancel the running session and silence its tone. Safe to call at
    /// any time, including when idle or after `shutdown()`.
    pub fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        if self.session.lock().cancel() {
            info!("Playback stopped");
        }
    }

    /// Stop playback and release the tone output. The next playback
    /// reopens it.
    pub fn shutdown(&self) {
        self.stop();
        let sink = self.sink.lock().take();
        if let Some(sink) = sink {
            sink.release();
            info!("Tone output released");
        }
    }

    async fn run_session(
        &self,
        steps: &[PlaybackStep],
        stops: Option<u64>,
    ) -> Result<SessionOutcome> {
        let Some((id, token)) = self.begin_session(stops)? else {
            debug!("Stopped before the session started");
            return Ok(SessionOutcome::Cancelled);
        };
        let _guard = SessionGuard::new(&self.session, id);
        debug!(session = id, steps = steps.len(), "Playback session started");

        let outcome = self.run_steps(id, &token, steps).await;

        match &outcome {
            Ok(outcome) => debug!(session = id, ?outcome, "Playback session ended"),
            Err(e) => warn!(session = id, "Playback session failed: {}", e),
        }
        outcome
    }

    /// Returns `None` if a `stop()` landed after `stops` was read. Checked
    /// under the session lock, which `stop()` also takes to cancel.
    fn begin_session(&self, stops: Option<u64>) -> Result<Option<(u64, CancellationToken)>> {
        let mut session = self.session.lock();
        if stops.is_some_and(|stops| self.stops.load(Ordering::SeqCst) != stops) {
            return Ok(None);
        }
        session.cancel();
        self.open_sink(&mut self.sink.lock())?;
        Ok(Some(session.begin()))
    }

    fn open_sink(&self, sink: &mut Option<Box<dyn ToneSink>>) -> Result<()> {
        if sink.is_none() {
            *sink = Some(self.player.open()?);
            info!("Tone output opened");
        }
        Ok(())
    }

    async fn run_steps(
        &self,
        id: u64,
        token: &CancellationToken,
        steps: &[PlaybackStep],
    ) -> Result<SessionOutcome> {
        for (index, step) in steps.iter().enumerate() {
            let started = match *step {
                PlaybackStep::Tone(duration) => self.start_tone(id, duration)?,
                PlaybackStep::Silence(_) => !token.is_cancelled(),
            };
            if !started {
                return Ok(SessionOutcome::Cancelled);
            }

            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!(session = id, step = index, "Stopped mid-step");
                    return Ok(SessionOutcome::Cancelled);
                }
                _ = tokio::time::sleep(step.duration()) => {}
            }

            if step.is_tone() {
                self.session.lock().end_tone(id);
            }
        }

        Ok(SessionOutcome::Completed)
    }

    /// Start a tone for session `id`. Returns false if the session was
    /// cancelled before the tone could start.
    fn start_tone(&self, id: u64, duration: Duration) -> Result<bool> {
        let mut session = self.session.lock();
        if !session.is_current(id) {
            return Ok(false);
        }

        let frequency_hz = self.timing.lock().frequency_hz();
        let mut sink_slot = self.sink.lock();
        self.open_sink(&mut sink_slot)?;
        let Some(sink) = sink_slot.as_mut() else {
            return Ok(false);
        };

        let voice = match sink.start(Tone { frequency_hz, duration }) {
            Ok(voice) => voice,
            Err(e) => {
                // Drop the broken output so the next request opens a fresh one
                if let Some(broken) = sink_slot.take() {
                    broken.release();
                }
                return Err(e);
            }
        };
        session.voice = Some(voice);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{SilentTonePlayer, ToneEvent, ToneVoice};
    use std::sync::atomic::AtomicBool;
    use tokio::time::Instant;

    /// Output whose next `start` fails once `fail_next` is set
    struct FlakyPlayer {
        inner: SilentTonePlayer,
        fail_next: Arc<AtomicBool>,
    }

    impl TonePlayer for FlakyPlayer {
        fn open(&self) -> Result<Box<dyn ToneSink>> {
            Ok(Box::new(FlakySink {
                inner: self.inner.open()?,
                fail_next: Arc::clone(&self.fail_next),
            }))
        }
    }

    struct FlakySink {
        inner: Box<dyn ToneSink>,
        fail_next: Arc<AtomicBool>,
    }

    impl ToneSink for FlakySink {
        fn start(&mut self, tone: Tone) -> Result<Box<dyn ToneVoice>> {
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(MorseError::ResourceUnavailable("device unplugged".to_string()));
            }
            self.inner.start(tone)
        }

        fn release(self: Box<Self>) {
            self.inner.release();
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn engine() -> (Arc<PlaybackEngine>, SilentTonePlayer) {
        let player = SilentTonePlayer::new();
        let engine = PlaybackEngine::new(Arc::new(player.clone()));
        (Arc::new(engine), player)
    }

    fn start_times(player: &SilentTonePlayer) -> Vec<Instant> {
        player
            .events()
            .into_iter()
            .filter_map(|e| match e {
                ToneEvent::Started { at, .. } => Some(at),
                _ => None,
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn plays_s_with_paris_timing() {
        let (engine, player) = engine();
        let t0 = Instant::now();

        let outcome = engine.play_character('S').await.unwrap();

        assert_eq!(outcome, SessionOutcome::Completed);
        assert_eq!(player.tones(), vec![(700.0, ms(60)); 3]);
        assert_eq!(start_times(&player), vec![t0, t0 + ms(120), t0 + ms(240)]);
        assert_eq!(Instant::now() - t0, ms(480));
        assert_eq!(engine.state(), SessionState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn plays_o_as_dashes() {
        let (engine, player) = engine();
        let t0 = Instant::now();

        engine.play_character('o').await.unwrap();

        assert_eq!(player.tones(), vec![(700.0, ms(180)); 3]);
        assert_eq!(start_times(&player), vec![t0, t0 + ms(240), t0 + ms(480)]);
        assert_eq!(Instant::now() - t0, ms(840));
    }

    #[tokio::test(start_paused = true)]
    async fn unmapped_character_is_skipped() {
        let (engine, player) = engine();
        let t0 = Instant::now();

        let outcome = engine.play_character('#').await.unwrap();

        assert_eq!(outcome, SessionOutcome::Skipped);
        assert!(player.events().is_empty());
        assert_eq!(Instant::now(), t0);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_during_tone_cancels_remaining_steps() {
        let (engine, player) = engine();
        let t0 = Instant::now();

        let task = {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.play_character('O').await })
        };

        // Second dash runs from 240ms to 420ms
        tokio::time::sleep(ms(300)).await;
        assert_eq!(engine.state(), SessionState::Playing);
        engine.stop();

        assert_eq!(task.await.unwrap().unwrap(), SessionOutcome::Cancelled);
        assert_eq!(engine.state(), SessionState::Idle);

        tokio::time::sleep(ms(2_000)).await;
        assert_eq!(player.tones().len(), 2);
        assert!(player
            .events()
            .contains(&ToneEvent::Stopped { at: t0 + ms(300) }));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_during_gap_prevents_next_tone() {
        let (engine, player) = engine();

        let task = {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.play_character('S').await })
        };

        // First gap runs from 60ms to 120ms
        tokio::time::sleep(ms(90)).await;
        engine.stop();

        assert_eq!(task.await.unwrap().unwrap(), SessionOutcome::Cancelled);
        assert_eq!(player.tones().len(), 1);
        assert_eq!(player.count(|e| matches!(e, ToneEvent::Stopped { .. })), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_when_idle_is_noop() {
        let (engine, player) = engine();
        engine.stop();
        engine.stop();
        assert_eq!(engine.state(), SessionState::Idle);
        assert!(player.events().is_empty());

        engine.shutdown();
        engine.stop();
        assert!(player.events().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn new_playback_cancels_previous_session() {
        let (engine, player) = engine();

        let first = {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.play_character('T').await })
        };
        tokio::time::sleep(ms(100)).await;

        let second = engine.play_character('E').await.unwrap();

        assert_eq!(second, SessionOutcome::Completed);
        assert_eq!(first.await.unwrap().unwrap(), SessionOutcome::Cancelled);
        assert_eq!(player.tones(), vec![(700.0, ms(180)), (700.0, ms(60))]);
        assert_eq!(player.count(|e| matches!(e, ToneEvent::Stopped { .. })), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn config_changes_apply_to_later_steps() {
        let (engine, player) = engine();

        let task = {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.play_character('S').await })
        };
        tokio::time::sleep(ms(30)).await;
        engine.set_tone_frequency(900.0).unwrap();
        engine.set_words_per_minute(10.0).unwrap();
        task.await.unwrap().unwrap();

        // Pitch follows on the next tone, rate only on the next character
        assert_eq!(
            player.tones(),
            vec![(700.0, ms(60)), (900.0, ms(60)), (900.0, ms(60))]
        );

        engine.play_character('E').await.unwrap();
        assert_eq!(player.tones().last(), Some(&(900.0, ms(120))));
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_config_is_rejected() {
        let (engine, _player) = engine();
        assert!(matches!(
            engine.configure(0.0, 700.0),
            Err(MorseError::InvalidConfig { .. })
        ));
        assert!(engine.set_tone_frequency(f32::INFINITY).is_err());
        assert_eq!(engine.timing(), TimingConfig::default());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_releases_and_reopens_lazily() {
        let (engine, player) = engine();

        engine.play_character('E').await.unwrap();
        engine.shutdown();
        engine.play_character('E').await.unwrap();

        assert_eq!(player.count(|e| *e == ToneEvent::Opened), 2);
        assert_eq!(player.count(|e| *e == ToneEvent::Released), 1);
        assert_eq!(player.tones().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn text_adds_word_gaps_and_skips_unmapped() {
        let (engine, player) = engine();
        let t0 = Instant::now();

        let outcome = engine.play_text("e #e  ").await.unwrap();

        assert_eq!(outcome, SessionOutcome::Completed);
        // E (4 units), extra word gap (4 units), E (4 units)
        assert_eq!(start_times(&player), vec![t0, t0 + ms(480)]);
        assert_eq!(Instant::now() - t0, ms(720));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_text_playback() {
        let (engine, player) = engine();

        let task = {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.play_text("SOS").await })
        };

        // S ends at 480ms, O's first dash starts there
        tokio::time::sleep(ms(500)).await;
        engine.stop();

        assert_eq!(task.await.unwrap().unwrap(), SessionOutcome::Cancelled);
        tokio::time::sleep(ms(5_000)).await;
        assert_eq!(player.tones().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_playback_returns_to_idle() {
        let (engine, player) = engine();
        let t0 = Instant::now();

        // Gives up during the first dash
        let result = tokio::time::timeout(ms(100), engine.play_character('O')).await;
        assert!(result.is_err());

        assert_eq!(engine.state(), SessionState::Idle);
        assert!(player
            .events()
            .contains(&ToneEvent::Stopped { at: t0 + ms(100) }));

        tokio::time::sleep(ms(5_000)).await;
        assert_eq!(player.tones().len(), 1);
        assert_eq!(engine.play_character('E').await.unwrap(), SessionOutcome::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_before_session_begins_is_honoured() {
        let (engine, player) = engine();
        let stops = engine.stops.load(Ordering::SeqCst);
        engine.stop();

        let steps = build_character_steps('E', engine.unit_duration()).unwrap();
        let outcome = engine.run_session(&steps, Some(stops)).await.unwrap();

        assert_eq!(outcome, SessionOutcome::Cancelled);
        assert!(player.tones().is_empty());
        assert_eq!(engine.state(), SessionState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_tone_start_reopens_output() {
        let recorder = SilentTonePlayer::new();
        let fail_next = Arc::new(AtomicBool::new(true));
        let engine = PlaybackEngine::new(Arc::new(FlakyPlayer {
            inner: recorder.clone(),
            fail_next: Arc::clone(&fail_next),
        }));

        let err = engine.play_character('E').await.unwrap_err();
        assert!(matches!(err, MorseError::ResourceUnavailable(_)));
        assert_eq!(engine.state(), SessionState::Idle);
        assert_eq!(recorder.events(), vec![ToneEvent::Opened, ToneEvent::Released]);

        let outcome = engine.play_character('E').await.unwrap();
        assert_eq!(outcome, SessionOutcome::Completed);
        assert_eq!(recorder.count(|e| *e == ToneEvent::Opened), 2);
        assert_eq!(recorder.tones(), vec![(700.0, ms(60))]);
    }
}
