// Playback session bookkeeping
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::audio::ToneVoice;
use crate::error::MorseError;

/// Whether the engine is currently running a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Playing,
}

/// How a playback request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Every step elapsed
    Completed,
    /// `stop()` or a newer session cut it short
    Cancelled,
    /// The character has no morse code; nothing was played
    Skipped,
}

/// The engine's single active session, if any
#[derive(Default)]
pub(crate) struct ActiveSession {
    pub latest_id: u64,
    pub token: Option<CancellationToken>,
    pub voice: Option<Box<dyn ToneVoice>>,
}

impl ActiveSession {
    /// Start tracking a new session, cancelling whatever was running
    pub fn begin(&mut self) -> (u64, CancellationToken) {
        self.cancel();
        self.latest_id = self.latest_id.wrapping_add(1);
        let token = CancellationToken::new();
        self.token = Some(token.clone());
        (self.latest_id, token)
    }

    /// Cancel the running session and silence its tone. No-op when idle.
    pub fn cancel(&mut self) -> bool {
        let cancelled = match self.token.take() {
            Some(token) => {
                token.cancel();
                debug!(session = self.latest_id, "Playback session cancelled");
                true
            }
            None => false,
        };

        self.silence();
        cancelled
    }

    fn silence(&mut self) {
        if let Some(mut voice) = self.voice.take() {
            match voice.stop() {
                Ok(()) => {}
                Err(MorseError::AlreadyStopped) => {
                    debug!(session = self.latest_id, "Tone had already ended");
                }
                Err(e) => warn!(session = self.latest_id, "Failed to silence tone: {}", e),
            }
        }
    }

    /// True while `id` is the session in charge and has not been cancelled
    pub fn is_current(&self, id: u64) -> bool {
        self.latest_id == id && self.token.as_ref().is_some_and(|t| !t.is_cancelled())
    }

    /// Forget a tone that ran to its natural end
    pub fn end_tone(&mut self, id: u64) {
        if self.latest_id == id {
            self.voice = None;
        }
    }

    /// Clear the slot once `id` has finished, unless a newer session took
    /// over. A tone still sounding (the session was abandoned) is silenced.
    pub fn finish(&mut self, id: u64) {
        if self.latest_id == id {
            self.token = None;
            self.silence();
        }
    }

    pub fn state(&self) -> SessionState {
        if self.token.is_some() {
            SessionState::Playing
        } else {
            SessionState::Idle
        }
    }
}

/// Finishes session `id` when dropped, so a playback future that is dropped
/// mid-step still returns the engine to idle
pub(crate) struct SessionGuard<'a> {
    session: &'a Mutex<ActiveSession>,
    id: u64,
}

impl<'a> SessionGuard<'a> {
    pub fn new(session: &'a Mutex<ActiveSession>, id: u64) -> Self {
        Self { session, id }
    }
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        self.session.lock().finish(self.id);
    }
}
