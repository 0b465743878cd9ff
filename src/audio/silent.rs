// Silent tone player
// Records what would have been played; used for --silent runs and tests

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use super::tone::{Tone, TonePlayer, ToneSink, ToneVoice};
use crate::error::{MorseError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum ToneEvent {
    Opened,
    Started {
        frequency_hz: f32,
        duration: Duration,
        at: Instant,
    },
    Stopped {
        at: Instant,
    },
    Released,
}

/// A `TonePlayer` that produces no sound and logs every call instead
#[derive(Debug, Clone, Default)]
pub struct SilentTonePlayer {
    events: Arc<Mutex<Vec<ToneEvent>>>,
}

impl SilentTonePlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ToneEvent> {
        self.events.lock().clone()
    }

    /// Tones started so far, as (frequency, duration)
    pub fn tones(&self) -> Vec<(f32, Duration)> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                ToneEvent::Started { frequency_hz, duration, .. } => Some((*frequency_hz, *duration)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, matcher: impl Fn(&ToneEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|event| matcher(*event)).count()
    }
}

impl TonePlayer for SilentTonePlayer {
    fn open(&self) -> Result<Box<dyn ToneSink>> {
        self.events.lock().push(ToneEvent::Opened);
        Ok(Box::new(SilentSink {
            events: Arc::clone(&self.events),
        }))
    }
}

struct SilentSink {
    events: Arc<Mutex<Vec<ToneEvent>>>,
}

impl ToneSink for SilentSink {
    fn start(&mut self, tone: Tone) -> Result<Box<dyn ToneVoice>> {
        let at = Instant::now();
        self.events.lock().push(ToneEvent::Started {
            frequency_hz: tone.frequency_hz,
            duration: tone.duration,
            at,
        });
        Ok(Box::new(SilentVoice {
            events: Arc::clone(&self.events),
            ends_at: at + tone.duration,
            stopped: false,
        }))
    }

    fn release(self: Box<Self>) {
        self.events.lock().push(ToneEvent::Released);
    }
}

struct SilentVoice {
    events: Arc<Mutex<Vec<ToneEvent>>>,
    ends_at: Instant,
    stopped: bool,
}

impl ToneVoice for SilentVoice {
    fn stop(&mut self) -> Result<()> {
        let now = Instant::now();
        if self.stopped || now >= self.ends_at {
            return Err(MorseError::AlreadyStopped);
        }
        self.stopped = true;
        self.events.lock().push(ToneEvent::Stopped { at: now });
        Ok(())
    }
}
