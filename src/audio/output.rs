// Tone output using cpal
// The stream lives on its own thread; tones are handed over through shared state

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Stream, StreamConfig};
use crossbeam_channel::{bounded, Sender};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, error, info};

use super::envelope::{Envelope, SineOscillator};
use super::tone::{Tone, TonePlayer, ToneSink, ToneVoice};
use crate::error::{MorseError, Result};

/// The tone currently being rendered
#[derive(Debug)]
struct Voice {
    id: u64,
    frequency_hz: f32,
    envelope: Envelope,
    oscillator: SineOscillator,
    position: u64,
}

/// State shared between the sink and the audio callback
#[derive(Debug, Default)]
struct VoiceSlot {
    next_id: u64,
    voice: Option<Voice>,
}

impl VoiceSlot {
    fn start(&mut self, tone: Tone, sample_rate: u32) -> u64 {
        self.next_id += 1;
        self.voice = Some(Voice {
            id: self.next_id,
            frequency_hz: tone.frequency_hz,
            envelope: Envelope::for_duration(tone.duration, sample_rate),
            oscillator: SineOscillator::new(),
            position: 0,
        });
        self.next_id
    }

    /// Fade out the voice `id` if it is still sounding
    fn stop(&mut self, id: u64) -> Result<()> {
        match self.voice.as_mut() {
            Some(voice) if voice.id == id && !voice.envelope.is_finished(voice.position) => {
                voice.envelope.release_at(voice.position);
                Ok(())
            }
            _ => Err(MorseError::AlreadyStopped),
        }
    }

    /// Produce the next mono sample
    fn render(&mut self, sample_rate: f32) -> f32 {
        let Some(voice) = self.voice.as_mut() else {
            return 0.0;
        };
        if voice.envelope.is_finished(voice.position) {
            self.voice = None;
            return 0.0;
        }
        let gain = voice.envelope.gain(voice.position);
        voice.position += 1;
        voice.oscillator.next_sample(voice.frequency_hz, sample_rate) * gain
    }
}

/// Plays tones on the default output device
#[derive(Debug, Default, Clone, Copy)]
pub struct CpalTonePlayer;

impl CpalTonePlayer {
    pub fn new() -> Self {
        Self
    }
}

impl TonePlayer for CpalTonePlayer {
    fn open(&self) -> Result<Box<dyn ToneSink>> {
        let slot = Arc::new(Mutex::new(VoiceSlot::default()));
        let (ready_tx, ready_rx) = bounded::<std::result::Result<u32, String>>(1);
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);

        let thread_slot = Arc::clone(&slot);
        let thread = std::thread::Builder::new()
            .name("morsetone-audio".to_string())
            .spawn(move || {
                let (stream, sample_rate) = match build_output(thread_slot) {
                    Ok(output) => output,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(sample_rate));

                // Keep the stream alive until the sink is released or dropped
                let _ = shutdown_rx.recv();
                drop(stream);
                debug!("Audio stream closed");
            })
            .map_err(|e| MorseError::ResourceUnavailable(format!("Failed to spawn audio thread: {}", e)))?;

        let sample_rate = match ready_rx.recv() {
            Ok(Ok(rate)) => rate,
            Ok(Err(e)) => {
                let _ = thread.join();
                return Err(MorseError::ResourceUnavailable(e));
            }
            Err(_) => {
                let _ = thread.join();
                return Err(MorseError::ResourceUnavailable(
                    "Audio thread exited before the stream started".to_string(),
                ));
            }
        };

        info!(sample_rate, "Audio output opened");

        Ok(Box::new(CpalToneSink {
            slot,
            sample_rate,
            shutdown: Some(shutdown_tx),
            thread: Some(thread),
        }))
    }
}

/// Build and start the output stream on the default device
fn build_output(slot: Arc<Mutex<VoiceSlot>>) -> std::result::Result<(Stream, u32), String> {
    let host = cpal::default_host();

    let device = host.default_output_device()
        .ok_or("No output device available")?;

    let config = device.default_output_config()
        .map_err(|e| format!("Failed to get default output config: {}", e))?;

    let sample_rate = config.sample_rate().0;

    let stream = match config.sample_format() {
        cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config.into(), slot)?,
        cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config.into(), slot)?,
        cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config.into(), slot)?,
        format => return Err(format!("Unsupported sample format: {:?}", format)),
    };

    stream.play().map_err(|e| format!("Failed to start stream: {}", e))?;

    Ok((stream, sample_rate))
}

fn build_stream<T: cpal::SizedSample + cpal::FromSample<f32>>(
    device: &cpal::Device,
    config: &StreamConfig,
    slot: Arc<Mutex<VoiceSlot>>,
) -> std::result::Result<Stream, String> {
    let channels = usize::from(config.channels.max(1));
    let sample_rate = config.sample_rate.0 as f32;

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            let mut slot = slot.lock();
            for frame in data.chunks_mut(channels) {
                let value = T::from_sample(slot.render(sample_rate));
                for sample in frame.iter_mut() {
                    *sample = value;
                }
            }
        },
        move |err| {
            error!("Audio output error: {}", err);
        },
        None,
    ).map_err(|e| format!("Failed to build output stream: {}", e))?;

    Ok(stream)
}

pub struct CpalToneSink {
    slot: Arc<Mutex<VoiceSlot>>,
    sample_rate: u32,
    shutdown: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl CpalToneSink {
    fn close(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("Audio thread panicked");
            }
        }
    }
}

impl ToneSink for CpalToneSink {
    fn start(&mut self, tone: Tone) -> Result<Box<dyn ToneVoice>> {
        if self.thread.as_ref().map_or(true, |t| t.is_finished()) {
            return Err(MorseError::ResourceUnavailable("Audio thread is not running".to_string()));
        }
        let id = self.slot.lock().start(tone, self.sample_rate);
        Ok(Box::new(CpalVoice {
            slot: Arc::clone(&self.slot),
            id,
        }))
    }

    fn release(mut self: Box<Self>) {
        self.close();
        info!("Audio output released");
    }
}

impl Drop for CpalToneSink {
    fn drop(&mut self) {
        self.close();
    }
}

struct CpalVoice {
    slot: Arc<Mutex<VoiceSlot>>,
    id: u64,
}

impl ToneVoice for CpalVoice {
    fn stop(&mut self) -> Result<()> {
        self.slot.lock().stop(self.id)
    }
}
