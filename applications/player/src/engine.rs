//! Audio output engine
//!
//! Owns the cpal output stream. The callback copies from the installed
//! track buffer, runs the signal path, and taps the processed output
//! into the analyser. Lightweight transport commands travel over a
//! channel and are applied inside the callback; track buffers are
//! installed through the shared state from the caller's thread.

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Stream, StreamConfig};
use crossbeam_channel::{bounded, Receiver, Sender};
use tilawa_audio::effects::{CompressorSettings, SharedGain};
use tilawa_audio::{Analyser, SignalPath};

/// Transport commands applied inside the audio callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCommand {
    /// Start or resume the installed track
    Play,

    /// Pause, keeping the cursor
    Pause,

    /// Stop and rewind to the start of the track
    Stop,
}

/// Events emitted by the audio callback
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A track began playing from its start
    TrackStarted(u32),

    /// The cursor reached the end of the installed track
    TrackFinished(u32),

    /// The stream hit a problem
    Error(String),
}

/// Playback position shared with the audio callback
struct EngineState {
    /// Interleaved stereo samples at the device rate
    samples: Vec<f32>,
    /// Track number the samples belong to
    track_index: u32,
    cursor: usize,
    playing: bool,
    finished_sent: bool,
}

impl EngineState {
    fn empty() -> Self {
        Self {
            samples: Vec::new(),
            track_index: 0,
            cursor: 0,
            playing: false,
            finished_sent: false,
        }
    }

    fn clear(&mut self) {
        self.samples = Vec::new();
        self.track_index = 0;
        self.cursor = 0;
        self.playing = false;
        self.finished_sent = false;
    }
}

/// Audio output engine over the default cpal device
pub struct OutputEngine {
    command_tx: Sender<EngineCommand>,
    event_rx: Receiver<EngineEvent>,
    state: Arc<Mutex<EngineState>>,
    sample_rate: u32,
    _stream: Stream,
}

impl OutputEngine {
    /// Open the default output device and start the (silent) stream
    ///
    /// Returns the engine and the gain handle that drives the gain
    /// stage inside the callback.
    pub fn new(
        analyser: Arc<Mutex<Analyser>>,
        compressor: CompressorSettings,
    ) -> Result<(Self, SharedGain)> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow!("no audio output device available"))?;

        let default_config = device
            .default_output_config()
            .context("failed to query output device configuration")?;
        let sample_rate = default_config.sample_rate();
        let config = StreamConfig {
            channels: 2,
            sample_rate: default_config.sample_rate(),
            buffer_size: cpal::BufferSize::Default,
        };

        let state = Arc::new(Mutex::new(EngineState::empty()));
        let (command_tx, command_rx) = bounded(32);
        let (event_tx, event_rx) = bounded(32);

        let (mut path, gain) = SignalPath::new(compressor);
        let callback_state = state.clone();
        let error_tx = event_tx.clone();

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    fill_output(data, &callback_state, &command_rx, &event_tx);
                    path.process(data, sample_rate);
                    let mut analyser = analyser.lock().unwrap_or_else(PoisonError::into_inner);
                    analyser.push_samples(data, 2);
                },
                move |err| {
                    error_tx
                        .try_send(EngineEvent::Error(format!("stream error: {err}")))
                        .ok();
                },
                None,
            )
            .context("failed to build output stream")?;
        stream.play().context("failed to start output stream")?;

        Ok((
            Self {
                command_tx,
                event_rx,
                state,
                sample_rate,
                _stream: stream,
            },
            gain,
        ))
    }

    /// Device sample rate the installed buffers must match
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Drop the installed track, silencing output from the next block
    ///
    /// Goes through the shared state rather than the command channel so
    /// the old track stops sounding even while its replacement is still
    /// loading.
    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.clear();
    }

    /// Install a decoded track, rewound and paused
    pub fn install(&self, track_index: u32, samples: Vec<f32>) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.samples = samples;
        state.track_index = track_index;
        state.cursor = 0;
        state.playing = false;
        state.finished_sent = false;
    }

    /// Send a transport command to the callback
    pub fn send(&self, command: EngineCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|_| anyhow!("audio stream is gone"))
    }

    /// Try to receive the next engine event (non-blocking)
    pub fn poll_event(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }
}

/// Apply pending commands and copy the next block of samples
fn fill_output(
    data: &mut [f32],
    state: &Arc<Mutex<EngineState>>,
    command_rx: &Receiver<EngineCommand>,
    event_tx: &Sender<EngineEvent>,
) {
    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);

    while let Ok(command) = command_rx.try_recv() {
        match command {
            EngineCommand::Play => {
                if !state.samples.is_empty() {
                    if state.cursor == 0 {
                        event_tx
                            .try_send(EngineEvent::TrackStarted(state.track_index))
                            .ok();
                    }
                    state.playing = true;
                }
            }
            EngineCommand::Pause => state.playing = false,
            EngineCommand::Stop => {
                state.playing = false;
                state.cursor = 0;
                state.finished_sent = false;
            }
        }
    }

    if state.playing {
        let remaining = state.samples.len() - state.cursor;
        let take = remaining.min(data.len());
        data[..take].copy_from_slice(&state.samples[state.cursor..state.cursor + take]);
        data[take..].fill(0.0);
        state.cursor += take;

        if state.cursor >= state.samples.len() && !state.finished_sent {
            state.finished_sent = true;
            state.playing = false;
            event_tx
                .try_send(EngineEvent::TrackFinished(state.track_index))
                .ok();
        }
    } else {
        data.fill(0.0);
    }
}
